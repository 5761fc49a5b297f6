#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use gobuild_core::services::process::{CommandRunner, CommandSpec, ProcessOutcome};

type Effect = Box<dyn Fn(&CommandSpec, &Path) + Send + Sync>;

/// Fake runner recording every command instead of spawning it.
///
/// Exit codes are handed out in order from `codes`; once exhausted every
/// command succeeds. An optional effect lets a test mimic what the real tool
/// would do on disk.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    codes: Mutex<VecDeque<i32>>,
    effect: Option<Effect>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        Self { codes: Mutex::new(codes.into_iter().collect()), ..Self::default() }
    }

    pub fn with_effect(mut self, effect: impl Fn(&CommandSpec, &Path) + Send + Sync + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::command_line).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec, cwd: &Path) -> io::Result<ProcessOutcome> {
        self.calls.lock().unwrap().push(command.clone());
        if let Some(effect) = &self.effect {
            effect(command, cwd);
        }
        let code = self.codes.lock().unwrap().pop_front().unwrap_or(0);
        Ok(ProcessOutcome::from_code(code))
    }
}

/// Runner whose every spawn fails, as when the program is not installed.
pub struct MissingProgramRunner;

impl CommandRunner for MissingProgramRunner {
    fn run(&self, command: &CommandSpec, _cwd: &Path) -> io::Result<ProcessOutcome> {
        Err(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", command.program)))
    }
}

/// Parse a `custom` section from YAML text.
pub fn custom(yaml: &str) -> serde_yaml::Value {
    serde_yaml::from_str(yaml).unwrap()
}
