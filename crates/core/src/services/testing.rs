use std::path::Path;
use std::thread;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::GoBuildConfig;
use crate::services::process::{CommandRunner, CommandSpec};
use crate::services::GoBuildError;

/// Resolve the host framework executable: `SLS_BIN` when set, otherwise `serverless`.
pub fn resolve_serverless_bin() -> String {
    std::env::var("SLS_BIN")
        .ok()
        .filter(|bin| !bin.trim().is_empty())
        .unwrap_or_else(|| "serverless".to_string())
}

/// Triggers other host framework plugins before the tests run.
pub trait PluginHost {
    /// Run `plugin` (a host command such as `offline start`) to completion.
    fn spawn(&self, plugin: &str) -> Result<(), GoBuildError>;
}

/// Plugin host that invokes the host framework's own executable.
pub struct CommandPluginHost<'a> {
    pub program: String,
    pub service_path: &'a Path,
    pub runner: &'a dyn CommandRunner,
}

impl<'a> CommandPluginHost<'a> {
    pub fn new(service_path: &'a Path, runner: &'a dyn CommandRunner) -> Self {
        Self { program: resolve_serverless_bin(), service_path, runner }
    }
}

impl PluginHost for CommandPluginHost<'_> {
    fn spawn(&self, plugin: &str) -> Result<(), GoBuildError> {
        let words = shlex::split(plugin).ok_or_else(|| {
            GoBuildError::InvalidCommand(format!("unbalanced quoting in test plugin '{plugin}'"))
        })?;
        let command = CommandSpec::new(self.program.as_str()).args(words);
        info!("Triggering test plugin: {command}");

        match self.runner.run(&command, self.service_path) {
            Ok(outcome) if outcome.success() => Ok(()),
            Ok(outcome) => {
                error!("Test plugin `{command}` exited with {:?}", outcome.code);
                Err(GoBuildError::PluginFailure { plugin: plugin.to_string() })
            }
            Err(err) => {
                error!("Failed to spawn test plugin `{command}`: {err}");
                Err(GoBuildError::PluginFailure { plugin: plugin.to_string() })
            }
        }
    }
}

/// Tests and plugins that ran during a successful test pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestSummary {
    pub plugins: Vec<String>,
    pub tests: Vec<String>,
}

/// Runs the configured test commands.
pub struct GoTester<'a> {
    pub service_path: &'a Path,
    pub config: &'a GoBuildConfig,
    pub runner: &'a dyn CommandRunner,
    pub plugins: &'a dyn PluginHost,
}

impl GoTester<'_> {
    /// Trigger the test plugins, wait the configured delay, then run each test
    /// in order, stopping at the first failure.
    ///
    /// Returns normally on success; deciding the process exit status is left
    /// to the caller.
    pub fn run(&self) -> Result<TestSummary, GoBuildError> {
        info!("Running Go tests");

        if self.config.tests.is_empty() {
            warn!("No tests to run - add tests to custom.go-build.tests in your serverless file.");
        }

        let mut summary = TestSummary::default();
        for plugin in &self.config.test_plugins {
            self.plugins.spawn(plugin)?;
            summary.plugins.push(plugin.clone());
        }

        let delay = self.config.test_start_delay();
        if !delay.is_zero() {
            info!("Waiting {}ms before running tests", delay.as_millis());
            thread::sleep(delay);
        }

        for test in &self.config.tests {
            let command = self.config.test_cmd.render("", &[test.as_str()]).map_err(|err| {
                error!("Error running test on {test}: {err}");
                GoBuildError::TestFailure { test: test.clone(), command: None }
            })?;
            let command_line = command.command_line();
            info!("{command_line}");

            let succeeded = match self.runner.run(&command, self.service_path) {
                Ok(outcome) => outcome.success(),
                Err(err) => {
                    error!("Failed to spawn {}: {err}", command.program);
                    false
                }
            };
            if !succeeded {
                error!("Error running test on {test}\nTo replicate please run:\n{command_line}\n");
                return Err(GoBuildError::TestFailure {
                    test: test.clone(),
                    command: Some(command_line),
                });
            }
            summary.tests.push(test.clone());
        }

        info!("Tests successfully exited");
        Ok(summary)
    }
}
