use std::fmt;

use serde::{Deserialize, Serialize};

use crate::services::process::CommandSpec;
use crate::services::GoBuildError;

/// A configured command with positional `%N` placeholders.
///
/// Accepts either a single shell-like line (`go test %1`) or an explicit word
/// list (`["go", "test", "%1"]`). Lines are split with POSIX shell-word rules
/// but never handed to a shell; placeholders are substituted inside each word
/// after splitting, so substituted values are never re-split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandTemplate {
    Line(String),
    Words(Vec<String>),
}

impl CommandTemplate {
    /// Split the template into words without substituting placeholders.
    pub fn words(&self) -> Result<Vec<String>, GoBuildError> {
        match self {
            CommandTemplate::Line(line) => shlex::split(line).ok_or_else(|| {
                GoBuildError::InvalidCommand(format!("unbalanced quoting in '{line}'"))
            }),
            CommandTemplate::Words(words) => Ok(words.clone()),
        }
    }

    /// Render a runnable command.
    ///
    /// `prefix` is split the same way as a line template and placed in front of
    /// the template's own words; `values[0]` replaces `%1`, `values[1]` replaces
    /// `%2`, and so on. Leading `KEY=VALUE` words become environment assignments.
    pub fn render(&self, prefix: &str, values: &[&str]) -> Result<CommandSpec, GoBuildError> {
        let mut words = shlex::split(prefix).ok_or_else(|| {
            GoBuildError::InvalidCommand(format!("unbalanced quoting in prefix '{prefix}'"))
        })?;
        words.extend(self.words()?);

        let mut words = words.into_iter().map(|w| substitute_placeholders(&w, values)).peekable();
        let mut env = Vec::new();
        while let Some((key, value)) = words.peek().and_then(|w| split_assignment(w)) {
            env.push((key, value));
            words.next();
        }

        let program = words
            .next()
            .ok_or_else(|| GoBuildError::InvalidCommand(format!("no program in '{self}'")))?;

        Ok(CommandSpec { env, program, args: words.collect() })
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandTemplate::Line(line) => f.write_str(line),
            CommandTemplate::Words(words) => f.write_str(&words.join(" ")),
        }
    }
}

/// Replace `%1`..`%N` with the matching value; out-of-range placeholders stay as written.
pub fn substitute_placeholders(word: &str, values: &[&str]) -> String {
    let mut out = String::with_capacity(word.len());
    let mut chars = word.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let digits_start = idx + 1;
        let mut digits_end = digits_start;
        while let Some(&(next_idx, next)) = chars.peek() {
            if !next.is_ascii_digit() {
                break;
            }
            digits_end = next_idx + next.len_utf8();
            chars.next();
        }
        let replacement = word[digits_start..digits_end]
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| values.get(n));
        match replacement {
            Some(value) => out.push_str(value),
            None => out.push_str(&word[idx..digits_end]),
        }
    }

    out
}

fn split_assignment(word: &str) -> Option<(String, String)> {
    let (key, value) = word.split_once('=')?;
    let mut chars = key.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
