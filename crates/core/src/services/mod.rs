//! Operations run by the plugin's commands, leaves first: artifact paths,
//! function selection, entry-point planning/generation, external process
//! execution, then the build, compression, test and deployment steps.

pub mod build;
pub mod compress;
pub mod deploy;
pub mod entrypoint;
pub mod paths;
pub mod process;
pub mod selection;
pub mod testing;

use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the plugin's steps.
///
/// Build, test and compression failures carry only the human-readable
/// category plus what is needed to reproduce them; the underlying detail is
/// logged at the point of failure.
#[derive(Debug, Error)]
pub enum GoBuildError {
    /// A generated entry point would import a module outside the toolchain root.
    #[error(
        "Module path not in GOPATH - set gopath in serverless if needed ({} is outside {})",
        .module_path.display(),
        .toolchain_root.display()
    )]
    PathOutsideToolchainRoot { module_path: PathBuf, toolchain_root: PathBuf },

    /// Directory creation or file write failure.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Go build failure")]
    BuildFailure { function: String, command: Option<String> },

    #[error("Go test failure")]
    TestFailure { test: String, command: Option<String> },

    #[error("UPX compressing failure")]
    CompressFailure { binaries: Vec<String> },

    #[error("Test plugin '{plugin}' failed")]
    PluginFailure { plugin: String },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}
