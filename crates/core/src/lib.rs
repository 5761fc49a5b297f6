//! gobuild-core
//!
//! Core library for building Go function handlers of a serverless service.
//!
//! This crate decides which declared functions are Go functions, plans and
//! writes generated entry points for library-style handlers, drives the Go
//! compiler, the executable packer and the configured test commands, and
//! rewrites function handlers to point at the built binaries before packaging.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends; the CLI only loads the service and maps
//! results to exit codes.

pub mod config;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
