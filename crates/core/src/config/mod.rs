//! Plugin configuration resolved from the `custom.go-build` section of a service.
//!
//! Every option has a documented built-in default. User overrides are merged
//! on top of the defaults one key at a time, so a missing section, a section
//! that is not a mapping, or a single malformed value never fails resolution:
//! the affected key simply keeps its default.

mod build_config;
mod command;
mod upx;

pub use build_config::*;
pub use command::*;
pub use upx::*;
