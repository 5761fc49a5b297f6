pub mod build;
pub mod package;
pub mod plan;
pub mod util;

pub use build::*;
pub use package::*;
pub use plan::*;
pub use test::*;
pub use util::*;
