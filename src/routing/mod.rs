//! Route compilation from resource config.

mod compiler;
mod route;

pub use compiler::*;
pub use route::*;
