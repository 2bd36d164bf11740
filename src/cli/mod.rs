//! Command-line interface module.

mod args;
pub mod maintenance;
pub mod serve;

pub use args::{Cli, Commands};
