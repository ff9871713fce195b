pub mod commands;
pub mod context;
pub mod logging;
pub mod repl;

#[cfg(test)]
mod commands_tests;

pub use context::{ReplContext, ShellDashboard};
pub use repl::readline;
