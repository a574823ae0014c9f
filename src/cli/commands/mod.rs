//! CLI command implementations.

use super::CliError;

pub trait Command {
    fn execute(self) -> Result<(), CliError>;
}

pub mod best_action;
pub mod watch;

// Shared utilities for commands
pub(crate) mod util;
