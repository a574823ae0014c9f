//! CLI argument parsing using StructOpt.

use structopt::StructOpt;

use crate::cli::commands::{best_action::BestActionArgs, watch::WatchArgs};
use crate::cli::CliError;

#[derive(StructOpt)]
#[structopt(
    name = "abagent",
    about = "A time-bounded alpha-beta game-playing agent, demonstrated on the subtraction game"
)]
pub enum Abagent {
    #[structopt(
        name = "best-action",
        about = "Print the number of tokens the agent takes from a pile of `--tokens`, searching for `--budget-ms` milliseconds (default: 1000). The player to move is chosen with `--player` (default: 0)."
    )]
    BestAction(BestActionArgs),
    #[structopt(
        name = "watch",
        about = "Watch the agent play a whole game against itself or, with `--opponent random`, against a random player. Prints every move and the final outcome vector."
    )]
    Watch(WatchArgs),
}

impl crate::cli::commands::Command for Abagent {
    fn execute(self) -> Result<(), CliError> {
        macro_rules! execute_command {
            ($($variant:ident($cmd:ident)),+ $(,)?) => {
                match self {
                    $(Self::$variant($cmd) => $cmd.execute(),)+
                }
            };
        }

        execute_command! {
            BestAction(cmd),
            Watch(cmd),
        }
    }
}
