//! Best action command - determine the agent's choice in one position.

use structopt::StructOpt;

use super::util::{create_agent, GameArgs};
use super::Command;
use crate::cli::CliError;

#[derive(StructOpt)]
pub struct BestActionArgs {
    #[structopt(flatten)]
    pub game: GameArgs,
    #[structopt(short, long, default_value = "0", help = "Player to move (0 or 1)")]
    pub player: usize,
}

impl Command for BestActionArgs {
    fn execute(self) -> Result<(), CliError> {
        let state = self.game.starting_position(self.player)?;
        let mut agent = create_agent(&self.game, self.player)?;

        let action = agent.compute_next_action(&state, self.game.budget())?;
        println!("{}", action);

        if let (Some(stats), Some(value)) = (agent.stats(), agent.root_evaluation()) {
            eprintln!(
                "{} -> take {} (utility {:.2}, depth {}, {} rounds, {} nodes)",
                state,
                action,
                value.utility,
                stats.last_depth,
                stats.rounds,
                agent.tree_size()
            );
        }
        Ok(())
    }
}
