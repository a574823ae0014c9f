//! Shared utilities for CLI commands.

use std::time::Duration;

use abagent::agent::{Agent, AgentConfig};
use abagent::games::SubtractionGame;
use structopt::StructOpt;

use crate::cli::CliError;

#[derive(StructOpt)]
pub struct GameArgs {
    #[structopt(short, long, default_value = "10")]
    pub tokens: u32,
    #[structopt(long, help = "Number of actions after which the game is drawn")]
    pub ply_limit: Option<u32>,
    #[structopt(long, default_value = "2", help = "Most tokens a player may take at once")]
    pub max_take: u32,
    #[structopt(
        long = "budget-ms",
        default_value = "1000",
        help = "Time budget per decision in milliseconds"
    )]
    pub budget_ms: u64,
    #[structopt(long, default_value = "64")]
    pub max_depth: u32,
    #[structopt(long, help = "Seed for the sampling random number generators")]
    pub seed: Option<u64>,
}

impl GameArgs {
    pub(crate) fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }

    pub(crate) fn starting_position(&self, first_player: usize) -> Result<SubtractionGame, CliError> {
        if self.tokens == 0 {
            return Err(CliError::NoTokens);
        }
        if first_player > 1 {
            return Err(CliError::InvalidPlayer(first_player));
        }

        let mut game = SubtractionGame::new(self.tokens)
            .with_max_take(self.max_take)
            .with_first_player(first_player);
        if let Some(limit) = self.ply_limit {
            game = game.with_ply_limit(limit);
        }
        Ok(game)
    }
}

pub(crate) fn create_config(args: &GameArgs) -> AgentConfig {
    AgentConfig {
        max_depth: args.max_depth,
        seed: args.seed,
        ..AgentConfig::default()
    }
}

pub(crate) fn create_agent(args: &GameArgs, seat: usize) -> Result<Agent<SubtractionGame>, CliError> {
    let mut agent = Agent::with_config(create_config(args));
    agent.set_up(2, seat)?;
    Ok(agent)
}
