//! Watch command - watch the agent play a whole game.

use std::str::FromStr;
use std::time::Duration;

use abagent::agent::Agent;
use abagent::alpha_beta_searcher::{GameState, SearchError};
use abagent::games::SubtractionGame;
use log::info;
use structopt::StructOpt;

use super::util::{create_agent, GameArgs};
use super::Command;
use crate::cli::CliError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opponent {
    Engine,
    Random,
}

impl FromStr for Opponent {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "engine" => Ok(Opponent::Engine),
            "random" => Ok(Opponent::Random),
            other => Err(CliError::UnknownOpponent(other.to_string())),
        }
    }
}

#[derive(StructOpt)]
pub struct WatchArgs {
    #[structopt(flatten)]
    pub game: GameArgs,
    #[structopt(long, default_value = "engine", help = "Who plays the other seat: `engine` or `random`")]
    pub opponent: Opponent,
    #[structopt(long, default_value = "0", help = "Seat of the agent when facing a random opponent")]
    pub seat: usize,
    #[structopt(
        long = "delay",
        default_value = "0",
        help = "Delay between moves in milliseconds"
    )]
    pub delay_ms: u64,
}

impl Command for WatchArgs {
    fn execute(self) -> Result<(), CliError> {
        if self.seat > 1 {
            return Err(CliError::InvalidPlayer(self.seat));
        }
        let mut state = self.game.starting_position(0)?;

        let mut agents: Vec<Option<Agent<SubtractionGame>>> = Vec::with_capacity(2);
        for seat in 0..2 {
            let engine_seat = self.opponent == Opponent::Engine || seat == self.seat;
            agents.push(if engine_seat {
                Some(create_agent(&self.game, seat)?)
            } else {
                None
            });
        }
        let mut rng = match self.game.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        println!("{}", state);
        while state.outcome().is_none() {
            let mover = state.to_move();
            let action = match agents[mover].as_mut() {
                Some(agent) => agent.compute_next_action(&state, self.game.budget())?,
                None => {
                    let actions = state.legal_actions();
                    actions
                        .get(rng.usize(..actions.len()))
                        .copied()
                        .ok_or(SearchError::NoAvailableActions)?
                }
            };

            if let Some(stats) = agents[mover].as_ref().and_then(Agent::stats) {
                info!(
                    "player {} searched to depth {} in {} rounds (fast path: {})",
                    mover, stats.last_depth, stats.rounds, stats.fast_path
                );
            }
            println!("player {} takes {}", mover, action);
            state = state.apply(&action);
            println!("{}", state);

            if self.delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.delay_ms));
            }
        }

        if let Some(outcome) = state.outcome() {
            println!("outcome: {:?}", outcome);
        }
        Ok(())
    }
}
