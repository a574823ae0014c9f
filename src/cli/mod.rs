//! Command-line interface for the search agent.
//! This module is not part of the public library API.

pub mod args;
pub mod commands;

use abagent::alpha_beta_searcher::SearchError;
use thiserror::Error;

pub use args::Abagent;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("the pile must hold at least one token")]
    NoTokens,
    #[error("player {0} does not exist, expected 0 or 1")]
    InvalidPlayer(usize),
    #[error("unknown opponent `{0}`, expected `engine` or `random`")]
    UnknownOpponent(String),
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
}
