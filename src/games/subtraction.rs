//! Two-player subtraction game.
//!
//! Players alternately remove between one and `max_take` tokens from a
//! shared pile; whoever takes the last token wins. With a ply limit, the
//! game ends in a draw once that many actions were played and tokens
//! remain.

use std::fmt;

use crate::alpha_beta_searcher::{EvaluationWeights, GameState, Mover};

pub const PLAYERS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubtractionGame {
    tokens: u32,
    to_move: usize,
    plies: u32,
    ply_limit: Option<u32>,
    max_take: u32,
    last_take: Option<u32>,
}

impl SubtractionGame {
    pub fn new(tokens: u32) -> Self {
        Self {
            tokens,
            to_move: 0,
            plies: 0,
            ply_limit: None,
            max_take: 2,
            last_take: None,
        }
    }

    /// The game is drawn once `limit` actions were played without
    /// emptying the pile.
    pub fn with_ply_limit(mut self, limit: u32) -> Self {
        self.ply_limit = Some(limit);
        self
    }

    pub fn with_max_take(mut self, max_take: u32) -> Self {
        self.max_take = max_take.max(1);
        self
    }

    pub fn with_first_player(mut self, player: usize) -> Self {
        self.to_move = player % PLAYERS;
        self
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    pub fn to_move(&self) -> usize {
        self.to_move
    }

    pub fn plies(&self) -> u32 {
        self.plies
    }

    fn limit_reached(&self) -> bool {
        self.ply_limit.map_or(false, |limit| self.plies >= limit)
    }

    /// Final score per player: `1` for the winner, `0` for the loser,
    /// `0.5` each for a draw. `None` while the game is running.
    pub fn outcome(&self) -> Option<[f64; PLAYERS]> {
        if self.tokens == 0 {
            let winner = 1 - self.to_move;
            let mut outcome = [0.0; PLAYERS];
            outcome[winner] = 1.0;
            Some(outcome)
        } else if self.limit_reached() {
            Some([0.5; PLAYERS])
        } else {
            None
        }
    }
}

impl GameState for SubtractionGame {
    type Action = u32;

    fn player_count(&self) -> usize {
        PLAYERS
    }

    fn mover(&self) -> Mover {
        Mover::Player(self.to_move)
    }

    fn legal_actions(&self) -> Vec<u32> {
        if self.is_terminal() {
            return vec![];
        }
        (1..=self.max_take.min(self.tokens)).collect()
    }

    fn apply(&self, action: &u32) -> Self {
        let take = (*action).min(self.tokens);
        Self {
            tokens: self.tokens - take,
            to_move: 1 - self.to_move,
            plies: self.plies + 1,
            last_take: Some(take),
            ..self.clone()
        }
    }

    fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    fn utility(&self, weights: &EvaluationWeights) -> f64 {
        match self.outcome() {
            Some(outcome) => weights.weigh(&outcome),
            None => 0.0,
        }
    }

    fn previous_action(&self) -> Option<&u32> {
        self.last_take.as_ref()
    }
}

impl fmt::Display for SubtractionGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} token{} left, player {} to move",
            self.tokens,
            if self.tokens == 1 { "" } else { "s" },
            self.to_move
        )?;
        if let Some(limit) = self.ply_limit {
            write!(f, " (ply {}/{})", self.plies, limit)?;
        }
        Ok(())
    }
}
