//! Core traits for the rule-agnostic search.

use std::fmt::Debug;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::Rng;

/// Who decides the next action at a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mover {
    /// A seat index in `0..player_count`.
    Player(usize),
    /// No single decision-maker: chance or simultaneous-move resolution.
    Nature,
}

impl Mover {
    #[inline]
    pub fn is_player(self, index: usize) -> bool {
        self == Mover::Player(index)
    }

    #[inline]
    pub fn is_nature(self) -> bool {
        self == Mover::Nature
    }
}

/// Per-player weights that fold a multi-player outcome into one scalar
/// from the acting agent's point of view.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationWeights(Vec<f64>);

impl EvaluationWeights {
    /// `+1` for the agent's own seat, `-1` for every other seat.
    pub fn for_player(player_count: usize, agent_index: usize) -> Self {
        Self(
            (0..player_count)
                .map(|seat| if seat == agent_index { 1.0 } else { -1.0 })
                .collect(),
        )
    }

    /// Weighted sum of a raw per-player score vector. Seats missing from
    /// either side contribute nothing.
    pub fn weigh(&self, scores: &[f64]) -> f64 {
        self.0.iter().zip(scores).map(|(w, s)| w * s).sum()
    }
}

/// An immutable game state the search can reason about without knowing
/// the rules behind it.
///
/// The `Ord` bound is a total tie-break between states that score the
/// same; it only has to be consistent, not meaningful.
pub trait GameState: Clone + Eq + Ord + Debug {
    type Action: Clone + Eq + Hash + Debug;

    fn player_count(&self) -> usize;

    fn mover(&self) -> Mover;

    /// All legal actions. Non-empty unless the state is terminal.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Returns the successor state reached by `action`.
    fn apply(&self, action: &Self::Action) -> Self;

    fn is_terminal(&self) -> bool;

    /// Exact, outcome-derived score under the given weights.
    fn utility(&self, weights: &EvaluationWeights) -> f64;

    /// Estimated score, usable at non-terminal states. Defaults to the
    /// utility for games without a better estimate.
    fn heuristic(&self, weights: &EvaluationWeights) -> f64 {
        self.utility(weights)
    }

    /// The action that produced this state, if any.
    fn previous_action(&self) -> Option<&Self::Action>;

    /// Draws one plausible resolving action. Only consulted when
    /// `mover()` is `Mover::Nature`; the default picks uniformly among the
    /// legal actions.
    fn sample_resolution<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Action> {
        self.legal_actions().choose(rng).cloned()
    }
}
