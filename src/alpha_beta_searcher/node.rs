//! A single vertex of the search tree.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{EvaluationWeights, GameState};

pub type NodeId = usize;
pub(crate) type Children = SmallVec<[NodeId; 8]>;

/// A (utility, heuristic) pair, always set together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub utility: f64,
    pub heuristic: f64,
}

impl Evaluation {
    pub fn new(utility: f64, heuristic: f64) -> Self {
        Self { utility, heuristic }
    }

    pub fn of<S: GameState>(state: &S, weights: &EvaluationWeights) -> Self {
        Self::new(state.utility(weights), state.heuristic(weights))
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.utility.max(other.utility),
            self.heuristic.max(other.heuristic),
        )
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.utility.min(other.utility),
            self.heuristic.min(other.heuristic),
        )
    }
}

pub struct SearchNode<S: GameState> {
    pub(super) state: S,
    action: Option<S::Action>,
    depth: u32,
    value: Option<Evaluation>,
    /// Labeling pass that last wrote `value`.
    pass: u32,
    /// What `value` was before `pass` first overwrote it.
    previous: Option<Evaluation>,
    static_value: Option<Evaluation>,
    /// Only present on nodes whose mover is `Mover::Nature`.
    pub(super) tally: Option<FxHashMap<S::Action, u32>>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Children,
}

impl<S: GameState> SearchNode<S> {
    pub(crate) fn new(state: S, action: Option<S::Action>, depth: u32) -> Self {
        let tally = state.mover().is_nature().then(FxHashMap::default);
        Self {
            state,
            action,
            depth,
            value: None,
            pass: 0,
            previous: None,
            static_value: None,
            tally,
            parent: None,
            children: Children::new(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// The action that led here from the parent; `None` for a fresh root.
    pub fn action(&self) -> Option<&S::Action> {
        self.action.as_ref()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.is_some()
    }

    pub fn evaluation(&self) -> Option<Evaluation> {
        self.value
    }

    pub(crate) fn pass(&self) -> u32 {
        self.pass
    }

    pub(crate) fn set_evaluation(&mut self, value: Evaluation, pass: u32) {
        if self.pass != pass {
            self.previous = self.value;
            self.pass = pass;
        }
        self.value = Some(value);
    }

    /// Undoes every write of `pass`, restoring the value the node held
    /// before it.
    pub(crate) fn roll_back(&mut self, pass: u32) {
        if self.pass == pass {
            self.value = self.previous.take();
        }
    }

    pub(crate) fn clear_evaluation(&mut self) {
        self.value = None;
    }

    /// The state's own score, computed once and cached.
    pub fn static_evaluation(&mut self, weights: &EvaluationWeights) -> Evaluation {
        match self.static_value {
            Some(value) => value,
            None => {
                let value = Evaluation::of(&self.state, weights);
                self.static_value = Some(value);
                value
            }
        }
    }

    pub(crate) fn cached_static_evaluation(&self) -> Option<Evaluation> {
        self.static_value
    }

    /// Backed-up value when evaluated, static value otherwise.
    pub(crate) fn ordering_value(&self) -> Option<Evaluation> {
        self.value.or(self.static_value)
    }

    pub fn tally(&self) -> Option<&FxHashMap<S::Action, u32>> {
        self.tally.as_ref()
    }
}
