//! Plurality-vote resolution of nodes without a single mover.
//!
//! The resolution distribution at such a node is unknown, so it is
//! estimated by sampling. The node takes on the value of whichever child
//! is currently the most frequently sampled outcome: a mode, not a
//! weighted expectation.

use log::trace;
use rand::Rng;

use super::budget::TimeBudget;
use super::node::{NodeId, SearchNode};
use super::search::SearchContext;
use super::tree::SearchTree;
use super::GameState;

impl<S: GameState> SearchNode<S> {
    /// Draws `count` resolutions of this node's state into its tally.
    /// Returns the number of samples recorded.
    pub(super) fn record_samples<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> usize {
        let state = &self.state;
        let tally = match self.tally.as_mut() {
            Some(tally) => tally,
            None => return 0,
        };

        let mut recorded = 0;
        for _ in 0..count {
            if let Some(action) = state.sample_resolution(rng) {
                *tally.entry(action).or_insert(0) += 1;
                recorded += 1;
            }
        }
        recorded
    }

    pub(super) fn has_samples(&self) -> bool {
        self.tally.as_ref().map_or(false, |tally| !tally.is_empty())
    }

    /// True when no other action has been sampled more often than
    /// `action` and `action` has been sampled at least once.
    pub fn is_plurality(&self, action: &S::Action) -> bool {
        let tally = match self.tally.as_ref() {
            Some(tally) => tally,
            None => return false,
        };
        match tally.get(action) {
            Some(&count) => tally.values().all(|&other| other <= count),
            None => false,
        }
    }
}

/// Backs `child`'s value up into its no-single-mover `parent`.
pub(super) fn resolve<S: GameState>(
    context: &mut SearchContext,
    tree: &mut SearchTree<S>,
    budget: &TimeBudget,
    child: NodeId,
    parent: NodeId,
) {
    let siblings = tree.children(parent).len().max(1);

    if !tree.node(parent).has_samples() {
        let factor = context.depth.simulation_time_factor(budget.remaining());
        let initial = ((siblings as f64 * factor).round() as usize).max(siblings);
        let drawn = tree.node_mut(parent).record_samples(&mut context.rng, initial);
        context.stats.chance_samples += drawn as u64;
        trace!("initial sampling of chance node: {} draws", drawn);
    }
    let drawn = tree.node_mut(parent).record_samples(&mut context.rng, siblings);
    context.stats.chance_samples += drawn as u64;

    let adopt = {
        let child_node = tree.node(child);
        match (child_node.action(), child_node.evaluation()) {
            (Some(action), Some(value)) if tree.node(parent).is_plurality(action) => Some(value),
            _ => None,
        }
    };
    if let Some(value) = adopt {
        let pass = context.pass;
        tree.node_mut(parent).set_evaluation(value, pass);
    }
}
