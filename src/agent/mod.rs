//! The decision-making agent: owns the search tree for a whole match and
//! turns a state plus a time budget into an action.

mod config;

#[cfg(test)]
mod tests;

use std::cmp::Ordering;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use crate::alpha_beta_searcher::ordering::{compare_evaluations, rank_nodes};
use crate::alpha_beta_searcher::{
    label_alpha_beta, label_minimax, DepthController, Evaluation, GameState, SearchContext,
    SearchError, SearchStats, SearchTree, TimeBudget,
};

pub use config::AgentConfig;

pub struct Agent<S: GameState> {
    config: AgentConfig,
    context: Option<SearchContext>,
    tree: Option<SearchTree<S>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<S: GameState> Default for Agent<S> {
    fn default() -> Self {
        Self::with_config(AgentConfig::default())
    }
}

impl<S: GameState> Agent<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self {
            config,
            context: None,
            tree: None,
            cancel: None,
        }
    }

    /// Attaches an external interruption flag, polled together with the
    /// deadline.
    pub fn with_cancellation(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Prepares the agent for a new match, dropping the tree and the
    /// branching statistics of any previous one.
    pub fn set_up(&mut self, player_count: usize, agent_index: usize) -> Result<(), SearchError> {
        if agent_index >= player_count {
            return Err(SearchError::InvalidAgentIndex {
                index: agent_index,
                players: player_count,
            });
        }

        let depth = DepthController::new(self.config.max_depth, self.config.depth.clone());
        let context = SearchContext::new(player_count, agent_index, depth, self.config.seed)
            .with_check_interval(self.config.check_interval)
            .with_max_quiescence_plies(self.config.max_quiescence_plies);

        self.context = Some(context);
        self.tree = None;
        debug!("set up as player {} of {}", agent_index, player_count);
        Ok(())
    }

    pub fn tear_down(&mut self) {
        self.tree = None;
        self.context = None;
    }

    /// Diagnostics of the most recent call.
    pub fn stats(&self) -> Option<&SearchStats> {
        self.context.as_ref().map(SearchContext::stats)
    }

    pub fn tree_size(&self) -> usize {
        self.tree.as_ref().map_or(0, SearchTree::len)
    }

    pub fn root_evaluation(&self) -> Option<Evaluation> {
        self.tree
            .as_ref()
            .and_then(|tree| tree.node(tree.root()).evaluation())
    }

    pub fn tree(&self) -> Option<&SearchTree<S>> {
        self.tree.as_ref()
    }

    /// Returns the best action found for `state` within `budget`.
    ///
    /// Never fails for a non-terminal state once the agent is set up; when
    /// time runs short the answer degrades to a shallower or greedy choice.
    #[cfg_attr(feature = "instrumentation", instrument(skip_all))]
    pub fn compute_next_action(
        &mut self,
        state: &S,
        budget: Duration,
    ) -> Result<S::Action, SearchError> {
        let context = self.context.as_mut().ok_or(SearchError::NotSetUp)?;
        if state.is_terminal() || state.legal_actions().is_empty() {
            return Err(SearchError::NoAvailableActions);
        }

        let budget = TimeBudget::new(budget, self.config.time_safety_ratio)
            .with_cancellation(self.cancel.clone());
        context.begin_call();

        let (tree, reused) = match self.tree.take() {
            Some(mut tree) => {
                let reused = tree.reroot(state);
                (tree, reused)
            }
            None => (SearchTree::new(state.clone()), false),
        };
        let tree = self.tree.insert(tree);
        trace!(
            "searching for root of tree, {}",
            if reused { "done" } else { "failed" }
        );

        if let Some(action) = forced_outcome(context, tree) {
            trace!("best line already ends the game");
            context.stats.fast_path = true;
            return Ok(action);
        }

        let mut excess_time = 2;
        let mut round = 1;
        while !budget.should_stop()
            && excess_time > 1
            && round <= context.depth_controller().last_depth()
        {
            let depth = context
                .depth_controller_mut()
                .next_depth(budget.remaining(), excess_time);
            trace!("labeling tree {} times at depth {}", round, depth);

            let completed = label_alpha_beta(context, tree, &budget, depth);
            context.stats.rounds += 1;
            if !completed {
                trace!("round {} did not finish, keeping the labels of the previous one", round);
                break;
            }

            excess_time = budget.excess_time();
            round += 1;
        }
        context.stats.last_depth = context.depth_controller().last_depth();

        debug!(
            "done with {} alpha cut-offs, {} beta cut-offs and {:?} left",
            context.stats.alpha_cutoffs,
            context.stats.beta_cutoffs,
            budget.remaining_total()
        );

        let root = tree.root();
        if tree.node(root).is_leaf() {
            debug!("could not find a move, choosing the next best greedy option");
            context.stats.greedy_fallback = true;
            return greedy_action(context, state).ok_or(SearchError::NoAvailableActions);
        }

        if !tree.node(root).is_evaluated() {
            context.stats.guaranteed_pass = true;
            label_minimax(context, tree, &budget);
        }

        if let Some(value) = tree.node(root).evaluation() {
            debug!(
                "utility: {:.1}, heuristic: {:.1} with a tree size of {}",
                value.utility,
                value.heuristic,
                tree.len()
            );
        }

        tree.best_child(root, |a, b| rank_nodes(a, b, true))
            .and_then(|child| tree.node(child).action().cloned())
            .ok_or(SearchError::NoAvailableActions)
    }
}

/// Follows the top-ranked child from the root through already-evaluated
/// nodes. If that walk ends on an evaluated terminal state through
/// deterministic movers only, the outcome is known and the best root
/// action is returned without searching.
fn forced_outcome<S: GameState>(context: &SearchContext, tree: &mut SearchTree<S>) -> Option<S::Action> {
    let mut id = tree.root();
    loop {
        let node = tree.node(id);
        if node.is_leaf() || !node.is_evaluated() {
            break;
        }
        let mover = node.state().mover();
        if mover.is_nature() {
            return None;
        }

        let maximizing = context.is_agent(mover);
        tree.sort_children(id, |a, b| rank_nodes(b, a, maximizing));
        id = *tree.children(id).first()?;
    }

    let node = tree.node(id);
    if !(node.is_evaluated() && node.state().is_terminal()) {
        return None;
    }

    let root = tree.root();
    tree.best_child(root, |a, b| rank_nodes(a, b, true))
        .and_then(|child| tree.node(child).action().cloned())
}

/// One-ply fallback: scores every successor directly and picks the best
/// for the agent.
fn greedy_action<S: GameState>(context: &SearchContext, state: &S) -> Option<S::Action> {
    state
        .legal_actions()
        .into_iter()
        .map(|action| {
            let successor = state.apply(&action);
            let value = Evaluation::of(&successor, context.weights());
            (action, successor, value)
        })
        .max_by(|(_, state_a, a), (_, state_b, b)| compare(a, state_a, b, state_b))
        .map(|(action, _, _)| action)
}

fn compare<S: Ord>(a: &Evaluation, state_a: &S, b: &Evaluation, state_b: &S) -> Ordering {
    compare_evaluations(a, b).then_with(|| state_a.cmp(state_b))
}
