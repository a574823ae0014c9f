//! Explicit-stack labeling passes over the persistent search tree.
//!
//! # Dual-window alpha-beta
//!
//! Every expanded node carries two independent alpha-beta windows, one
//! over exact utility and one over the heuristic estimate. A node is cut
//! off only once *both* windows have closed, so a line that looks lost on
//! the heuristic alone is still explored while its utility window is open.
//! Children of a no-single-mover node are never cut, and such a node never
//! tightens the windows below it.
//!
//! # Explicit stack
//!
//! Passes walk the tree depth-first with a `Vec` stack instead of
//! recursion. Each node is visited twice: once on the way down, where it is
//! either evaluated as a leaf, expanded, or cut off, and once on the way
//! back up (a return point) after all its children were processed. The
//! deadline is only polled every `check_interval` pops, which allows a
//! small, bounded overrun.
//!
//! # Backpropagation
//!
//! The first child to report to a parent within a pass re-initialises the
//! parent's value. Later children are folded in with max (agent to move),
//! min (opponent to move) or the plurality vote of the chance resolver.

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
#[cfg(feature = "instrumentation")]
use tracing::instrument;

use super::budget::TimeBudget;
use super::depth::DepthController;
use super::node::NodeId;
use super::ordering::best_first;
use super::tree::SearchTree;
use super::{chance, quiescence, EvaluationWeights, GameState, Mover};

#[derive(Error, Debug, PartialEq)]
pub enum SearchError {
    #[error("no available actions")]
    NoAvailableActions,
    #[error("agent has not been set up for a match")]
    NotSetUp,
    #[error("agent index {index} is out of range for {players} players")]
    InvalidAgentIndex { index: usize, players: usize },
}

/// Read-only diagnostics of the most recent call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchStats {
    pub alpha_cutoffs: u64,
    pub beta_cutoffs: u64,
    pub expanded_nodes: u64,
    pub quiescence_probes: u64,
    pub chance_samples: u64,
    pub rounds: u32,
    pub last_depth: u32,
    pub fast_path: bool,
    pub greedy_fallback: bool,
    pub guaranteed_pass: bool,
}

impl SearchStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything a pass needs besides the tree: whose point of view to take,
/// depth statistics, sampling state, and counters.
pub struct SearchContext {
    pub(crate) agent_index: usize,
    pub(crate) weights: EvaluationWeights,
    pub(crate) depth: DepthController,
    pub(crate) rng: StdRng,
    pub(crate) stats: SearchStats,
    pub(crate) check_interval: u32,
    pub(crate) max_quiescence_plies: u32,
    /// Identifies the labeling pass currently writing node values.
    pub(crate) pass: u32,
}

impl SearchContext {
    pub fn new(
        player_count: usize,
        agent_index: usize,
        depth: DepthController,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            agent_index,
            weights: EvaluationWeights::for_player(player_count, agent_index),
            depth,
            rng,
            stats: SearchStats::default(),
            check_interval: 31,
            max_quiescence_plies: 32,
            pass: 0,
        }
    }

    pub fn with_check_interval(mut self, check_interval: u32) -> Self {
        self.check_interval = check_interval.max(1);
        self
    }

    pub fn with_max_quiescence_plies(mut self, plies: u32) -> Self {
        self.max_quiescence_plies = plies;
        self
    }

    pub fn agent_index(&self) -> usize {
        self.agent_index
    }

    pub fn weights(&self) -> &EvaluationWeights {
        &self.weights
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn depth_controller(&self) -> &DepthController {
        &self.depth
    }

    pub fn depth_controller_mut(&mut self) -> &mut DepthController {
        &mut self.depth
    }

    /// Resets per-call state; branching statistics survive.
    pub fn begin_call(&mut self) {
        self.stats.reset();
        self.depth.begin_call();
    }

    #[inline]
    pub(crate) fn is_agent(&self, mover: Mover) -> bool {
        mover.is_player(self.agent_index)
    }

    fn next_pass(&mut self) {
        self.pass = self.pass.wrapping_add(1).max(1);
    }
}

/// Independent alpha-beta windows over utility and heuristic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub utility_alpha: f64,
    pub utility_beta: f64,
    pub heuristic_alpha: f64,
    pub heuristic_beta: f64,
}

impl Window {
    pub fn open() -> Self {
        Self {
            utility_alpha: f64::NEG_INFINITY,
            utility_beta: f64::INFINITY,
            heuristic_alpha: f64::NEG_INFINITY,
            heuristic_beta: f64::INFINITY,
        }
    }

    /// Closed only once both windows are strictly crossed; `alpha == beta`
    /// still counts as open, so this prunes less than an `alpha < beta` test.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.utility_alpha <= self.utility_beta || self.heuristic_alpha <= self.heuristic_beta
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    node: NodeId,
    returning: bool,
}

/// Expands `id` if it is an unexpanded leaf and reports whether it has
/// children to descend into.
fn expand_node<S: GameState>(context: &mut SearchContext, tree: &mut SearchTree<S>, id: NodeId) -> bool {
    let created = tree.expand(id);
    if created > 0 {
        context.depth.record_branching(created);
        context.stats.expanded_nodes += 1;
    }
    !tree.node(id).is_leaf()
}

/// Orders the children of `id` best-first for its mover and pushes them so
/// that the best one is popped first.
fn push_children<S: GameState>(
    context: &SearchContext,
    tree: &mut SearchTree<S>,
    id: NodeId,
    stack: &mut Vec<Frame>,
) {
    let maximizing = context.is_agent(tree.node(id).state().mover());
    tree.evaluate_children_statically(id, &context.weights);
    tree.sort_children(id, |a, b| best_first(a, b, maximizing));

    stack.extend(tree.children(id).iter().rev().map(|&node| Frame {
        node,
        returning: false,
    }));
}

fn parent_mover<S: GameState>(tree: &SearchTree<S>, id: NodeId) -> Option<Mover> {
    tree.parent(id).map(|parent| tree.node(parent).state().mover())
}

/// Narrows the window of `id`'s parent with `id`'s fresh value.
fn tighten<S: GameState>(context: &SearchContext, tree: &SearchTree<S>, id: NodeId, window: &mut Window) {
    let value = match tree.node(id).evaluation() {
        Some(value) => value,
        None => return,
    };
    match parent_mover(tree, id) {
        Some(Mover::Nature) => {}
        Some(mover) if !context.is_agent(mover) => {
            window.utility_beta = window.utility_beta.min(value.utility);
            window.heuristic_beta = window.heuristic_beta.min(value.heuristic);
        }
        _ => {
            window.utility_alpha = window.utility_alpha.max(value.utility);
            window.heuristic_alpha = window.heuristic_alpha.max(value.heuristic);
        }
    }
}

/// Makes sure `id` has a value and backs it up into its parent.
pub(super) fn evaluate_node<S: GameState>(
    context: &mut SearchContext,
    tree: &mut SearchTree<S>,
    budget: &TimeBudget,
    id: NodeId,
    hurry: bool,
) {
    if !tree.node(id).is_evaluated() {
        quiescence::resolve(context, tree, budget, id, hurry);
    }

    let parent = match tree.parent(id) {
        Some(parent) => parent,
        None => return,
    };
    let value = match tree.node(id).evaluation() {
        Some(value) => value,
        None => return,
    };

    let pass = context.pass;
    let (fresh, mover, current) = {
        let parent_node = tree.node(parent);
        (
            parent_node.pass() != pass || !parent_node.is_evaluated(),
            parent_node.state().mover(),
            parent_node.evaluation(),
        )
    };

    match (fresh, mover, current) {
        (false, Mover::Nature, _) => chance::resolve(context, tree, budget, id, parent),
        (false, mover, Some(current)) => {
            let folded = if context.is_agent(mover) {
                current.max(value)
            } else {
                current.min(value)
            };
            tree.node_mut(parent).set_evaluation(folded, pass);
        }
        _ => tree.node_mut(parent).set_evaluation(value, pass),
    }
}

/// One dual-window alpha-beta labeling pass to `depth` plies below the
/// root. Returns `false` if the deadline interrupted the pass; the values
/// written by an interrupted pass are rolled back, so the tree keeps the
/// labels of the last completed one.
#[cfg_attr(feature = "instrumentation", instrument(skip_all))]
pub fn label_alpha_beta<S: GameState>(
    context: &mut SearchContext,
    tree: &mut SearchTree<S>,
    budget: &TimeBudget,
    depth: u32,
) -> bool {
    context.next_pass();
    let root = tree.root();
    let target = tree.node(root).depth().saturating_add(depth);

    let mut stack = vec![Frame {
        node: root,
        returning: false,
    }];
    let mut windows = vec![Window::open()];
    let mut pops: u32 = 0;

    while let Some(&frame) = stack.last() {
        if pops % context.check_interval == 0 && budget.should_stop() {
            debug!("labeling pass to depth {} interrupted by the deadline", depth);
            tree.roll_back(context.pass);
            return false;
        }
        pops = pops.wrapping_add(1);

        let id = frame.node;
        if frame.returning || tree.node(id).depth() >= target || !expand_node(context, tree, id) {
            if frame.returning {
                windows.pop();
            }
            evaluate_node(context, tree, budget, id, false);
            if let Some(window) = windows.last_mut() {
                tighten(context, tree, id, window);
            }
            stack.pop();
        } else if windows.last().map_or(true, Window::is_open)
            || parent_mover(tree, id) == Some(Mover::Nature)
        {
            if let Some(top) = stack.last_mut() {
                top.returning = true;
            }
            push_children(context, tree, id, &mut stack);
            let window = windows.last().copied().unwrap_or_else(Window::open);
            windows.push(window);
        } else {
            match parent_mover(tree, id) {
                Some(mover) if context.is_agent(mover) => context.stats.beta_cutoffs += 1,
                _ => context.stats.alpha_cutoffs += 1,
            }
            tree.prune(id);
            stack.pop();
        }
    }

    true
}

/// Unpruned minimax labeling without a depth cap. Once the deadline has
/// passed it stops expanding and unwinds, evaluating every pending node
/// from what is already in the tree, so the root always ends up with a
/// value.
#[cfg_attr(feature = "instrumentation", instrument(skip_all))]
pub fn label_minimax<S: GameState>(
    context: &mut SearchContext,
    tree: &mut SearchTree<S>,
    budget: &TimeBudget,
) {
    context.next_pass();
    let mut stack = vec![Frame {
        node: tree.root(),
        returning: false,
    }];
    let mut hurry = false;
    let mut pops: u32 = 0;

    while let Some(&frame) = stack.last() {
        if !hurry && pops % context.check_interval == 0 && budget.should_stop() {
            debug!("guaranteed labeling pass is unwinding after the deadline");
            hurry = true;
        }
        pops = pops.wrapping_add(1);

        let id = frame.node;
        let descend = !frame.returning
            && if hurry {
                !tree.node(id).is_leaf()
            } else {
                expand_node(context, tree, id)
            };

        if descend {
            if let Some(top) = stack.last_mut() {
                top.returning = true;
            }
            push_children(context, tree, id, &mut stack);
        } else {
            evaluate_node(context, tree, budget, id, hurry);
            stack.pop();
        }
    }
}
