//! Leaf resolution past the nominal depth limit.
//!
//! A leaf whose static score is an extreme among its siblings may be in
//! the middle of a swing. Instead of trusting it, one representative
//! continuation is probed: the children are ranked and the median one is
//! followed until a stable position is found.

use log::trace;

use super::budget::TimeBudget;
use super::node::NodeId;
use super::ordering::compare_nodes;
use super::search::SearchContext;
use super::tree::SearchTree;
use super::{Evaluation, GameState, Mover};

/// A node is quiet when it is the root, has at most two siblings, or its
/// static utility lies strictly between the extremes of its siblings.
pub fn appears_quiet<S: GameState>(
    context: &SearchContext,
    tree: &mut SearchTree<S>,
    id: NodeId,
) -> bool {
    let parent = match tree.parent(id) {
        Some(parent) => parent,
        None => return true,
    };
    if tree.children(parent).len() <= 2 {
        return true;
    }

    tree.evaluate_children_statically(parent, &context.weights);
    let utility = tree.node_mut(id).static_evaluation(&context.weights).utility;

    let (min, max) = tree
        .children(parent)
        .iter()
        .filter_map(|&sibling| tree.node(sibling).cached_static_evaluation())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
            (min.min(value.utility), max.max(value.utility))
        });

    min < utility && utility < max
}

/// Ensures `id` carries a value, probing median continuations where the
/// leaf does not look stable.
///
/// The probe is capped at `max_quiescence_plies` extra plies, and when
/// `hurry` is set it stops as soon as the deadline has passed; in both
/// cases the node reached so far is evaluated as it stands.
pub(super) fn resolve<S: GameState>(
    context: &mut SearchContext,
    tree: &mut SearchTree<S>,
    budget: &TimeBudget,
    id: NodeId,
    hurry: bool,
) {
    let mut current = id;
    let mut quiet = false;
    let mut plies = 0;

    let value = loop {
        if let Some(value) = tree.node(current).evaluation() {
            break value;
        }

        let (terminal, mover) = {
            let state = tree.node(current).state();
            (state.is_terminal(), state.mover())
        };
        let settled = terminal
            || (matches!(mover, Mover::Player(_)) && (quiet || appears_quiet(context, tree, current)))
            || plies >= context.max_quiescence_plies
            || (hurry && budget.should_stop());

        if settled {
            break evaluate_statically(context, tree, current);
        }

        let created = tree.expand(current);
        if created > 0 {
            context.depth.record_branching(created);
            context.stats.expanded_nodes += 1;
        }
        if tree.node(current).is_leaf() {
            // non-terminal state without legal actions
            break evaluate_statically(context, tree, current);
        }

        tree.evaluate_children_statically(current, &context.weights);
        tree.sort_children(current, compare_nodes);
        let children = tree.children(current);
        current = children[children.len() / 2];

        quiet = true;
        plies += 1;
        context.stats.quiescence_probes += 1;
    };

    if plies > 0 {
        trace!("quiescence settled {} plies below the leaf", plies);
    }

    if !tree.node(id).is_evaluated() {
        let pass = context.pass;
        tree.node_mut(id).set_evaluation(value, pass);
    }
}

fn evaluate_statically<S: GameState>(
    context: &SearchContext,
    tree: &mut SearchTree<S>,
    id: NodeId,
) -> Evaluation {
    let value = tree.node_mut(id).static_evaluation(&context.weights);
    tree.node_mut(id).set_evaluation(value, context.pass);
    value
}
