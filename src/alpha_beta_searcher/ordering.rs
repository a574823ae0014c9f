//! Comparators shared by move ordering, quiescence and final selection.

use std::cmp::Ordering;

use super::node::{Evaluation, SearchNode};
use super::GameState;

const UNKNOWN: Evaluation = Evaluation {
    utility: f64::NEG_INFINITY,
    heuristic: f64::NEG_INFINITY,
};

/// Lexicographic (utility, heuristic) order.
#[inline]
pub fn compare_evaluations(a: &Evaluation, b: &Evaluation) -> Ordering {
    a.utility
        .total_cmp(&b.utility)
        .then_with(|| a.heuristic.total_cmp(&b.heuristic))
}

/// (utility, heuristic, state) order on whatever value the node currently
/// carries: backed-up when evaluated, static otherwise.
pub fn compare_nodes<S: GameState>(a: &SearchNode<S>, b: &SearchNode<S>) -> Ordering {
    let value_a = a.ordering_value().unwrap_or(UNKNOWN);
    let value_b = b.ordering_value().unwrap_or(UNKNOWN);
    compare_evaluations(&value_a, &value_b).then_with(|| a.state().cmp(b.state()))
}

/// Ranks nodes for the player choosing between them: evaluated nodes
/// always outrank unevaluated ones, then the value order applies,
/// reversed for a minimizing chooser. `Greater` means preferred.
pub fn rank_nodes<S: GameState>(a: &SearchNode<S>, b: &SearchNode<S>, maximizing: bool) -> Ordering {
    a.is_evaluated().cmp(&b.is_evaluated()).then_with(|| {
        let order = compare_nodes(a, b);
        if maximizing {
            order
        } else {
            order.reverse()
        }
    })
}

/// Move-ordering comparator: sorts the best candidate for the chooser
/// first.
pub fn best_first<S: GameState>(a: &SearchNode<S>, b: &SearchNode<S>, maximizing: bool) -> Ordering {
    let order = compare_nodes(a, b);
    if maximizing {
        order.reverse()
    } else {
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utility_dominates_heuristic() {
        let a = Evaluation::new(1.0, -5.0);
        let b = Evaluation::new(0.0, 5.0);
        assert_eq!(compare_evaluations(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_heuristic_breaks_utility_ties() {
        let a = Evaluation::new(0.0, 0.25);
        let b = Evaluation::new(0.0, 0.5);
        assert_eq!(compare_evaluations(&a, &b), Ordering::Less);
    }
}
