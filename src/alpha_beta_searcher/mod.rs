//! Rule-agnostic alpha-beta search over a persistent game tree.
//!
//! The module is generic over [`GameState`] and knows nothing about any
//! concrete game. The tree survives between calls and is re-rooted at the
//! actual state each time; labeling passes deepen it under a soft
//! wall-clock budget.

mod budget;
mod chance;
mod depth;
mod node;
pub mod ordering;
mod quiescence;
mod search;
mod traits;
mod tree;


pub use budget::TimeBudget;
pub use depth::{DepthCoefficients, DepthController};
pub use node::{Evaluation, NodeId, SearchNode};
pub use quiescence::appears_quiet;
pub use search::{label_alpha_beta, label_minimax, SearchContext, SearchError, SearchStats, Window};
pub use traits::{EvaluationWeights, GameState, Mover};
pub use tree::SearchTree;
