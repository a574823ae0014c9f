//! Common types re-exported for convenience.

pub use crate::agent::{Agent, AgentConfig};
pub use crate::alpha_beta_searcher::{
    Evaluation, EvaluationWeights, GameState, Mover, SearchError, SearchStats,
};
pub use crate::games::SubtractionGame;
