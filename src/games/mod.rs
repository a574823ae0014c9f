//! Concrete games implementing [`GameState`](crate::alpha_beta_searcher::GameState).

pub mod subtraction;

pub use subtraction::SubtractionGame;
