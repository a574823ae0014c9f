pub mod agent;
pub mod alpha_beta_searcher;
pub mod games;
pub mod prelude;

#[cfg(feature = "instrumentation")]
pub mod instrumentation;
