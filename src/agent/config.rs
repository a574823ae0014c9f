use crate::alpha_beta_searcher::DepthCoefficients;

/// Agent configuration
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Upper bound for the iterative-deepening depth, in plies below the root.
    pub max_depth: u32,
    /// Share of the budget the search may spend before it stops expanding.
    pub time_safety_ratio: f64,
    /// Pops between two deadline checks inside a labeling pass.
    pub check_interval: u32,
    /// Extra plies quiescence may probe below a leaf.
    pub max_quiescence_plies: u32,
    /// Seed for chance-node sampling; entropy-seeded when `None`.
    pub seed: Option<u64>,
    pub depth: DepthCoefficients,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            time_safety_ratio: 0.9,
            check_interval: 31,
            max_quiescence_plies: 32,
            seed: None,
            depth: DepthCoefficients::default(),
        }
    }
}
