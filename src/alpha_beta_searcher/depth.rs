//! Iterative-deepening depth schedule.
//!
//! The next target depth grows with the remaining time and shrinks with
//! the observed branching factor, and never falls below the depth of the
//! previous round.

use std::time::Duration;

/// Tunable shape parameters of the depth schedule.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthCoefficients {
    pub branching_scale: f64,
    pub branching_decay: f64,
    pub time_scale: f64,
    pub time_log_scale: f64,
    pub excess_scale: f64,
    pub excess_log_scale: f64,
    pub simulation_scale: f64,
    pub simulation_log_scale: f64,
}

impl Default for DepthCoefficients {
    fn default() -> Self {
        Self {
            branching_scale: 11.5022,
            branching_decay: 0.0349878,
            time_scale: 0.364096,
            time_log_scale: 0.394822,
            excess_scale: 1.67433,
            excess_log_scale: 0.90856,
            simulation_scale: 21.0815,
            simulation_log_scale: 1.57606,
        }
    }
}

const INITIAL_AVERAGE_BRANCHING: f64 = 10.0;
const MIN_DEPTH: u32 = 2;

/// Logarithms of tiny budgets diverge; treat them as "no contribution".
#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[derive(Clone, Debug)]
pub struct DepthController {
    coefficients: DepthCoefficients,
    max_depth: u32,
    average_branching: f64,
    branching_samples: u64,
    last_depth: u32,
}

impl DepthController {
    pub fn new(max_depth: u32, coefficients: DepthCoefficients) -> Self {
        Self {
            coefficients,
            max_depth,
            average_branching: INITIAL_AVERAGE_BRANCHING,
            branching_samples: 0,
            last_depth: 1,
        }
    }

    /// Starts a new call; depth restarts from the bottom of the schedule.
    pub fn begin_call(&mut self) {
        self.last_depth = 1;
    }

    pub fn last_depth(&self) -> u32 {
        self.last_depth
    }

    pub fn average_branching(&self) -> f64 {
        self.average_branching
    }

    /// Folds one expansion's child count into the running mean.
    pub fn record_branching(&mut self, children: usize) {
        let total = self.average_branching * self.branching_samples as f64 + children as f64;
        self.branching_samples += 1;
        self.average_branching = total / self.branching_samples as f64;
    }

    pub fn branching_factor(&self) -> f64 {
        self.coefficients.branching_scale
            * (-self.coefficients.branching_decay * self.average_branching).exp()
    }

    pub fn time_factor(&self, remaining: Duration) -> f64 {
        finite_or_zero(
            self.coefficients.time_scale
                * (self.coefficients.time_log_scale * remaining.as_secs_f64()).ln(),
        )
    }

    pub fn excess_time_bonus(&self, excess_time: u64) -> f64 {
        finite_or_zero(
            self.coefficients.excess_scale
                * (self.coefficients.excess_log_scale * excess_time as f64).ln(),
        )
    }

    /// Multiplier for the first batch of chance samples at a node.
    pub fn simulation_time_factor(&self, remaining: Duration) -> f64 {
        finite_or_zero(
            self.coefficients.simulation_scale
                * (self.coefficients.simulation_log_scale * remaining.as_secs_f64()).ln(),
        )
    }

    /// Picks the depth of the next round and remembers it as the floor of
    /// the round after.
    pub fn next_depth(&mut self, remaining: Duration, excess_time: u64) -> u32 {
        let estimate = (self.branching_factor() * self.time_factor(remaining))
            .round()
            .max(MIN_DEPTH as f64);
        let bonus = self.excess_time_bonus(excess_time).round().max(0.0);
        let floor = self.last_depth as f64 + bonus;

        let depth = estimate.max(floor).min(self.max_depth as f64);
        self.last_depth = depth as u32;
        self.last_depth
    }
}
