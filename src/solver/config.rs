use std::time::Duration;

use crate::error::{Result, SolverError};

/// The algorithm family. Systematic backtracking can prove unsolvability;
/// min-conflicts local search can only find solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Backtracking,
    MinConflicts,
}

/// Domain-reduction step run after each assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inference {
    /// No inference: plain backtracking over consistency checks.
    #[default]
    None,
    /// Prune the domains of the assigned variable's unassigned neighbors.
    ForwardChecking,
    /// Maintain full arc consistency (AC-3) after every assignment.
    Mac,
}

/// Variable selection heuristic for backtracking search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableOrder {
    /// First unassigned variable in CSP order.
    Default,
    /// Minimum remaining values, ties by unassigned degree.
    #[default]
    Mrv,
    /// Adaptive domain-over-weighted-degree.
    DomWdeg,
}

/// Value ordering heuristic for backtracking search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrder {
    /// The domain's own ascending order.
    Default,
    /// Least constraining value first.
    #[default]
    Lcv,
}

/// Everything that shapes a single `solve` call.
///
/// `inference`, the two orderings, `use_cbj`, and `initial_weights` apply
/// to backtracking; `max_steps` and `seed` apply to min-conflicts;
/// `time_limit` applies to every mode.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub algorithm: Algorithm,
    pub inference: Inference,
    pub variable_order: VariableOrder,
    pub value_order: ValueOrder,
    /// Conflict-directed backjumping instead of chronological backtracking.
    pub use_cbj: bool,
    /// Step budget for min-conflicts.
    pub max_steps: u64,
    /// Wall-clock budget; expiry yields `SolveStatus::BudgetExceeded`.
    pub time_limit: Option<Duration>,
    /// RNG seed for min-conflicts tie-breaking.
    pub seed: u64,
    /// Per-constraint starting weights for dom/wdeg, e.g. carried over from
    /// an earlier run on the same problem. Defaults to all ones.
    pub initial_weights: Option<Vec<u64>>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Backtracking,
            inference: Inference::None,
            variable_order: VariableOrder::Mrv,
            value_order: ValueOrder::Lcv,
            use_cbj: false,
            max_steps: 100_000,
            time_limit: None,
            seed: 0,
            initial_weights: None,
        }
    }
}

impl SolverConfig {
    /// Fail-fast validation, run once at engine construction.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(
                SolverError::InvalidConfig("max_steps must be positive".to_string()).into(),
            );
        }
        if self.time_limit.is_some_and(|limit| limit.is_zero()) {
            return Err(
                SolverError::InvalidConfig("time_limit must be positive".to_string()).into(),
            );
        }
        if let Some(weights) = &self.initial_weights {
            if weights.iter().any(|&w| w == 0) {
                return Err(SolverError::InvalidConfig(
                    "initial_weights must be positive".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}
