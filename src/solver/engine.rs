use std::collections::HashMap;
use std::time::Duration;

use crate::{
    error::Result,
    solver::{
        config::{Algorithm, SolverConfig, ValueOrder, VariableOrder},
        csp::Csp,
        heuristics::{
            value::{IdentityValueHeuristic, LeastConstrainingValueHeuristic, ValueOrderingHeuristic},
            variable::{
                DomWdegHeuristic, MinRemainingValuesHeuristic, SelectFirstHeuristic,
                VariableSelectionHeuristic,
            },
        },
        local::MinConflictsSearch,
        search::{BacktrackingSearch, SearchStrategy},
        value::ValueOrdering,
    },
};

/// A numeric identifier for a single variable in the constraint problem.
pub type VariableId = u32;
/// A numeric identifier for a single constraint in the constraint problem.
pub type ConstraintId = usize;

/// How a `solve` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveStatus {
    Solved,
    /// Proven by systematic search to have no solution.
    #[default]
    Unsolvable,
    /// The step or wall-clock budget ran out first; nothing is proven.
    BudgetExceeded,
}

/// Holds performance statistics for a single constraint.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerConstraintStats {
    /// The number of arc revisions that consulted this constraint.
    pub revisions: u64,
    /// The number of domain values this constraint removed.
    pub prunings: u64,
}

/// Holds statistics for the entire search process.
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    pub status: SolveStatus,
    /// Wall-clock time spent inside `solve`.
    pub runtime: Duration,
    /// Consistent value attempts that later failed (wipeout or subtree
    /// exhaustion).
    pub backtracks: u64,
    /// Successful variable bindings attempted.
    pub assignments: u64,
    /// Constraint satisfaction checks, including those made by propagation.
    pub constraint_checks: u64,
    /// Domain values removed by inference.
    pub propagations: u64,
    /// Repair iterations of min-conflicts (zero for backtracking).
    pub local_steps: u64,
    /// A map from [`ConstraintId`] to the performance statistics for that
    /// constraint.
    pub constraint_stats: HashMap<ConstraintId, PerConstraintStats>,
    /// Final per-constraint dom/wdeg weights; feed these back through
    /// `initial_weights` to warm-start a later run.
    pub constraint_weights: Vec<u64>,
}

impl SearchStats {
    /// Runtime in fractional seconds.
    pub fn runtime_seconds(&self) -> f64 {
        self.runtime.as_secs_f64()
    }

    pub(crate) fn record_revision(&mut self, id: ConstraintId) {
        self.constraint_stats.entry(id).or_default().revisions += 1;
    }

    pub(crate) fn record_pruning(&mut self, id: ConstraintId) {
        self.constraint_stats.entry(id).or_default().prunings += 1;
    }
}

/// The main engine for solving constraint satisfaction problems.
///
/// The `SolverEngine` orchestrates a single `solve` call by delegating to a
/// [`SearchStrategy`]. Most callers build one from a [`SolverConfig`] via
/// [`SolverEngine::from_config`]; handing over a hand-built strategy is the
/// lower-level escape hatch.
pub struct SolverEngine<V: ValueOrdering> {
    strategy: Box<dyn SearchStrategy<V>>,
}

impl<V: ValueOrdering> SolverEngine<V> {
    /// Creates a new `SolverEngine` with the specified search strategy.
    pub fn new(strategy: Box<dyn SearchStrategy<V>>) -> Self {
        Self { strategy }
    }

    /// Builds the strategy described by `config`, validating it first.
    pub fn from_config(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        let strategy: Box<dyn SearchStrategy<V>> = match config.algorithm {
            Algorithm::MinConflicts => Box::new(
                MinConflictsSearch::new(config.max_steps, config.seed)
                    .with_time_limit(config.time_limit),
            ),
            Algorithm::Backtracking => {
                let variable_heuristic: Box<dyn VariableSelectionHeuristic<V>> =
                    match config.variable_order {
                        VariableOrder::Default => Box::new(SelectFirstHeuristic),
                        VariableOrder::Mrv => Box::new(MinRemainingValuesHeuristic),
                        VariableOrder::DomWdeg => Box::new(DomWdegHeuristic),
                    };
                let value_heuristic: Box<dyn ValueOrderingHeuristic<V>> = match config.value_order
                {
                    ValueOrder::Default => Box::new(IdentityValueHeuristic),
                    ValueOrder::Lcv => Box::new(LeastConstrainingValueHeuristic),
                };
                Box::new(
                    BacktrackingSearch::new(variable_heuristic, value_heuristic)
                        .with_inference(config.inference)
                        .with_cbj(config.use_cbj)
                        .with_adaptive_weights(config.variable_order == VariableOrder::DomWdeg)
                        .with_time_limit(config.time_limit)
                        .with_initial_weights(config.initial_weights),
                )
            }
        };
        Ok(Self { strategy })
    }

    /// Attempts to solve the given constraint satisfaction problem.
    ///
    /// # Returns
    ///
    /// * `Ok((Some(assignment), stats))` with a total assignment indexed by
    ///   [`VariableId`]. It satisfies every constraint when `stats.status`
    ///   is [`SolveStatus::Solved`]; a min-conflicts run that exhausts its
    ///   budget instead reports [`SolveStatus::BudgetExceeded`] and returns
    ///   the least-conflicted assignment it saw.
    /// * `Ok((None, stats))` otherwise; `stats.status` distinguishes a
    ///   proven [`SolveStatus::Unsolvable`] from
    ///   [`SolveStatus::BudgetExceeded`].
    /// * `Err(error)` for malformed configuration discovered at solve time.
    pub fn solve(&self, csp: &Csp<V>) -> Result<(Option<Vec<V>>, SearchStats)> {
        self.strategy.solve(csp)
    }
}
