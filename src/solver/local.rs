use std::time::{Duration, Instant};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::debug;

use crate::{
    error::Result,
    solver::{
        csp::{Assignment, Csp},
        engine::{SearchStats, SolveStatus, VariableId},
        search::SearchStrategy,
        value::ValueOrdering,
    },
};

/// Min-conflicts local search: start from a greedy complete assignment and
/// repeatedly repair a conflicted variable until nothing is violated or the
/// step budget runs out.
///
/// All tie-breaks are uniform draws from a seeded RNG, so a fixed seed
/// reproduces the run exactly. Local search cannot prove unsolvability;
/// exhausting the budget reports `BudgetExceeded` together with the best
/// (fewest conflicted variables) assignment seen along the way.
pub struct MinConflictsSearch {
    max_steps: u64,
    seed: u64,
    time_limit: Option<Duration>,
}

impl MinConflictsSearch {
    pub fn new(max_steps: u64, seed: u64) -> Self {
        Self {
            max_steps,
            seed,
            time_limit: None,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Counts the violated constraints of `var` under the (possibly
    /// partial) assignment. Constraints with unbound scope variables do not
    /// count.
    fn conflicts_of<V: ValueOrdering>(
        csp: &Csp<V>,
        var: VariableId,
        assignment: &Assignment<V>,
        stats: &mut SearchStats,
    ) -> u64 {
        let mut conflicts = 0;
        for &cid in csp.constraints_of(var) {
            let constraint = csp.constraint(cid);
            if constraint.scope().iter().all(|&v| assignment.is_bound(v)) {
                stats.constraint_checks += 1;
                if !constraint.is_satisfied(assignment) {
                    conflicts += 1;
                }
            }
        }
        conflicts
    }

    /// Variables participating in at least one violated constraint, in CSP
    /// order.
    fn conflicted_variables<V: ValueOrdering>(
        csp: &Csp<V>,
        assignment: &Assignment<V>,
        stats: &mut SearchStats,
    ) -> Vec<VariableId> {
        csp.variables()
            .filter(|&var| Self::conflicts_of(csp, var, assignment, stats) > 0)
            .collect()
    }

    /// The values of `var`'s original domain with the fewest conflicts,
    /// for a uniform tie-break by the caller.
    fn min_conflict_values<V: ValueOrdering>(
        csp: &Csp<V>,
        var: VariableId,
        assignment: &mut Assignment<V>,
        stats: &mut SearchStats,
        rebinding: bool,
    ) -> Vec<V> {
        let mut best = Vec::new();
        let mut best_conflicts = u64::MAX;
        let previous = assignment.get(var).cloned();
        for value in csp.domain(var).iter() {
            if rebinding {
                assignment.rebind(var, value.clone());
            } else {
                assignment.bind(var, value.clone());
            }
            let conflicts = Self::conflicts_of(csp, var, assignment, stats);
            if !rebinding {
                assignment.unbind(var);
            }
            if conflicts < best_conflicts {
                best_conflicts = conflicts;
                best.clear();
                best.push(value.clone());
            } else if conflicts == best_conflicts {
                best.push(value.clone());
            }
        }
        if rebinding {
            if let Some(previous) = previous {
                assignment.rebind(var, previous);
            }
        }
        best
    }
}

impl<V: ValueOrdering> SearchStrategy<V> for MinConflictsSearch {
    fn solve(&self, csp: &Csp<V>) -> Result<(Option<Vec<V>>, SearchStats)> {
        let mut stats = SearchStats::default();
        let started = Instant::now();
        let deadline = self.time_limit.map(|limit| started + limit);
        let mut rng = StdRng::seed_from_u64(self.seed);

        // Greedy construction: each variable in turn takes a value with the
        // fewest conflicts against the neighbors chosen so far.
        let mut assignment = Assignment::new(csp.num_variables());
        for var in csp.variables() {
            let best = Self::min_conflict_values(csp, var, &mut assignment, &mut stats, false);
            if let Some(choice) = best.choose(&mut rng) {
                assignment.bind(var, choice.clone());
            }
        }

        let mut best_assignment = assignment.to_total();
        let mut best_conflicted = usize::MAX;

        for _ in 0..self.max_steps {
            if deadline.map_or(false, |d| Instant::now() >= d) {
                break;
            }
            stats.local_steps += 1;

            let conflicted = Self::conflicted_variables(csp, &assignment, &mut stats);
            if conflicted.is_empty() {
                stats.status = SolveStatus::Solved;
                stats.runtime = started.elapsed();
                debug!(steps = stats.local_steps, "min-conflicts repaired every violation");
                return Ok((assignment.to_total(), stats));
            }
            if conflicted.len() < best_conflicted {
                best_conflicted = conflicted.len();
                best_assignment = assignment.to_total();
            }

            let Some(&var) = conflicted.choose(&mut rng) else {
                break;
            };
            let best = Self::min_conflict_values(csp, var, &mut assignment, &mut stats, true);
            if let Some(choice) = best.choose(&mut rng) {
                assignment.rebind(var, choice.clone());
            }
        }

        // Budget ran out: hand back the least-conflicted assignment seen,
        // with the status making clear it is not a solution.
        stats.status = SolveStatus::BudgetExceeded;
        stats.runtime = started.elapsed();
        debug!(steps = stats.local_steps, "min-conflicts ran out of budget");
        Ok((best_assignment, stats))
    }
}
