use crate::solver::{
    csp::Csp, engine::VariableId, state::SearchState, value::ValueOrdering,
};

/// A trait for strategies that select the next variable to branch on during
/// search. Implementations are read-only over the CSP and search state.
pub trait VariableSelectionHeuristic<V: ValueOrdering> {
    /// Selects an unassigned variable to branch on.
    ///
    /// # Returns
    ///
    /// * `Some(VariableId)` of an unassigned variable, if any exist.
    /// * `None` if every variable is already assigned.
    fn select_variable(&self, csp: &Csp<V>, state: &SearchState<V>) -> Option<VariableId>;
}

/// A simple heuristic that selects the first unassigned variable in CSP
/// order.
pub struct SelectFirstHeuristic;

impl<V: ValueOrdering> VariableSelectionHeuristic<V> for SelectFirstHeuristic {
    fn select_variable(&self, csp: &Csp<V>, state: &SearchState<V>) -> Option<VariableId> {
        csp.variables().find(|&var| !state.assignment.is_bound(var))
    }
}

/// Minimum Remaining Values with degree tie-breaking.
///
/// A "fail-first" strategy: branch on the variable with the fewest feasible
/// values left. Ties go to the variable with the most unassigned neighbors;
/// remaining ties to the earliest variable, which keeps selection
/// deterministic.
pub struct MinRemainingValuesHeuristic;

impl<V: ValueOrdering> VariableSelectionHeuristic<V> for MinRemainingValuesHeuristic {
    fn select_variable(&self, csp: &Csp<V>, state: &SearchState<V>) -> Option<VariableId> {
        let mut best: Option<(usize, usize, VariableId)> = None;
        for var in csp.variables() {
            if state.assignment.is_bound(var) {
                continue;
            }
            let remaining = state.domain(var).len();
            let degree = csp
                .neighbors(var)
                .iter()
                .filter(|&&n| !state.assignment.is_bound(n))
                .count();
            let better = match best {
                None => true,
                Some((best_remaining, best_degree, _)) => {
                    remaining < best_remaining
                        || (remaining == best_remaining && degree > best_degree)
                }
            };
            if better {
                best = Some((remaining, degree, var));
            }
        }
        best.map(|(_, _, var)| var)
    }
}

/// Domain size over weighted degree (dom/wdeg), an adaptive strategy.
///
/// A variable's weighted degree sums the weights of its constraints that
/// still have at least two unassigned variables in scope; the weights grow
/// every time a constraint causes a wipeout, steering selection toward the
/// contentious part of the problem. Ratios are compared by exact
/// cross-multiplication so ties resolve by CSP order, never by float noise.
/// A variable with zero weighted degree counts as infinitely unconstrained;
/// if every candidate is in that state, selection falls back to MRV.
pub struct DomWdegHeuristic;

impl DomWdegHeuristic {
    fn weighted_degree<V: ValueOrdering>(
        csp: &Csp<V>,
        state: &SearchState<V>,
        var: VariableId,
    ) -> u64 {
        csp.constraints_of(var)
            .iter()
            .filter(|&&cid| {
                csp.constraint(cid)
                    .scope()
                    .iter()
                    .filter(|&&v| !state.assignment.is_bound(v))
                    .count()
                    >= 2
            })
            .map(|&cid| state.weights[cid])
            .sum()
    }
}

impl<V: ValueOrdering> VariableSelectionHeuristic<V> for DomWdegHeuristic {
    fn select_variable(&self, csp: &Csp<V>, state: &SearchState<V>) -> Option<VariableId> {
        let mut best: Option<(u64, u64, VariableId)> = None;
        let mut any_weighted = false;
        for var in csp.variables() {
            if state.assignment.is_bound(var) {
                continue;
            }
            let remaining = state.domain(var).len() as u64;
            let wdeg = Self::weighted_degree(csp, state, var);
            if wdeg > 0 {
                any_weighted = true;
            }
            let better = match best {
                None => true,
                Some((best_remaining, best_wdeg, _)) => match (wdeg, best_wdeg) {
                    (0, _) => false,
                    (_, 0) => true,
                    _ => {
                        (remaining as u128) * (best_wdeg as u128)
                            < (best_remaining as u128) * (wdeg as u128)
                    }
                },
            };
            if better {
                best = Some((remaining, wdeg, var));
            }
        }
        if !any_weighted {
            return MinRemainingValuesHeuristic.select_variable(csp, state);
        }
        best.map(|(_, _, var)| var)
    }
}
