use tracing::debug;

use crate::solver::{
    csp::{Assignment, Csp},
    engine::{ConstraintId, SearchStats, VariableId},
    state::SearchState,
    value::ValueOrdering,
    work_list::WorkList,
};

/// A domain that became empty during propagation, with the constraint
/// blamed for the final removal.
#[derive(Debug, Clone, Copy)]
pub struct Wipeout {
    pub variable: VariableId,
    pub constraint: ConstraintId,
}

/// Outcome of one propagation call. The caller owns the trail mark and is
/// responsible for rewinding it on wipeout or backtrack.
#[derive(Debug, Clone, Copy)]
pub enum PropagationOutcome {
    Consistent,
    Wipeout(Wipeout),
    DeadlineExpired,
}

/// Finds the first constraint of `var` that is fully bound under
/// `assignment` and violated. Each evaluation counts as a constraint check.
pub(crate) fn first_violated_constraint<V: ValueOrdering>(
    csp: &Csp<V>,
    var: VariableId,
    assignment: &Assignment<V>,
    stats: &mut SearchStats,
) -> Option<ConstraintId> {
    for &cid in csp.constraints_of(var) {
        let constraint = csp.constraint(cid);
        if constraint.scope().iter().all(|&v| assignment.is_bound(v)) {
            stats.constraint_checks += 1;
            if !constraint.is_satisfied(assignment) {
                return Some(cid);
            }
        }
    }
    None
}

/// Forward checking after the most recent binding of `var`.
///
/// Each unassigned neighbor loses every value whose hypothetical binding
/// violates a now-fully-bound constraint. Removals are trailed and blamed:
/// the assigned scope of the removing constraint lands in the neighbor's
/// conflict set, which is what backjumping consumes later.
pub(crate) fn forward_checking<V: ValueOrdering>(
    csp: &Csp<V>,
    var: VariableId,
    state: &mut SearchState<V>,
    stats: &mut SearchStats,
) -> PropagationOutcome {
    for &neighbor in csp.neighbors(var) {
        if state.assignment.is_bound(neighbor) {
            continue;
        }
        if state.deadline_expired() {
            return PropagationOutcome::DeadlineExpired;
        }

        let mut last_culprit = None;
        let candidates: Vec<V> = state.domain(neighbor).iter().cloned().collect();
        for value in candidates {
            state.assignment.bind(neighbor, value.clone());
            let violation = first_violated_constraint(csp, neighbor, &state.assignment, stats);
            state.assignment.unbind(neighbor);

            if let Some(cid) = violation {
                state.remove(neighbor, &value);
                stats.propagations += 1;
                stats.record_pruning(cid);
                for &scope_var in csp.constraint(cid).scope() {
                    state.blame(neighbor, scope_var);
                }
                last_culprit = Some(cid);
            }
        }

        if state.domain(neighbor).is_empty() {
            if let Some(constraint) = last_culprit {
                debug!(neighbor, constraint, "forward checking wiped out a domain");
                return PropagationOutcome::Wipeout(Wipeout {
                    variable: neighbor,
                    constraint,
                });
            }
        }
    }
    PropagationOutcome::Consistent
}

/// Makes `xi` arc-consistent with `xj`: drops every value of `xi` with no
/// support in `xj`'s current domain under the binary constraints linking
/// the pair. Returns the blamed constraint if anything was removed.
pub(crate) fn revise<V: ValueOrdering>(
    csp: &Csp<V>,
    xi: VariableId,
    xj: VariableId,
    state: &mut SearchState<V>,
    stats: &mut SearchStats,
) -> Option<ConstraintId> {
    let between: Vec<ConstraintId> = csp
        .constraints_of(xi)
        .iter()
        .copied()
        .filter(|&cid| {
            let constraint = csp.constraint(cid);
            constraint.is_binary() && constraint.scope().contains(&xj)
        })
        .collect();
    if between.is_empty() {
        return None;
    }
    for &cid in &between {
        stats.record_revision(cid);
    }

    let mut doomed = Vec::new();
    for a in state.domain(xi).iter() {
        let supported = state.domain(xj).iter().any(|b| {
            between.iter().all(|&cid| {
                stats.constraint_checks += 1;
                csp.constraint(cid).check_pair(xi, a, xj, b)
            })
        });
        if !supported {
            doomed.push(a.clone());
        }
    }
    if doomed.is_empty() {
        return None;
    }

    let blame = between[0];
    for value in doomed {
        if state.remove(xi, &value) {
            stats.propagations += 1;
            stats.record_pruning(blame);
        }
    }
    // Support was lost through xj: either xj's binding is to blame, or
    // whatever pruned xj's domain before this arc was processed.
    if state.assignment.is_bound(xj) {
        state.blame(xi, xj);
    } else {
        let inherited = state.conflict_sets[xj as usize].clone();
        state.absorb_conflicts(xi, &inherited);
    }
    Some(blame)
}

/// AC-3 over the given initial arcs.
///
/// Arcs are processed FIFO; a successful revision of `xi` re-enqueues
/// `(xk, xi)` for every unassigned neighbor `xk` other than the arc's
/// source. The deadline is polled once per arc.
pub(crate) fn ac3<V: ValueOrdering>(
    csp: &Csp<V>,
    initial_arcs: impl IntoIterator<Item = (VariableId, VariableId)>,
    state: &mut SearchState<V>,
    stats: &mut SearchStats,
) -> PropagationOutcome {
    let mut worklist = WorkList::new();
    for (xi, xj) in initial_arcs {
        worklist.push_back(xi, xj);
    }

    while let Some((xi, xj)) = worklist.pop_front() {
        if state.deadline_expired() {
            return PropagationOutcome::DeadlineExpired;
        }
        if let Some(blame) = revise(csp, xi, xj, state, stats) {
            if state.domain(xi).is_empty() {
                debug!(xi, xj, "arc revision wiped out a domain");
                return PropagationOutcome::Wipeout(Wipeout {
                    variable: xi,
                    constraint: blame,
                });
            }
            for &xk in csp.neighbors(xi) {
                if xk != xj && !state.assignment.is_bound(xk) {
                    worklist.push_back(xk, xi);
                }
            }
        }
    }
    PropagationOutcome::Consistent
}

/// Every directed arc of the constraint graph, for the root AC-3 pass.
pub(crate) fn all_arcs<V: ValueOrdering>(csp: &Csp<V>) -> Vec<(VariableId, VariableId)> {
    let mut arcs = Vec::new();
    for var in csp.variables() {
        for &neighbor in csp.neighbors(var) {
            arcs.push((var, neighbor));
        }
    }
    arcs
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::constraint::{all_different, Constraint};
    use crate::solver::state::SearchState;

    fn fresh_state<V: ValueOrdering>(csp: &Csp<V>) -> SearchState<V> {
        SearchState::new(csp, vec![1; csp.constraints().len()], None)
    }

    #[test]
    fn forward_checking_prunes_neighbor_domains() {
        let mut csp = Csp::new();
        let a = csp.add_variable([1, 2]).unwrap();
        let b = csp.add_variable([1, 2]).unwrap();
        csp.add_constraint(Constraint::not_equal(a, b)).unwrap();

        let mut state = fresh_state(&csp);
        let mut stats = SearchStats::default();

        state.assignment.bind(a, 1);
        state.reduce_to_singleton(a, &1);
        let outcome = forward_checking(&csp, a, &mut state, &mut stats);

        assert!(matches!(outcome, PropagationOutcome::Consistent));
        assert_eq!(state.domain(b).singleton_value(), Some(&2));
        assert_eq!(stats.propagations, 1);
        assert!(state.conflict_sets[b as usize].contains(&a));
    }

    #[test]
    fn forward_checking_reports_wipeout_and_is_undoable() {
        let mut csp = Csp::new();
        let a = csp.add_variable([1]).unwrap();
        let b = csp.add_variable([1]).unwrap();
        let cid = csp.add_constraint(Constraint::not_equal(a, b)).unwrap();

        let mut state = fresh_state(&csp);
        let mut stats = SearchStats::default();

        state.assignment.bind(a, 1);
        let mark = state.mark();
        let outcome = forward_checking(&csp, a, &mut state, &mut stats);

        match outcome {
            PropagationOutcome::Wipeout(wipeout) => {
                assert_eq!(wipeout.variable, b);
                assert_eq!(wipeout.constraint, cid);
            }
            other => panic!("expected wipeout, got {other:?}"),
        }
        assert!(state.domain(b).is_empty());

        state.undo_to(mark);
        assert_eq!(state.domain(b).len(), 1);
    }

    #[test]
    fn ac3_reaches_a_fixpoint_with_support_everywhere() {
        // A 3-cycle of disequalities over 3 values is arc-consistent as-is;
        // pinning one variable cascades removals through the cycle.
        let mut csp = Csp::new();
        let vars: Vec<VariableId> = (0..3)
            .map(|_| csp.add_variable([0i64, 1, 2]).unwrap())
            .collect();
        csp.add_constraints(all_different(&vars)).unwrap();

        let mut state = fresh_state(&csp);
        let mut stats = SearchStats::default();
        let outcome = ac3(&csp, all_arcs(&csp), &mut state, &mut stats);
        assert!(matches!(outcome, PropagationOutcome::Consistent));

        // fixpoint: every remaining value has support on every arc
        for xi in csp.variables() {
            for &xj in csp.neighbors(xi) {
                for a in state.domain(xi).iter() {
                    let supported = state.domain(xj).iter().any(|b| {
                        csp.constraints_of(xi).iter().all(|&cid| {
                            let c = csp.constraint(cid);
                            !c.scope().contains(&xj) || c.check_pair(xi, a, xj, b)
                        })
                    });
                    assert!(supported, "value {a:?} of ?{xi} lost support against ?{xj}");
                }
            }
        }
    }

    #[test]
    fn ac3_detects_unsatisfiable_pair() {
        let mut csp = Csp::new();
        let a = csp.add_variable([1]).unwrap();
        let b = csp.add_variable([1]).unwrap();
        csp.add_constraint(Constraint::not_equal(a, b)).unwrap();

        let mut state = fresh_state(&csp);
        let mut stats = SearchStats::default();
        let outcome = ac3(&csp, all_arcs(&csp), &mut state, &mut stats);
        assert!(matches!(outcome, PropagationOutcome::Wipeout(_)));
    }

    #[test]
    fn ac3_singleton_chain_propagates_transitively() {
        // ?a fixed to 1 forces ?b to 2, which in turn prunes ?c.
        let mut csp = Csp::new();
        let a = csp.add_variable([1]).unwrap();
        let b = csp.add_variable([1, 2]).unwrap();
        let c = csp.add_variable([2, 3]).unwrap();
        csp.add_constraint(Constraint::not_equal(a, b)).unwrap();
        csp.add_constraint(Constraint::not_equal(b, c)).unwrap();

        let mut state = fresh_state(&csp);
        let mut stats = SearchStats::default();
        let outcome = ac3(&csp, all_arcs(&csp), &mut state, &mut stats);

        assert!(matches!(outcome, PropagationOutcome::Consistent));
        assert_eq!(state.domain(b).singleton_value(), Some(&2));
        assert_eq!(state.domain(c).singleton_value(), Some(&3));
    }
}
