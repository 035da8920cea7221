use std::time::Duration;

use tracing::debug;

use crate::{
    error::{Result, SolverError},
    solver::{
        config::Inference,
        csp::Csp,
        engine::{SearchStats, SolveStatus, VariableId},
        heuristics::{value::ValueOrderingHeuristic, variable::VariableSelectionHeuristic},
        propagation::{ac3, all_arcs, first_violated_constraint, forward_checking, PropagationOutcome},
        state::{ConflictSet, SearchState},
        value::ValueOrdering,
    },
};

/// A complete solving algorithm: takes a CSP, returns a total assignment or
/// a verdict, plus statistics.
pub trait SearchStrategy<V: ValueOrdering> {
    fn solve(&self, csp: &Csp<V>) -> Result<(Option<Vec<V>>, SearchStats)>;
}

/// Result of one recursion frame.
enum SearchOutcome<V> {
    Solution(Vec<V>),
    /// All candidates failed; the parent tries its next value.
    Exhausted,
    /// All candidates failed and blame points at `target`; frames above the
    /// target unwind without trying alternatives. A `None` target means no
    /// assigned variable is blamed, i.e. the problem is unsolvable.
    Backjump {
        target: Option<VariableId>,
        conflicts: ConflictSet,
    },
    DeadlineExpired,
}

/// Depth-first search with pluggable inference and heuristics, and optional
/// conflict-directed backjumping.
pub struct BacktrackingSearch<V: ValueOrdering> {
    variable_heuristic: Box<dyn VariableSelectionHeuristic<V>>,
    value_heuristic: Box<dyn ValueOrderingHeuristic<V>>,
    inference: Inference,
    use_cbj: bool,
    adaptive_weights: bool,
    time_limit: Option<Duration>,
    initial_weights: Option<Vec<u64>>,
}

impl<V: ValueOrdering> BacktrackingSearch<V> {
    pub fn new(
        variable_heuristic: Box<dyn VariableSelectionHeuristic<V>>,
        value_heuristic: Box<dyn ValueOrderingHeuristic<V>>,
    ) -> Self {
        Self {
            variable_heuristic,
            value_heuristic,
            inference: Inference::None,
            use_cbj: false,
            adaptive_weights: false,
            time_limit: None,
            initial_weights: None,
        }
    }

    pub fn with_inference(mut self, inference: Inference) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_cbj(mut self, use_cbj: bool) -> Self {
        self.use_cbj = use_cbj;
        self
    }

    /// Lets wipeouts increment the blamed constraint's weight. Only the
    /// dom/wdeg variable heuristic reads the weights, so this is switched
    /// on exactly when that heuristic drives the search.
    pub fn with_adaptive_weights(mut self, adaptive_weights: bool) -> Self {
        self.adaptive_weights = adaptive_weights;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Seeds the per-solve constraint weights, e.g. to warm-start dom/wdeg
    /// from a previous run on the same problem.
    pub fn with_initial_weights(mut self, weights: Option<Vec<u64>>) -> Self {
        self.initial_weights = weights;
        self
    }

    fn starting_weights(&self, csp: &Csp<V>) -> Result<Vec<u64>> {
        match &self.initial_weights {
            Some(weights) => {
                if weights.len() != csp.constraints().len() {
                    return Err(SolverError::InvalidConfig(format!(
                        "initial_weights has {} entries for {} constraints",
                        weights.len(),
                        csp.constraints().len()
                    ))
                    .into());
                }
                Ok(weights.clone())
            }
            None => Ok(vec![1; csp.constraints().len()]),
        }
    }

    fn search(
        &self,
        csp: &Csp<V>,
        state: &mut SearchState<V>,
        stats: &mut SearchStats,
    ) -> SearchOutcome<V> {
        if state.deadline_expired() {
            return SearchOutcome::DeadlineExpired;
        }
        if let Some(total) = state.assignment.to_total() {
            return SearchOutcome::Solution(total);
        }
        let Some(var) = self.variable_heuristic.select_variable(csp, state) else {
            return SearchOutcome::Exhausted;
        };

        // Conflict sets are never cleared mid-search: prunings made by
        // still-active ancestor frames must stay blamed.
        let candidates = self.value_heuristic.order_values(var, csp, state);
        for value in candidates {
            if state.deadline_expired() {
                return SearchOutcome::DeadlineExpired;
            }

            state.assignment.bind(var, value.clone());
            if let Some(violated) =
                first_violated_constraint(csp, var, &state.assignment, stats)
            {
                state.assignment.unbind(var);
                for &scope_var in csp.constraint(violated).scope() {
                    state.blame(var, scope_var);
                }
                continue;
            }
            stats.assignments += 1;

            let mark = state.mark();
            state.reduce_to_singleton(var, &value);

            let propagation = match self.inference {
                Inference::None => PropagationOutcome::Consistent,
                Inference::ForwardChecking => forward_checking(csp, var, state, stats),
                Inference::Mac => {
                    let arcs: Vec<_> = csp
                        .neighbors(var)
                        .iter()
                        .filter(|&&n| !state.assignment.is_bound(n))
                        .map(|&n| (n, var))
                        .collect();
                    ac3(csp, arcs, state, stats)
                }
            };

            match propagation {
                PropagationOutcome::DeadlineExpired => {
                    state.undo_to(mark);
                    state.assignment.unbind(var);
                    return SearchOutcome::DeadlineExpired;
                }
                PropagationOutcome::Wipeout(wipeout) => {
                    if self.adaptive_weights {
                        state.weights[wipeout.constraint] += 1;
                    }
                    let inherited = state.conflict_sets[wipeout.variable as usize].clone();
                    state.absorb_conflicts(var, &inherited);
                    for &scope_var in csp.constraint(wipeout.constraint).scope() {
                        state.blame(var, scope_var);
                    }
                    stats.backtracks += 1;
                    state.undo_to(mark);
                    state.assignment.unbind(var);
                }
                PropagationOutcome::Consistent => match self.search(csp, state, stats) {
                    SearchOutcome::Solution(solution) => return SearchOutcome::Solution(solution),
                    SearchOutcome::DeadlineExpired => {
                        state.undo_to(mark);
                        state.assignment.unbind(var);
                        return SearchOutcome::DeadlineExpired;
                    }
                    SearchOutcome::Exhausted => {
                        stats.backtracks += 1;
                        state.undo_to(mark);
                        state.assignment.unbind(var);
                    }
                    SearchOutcome::Backjump { target, conflicts } => {
                        stats.backtracks += 1;
                        state.undo_to(mark);
                        state.assignment.unbind(var);
                        state.absorb_conflicts(var, &conflicts);
                        if target != Some(var) {
                            // this frame is being jumped over; pass the
                            // accumulated blame along
                            return SearchOutcome::Backjump {
                                target,
                                conflicts: state.conflict_sets[var as usize].clone(),
                            };
                        }
                        // the jump lands here: resume with remaining values
                    }
                },
            }
        }

        if self.use_cbj {
            let conflicts = state.conflict_sets[var as usize].clone();
            let target = conflicts
                .iter()
                .filter(|&&culprit| state.assignment.is_bound(culprit))
                .max_by_key(|&&culprit| state.assignment.depth_of(culprit).unwrap_or(0))
                .copied();
            debug!(var, ?target, "candidates exhausted, backjumping");
            SearchOutcome::Backjump { target, conflicts }
        } else {
            SearchOutcome::Exhausted
        }
    }
}

impl<V: ValueOrdering> SearchStrategy<V> for BacktrackingSearch<V> {
    fn solve(&self, csp: &Csp<V>) -> Result<(Option<Vec<V>>, SearchStats)> {
        let mut stats = SearchStats::default();
        let weights = self.starting_weights(csp)?;
        let mut state = SearchState::new(csp, weights, self.time_limit);

        // MAC establishes arc consistency once at the root; a wipeout here
        // means the problem has no solution at all.
        if self.inference == Inference::Mac {
            match ac3(csp, all_arcs(csp), &mut state, &mut stats) {
                PropagationOutcome::Consistent => {}
                PropagationOutcome::Wipeout(wipeout) => {
                    debug!(variable = wipeout.variable, "root propagation wiped out a domain");
                    if self.adaptive_weights {
                        state.weights[wipeout.constraint] += 1;
                    }
                    stats.status = SolveStatus::Unsolvable;
                    stats.runtime = state.elapsed();
                    stats.constraint_weights = state.weights.clone();
                    return Ok((None, stats));
                }
                PropagationOutcome::DeadlineExpired => {
                    stats.status = SolveStatus::BudgetExceeded;
                    stats.runtime = state.elapsed();
                    stats.constraint_weights = state.weights.clone();
                    return Ok((None, stats));
                }
            }
        }

        let outcome = self.search(csp, &mut state, &mut stats);
        stats.runtime = state.elapsed();
        stats.constraint_weights = state.weights.clone();
        let solution = match outcome {
            SearchOutcome::Solution(solution) => {
                stats.status = SolveStatus::Solved;
                Some(solution)
            }
            SearchOutcome::Exhausted | SearchOutcome::Backjump { .. } => {
                stats.status = SolveStatus::Unsolvable;
                None
            }
            SearchOutcome::DeadlineExpired => {
                stats.status = SolveStatus::BudgetExceeded;
                None
            }
        };
        debug!(status = ?stats.status, backtracks = stats.backtracks, "search finished");
        Ok((solution, stats))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::{
        constraint::{all_different, Constraint},
        heuristics::{
            value::{IdentityValueHeuristic, LeastConstrainingValueHeuristic},
            variable::{DomWdegHeuristic, MinRemainingValuesHeuristic, SelectFirstHeuristic},
        },
    };

    fn basic_search<V: ValueOrdering>() -> BacktrackingSearch<V> {
        BacktrackingSearch::new(
            Box::new(SelectFirstHeuristic),
            Box::new(IdentityValueHeuristic),
        )
    }

    fn dom_wdeg_search<V: ValueOrdering>() -> BacktrackingSearch<V> {
        BacktrackingSearch::new(
            Box::new(DomWdegHeuristic),
            Box::new(IdentityValueHeuristic),
        )
        .with_adaptive_weights(true)
    }

    #[test]
    fn trivial_sat_two_variables() {
        let mut csp = Csp::new();
        let a = csp.add_variable([1, 2]).unwrap();
        let b = csp.add_variable([1, 2]).unwrap();
        csp.add_constraint(Constraint::not_equal(a, b)).unwrap();

        let (solution, stats) = basic_search().solve(&csp).unwrap();
        let solution = solution.unwrap();
        assert_ne!(solution[a as usize], solution[b as usize]);
        assert_eq!(stats.status, SolveStatus::Solved);
        assert_eq!(stats.backtracks, 0);
        assert!(stats.constraint_checks <= 3);
    }

    #[test]
    fn trivial_unsat_three_variables_two_values() {
        let mut csp = Csp::new();
        let vars: Vec<_> = (0..3).map(|_| csp.add_variable([0i64, 1]).unwrap()).collect();
        csp.add_constraints(all_different(&vars)).unwrap();

        for use_cbj in [false, true] {
            let (solution, stats) = basic_search::<i64>()
                .with_cbj(use_cbj)
                .solve(&csp)
                .unwrap();
            assert_eq!(solution, None);
            assert_eq!(stats.status, SolveStatus::Unsolvable);
        }
    }

    #[test]
    fn all_inference_modes_agree_on_a_solvable_instance() {
        // a 4-cycle with one chord, colorable with 3 colors
        let edges = [(0u32, 1u32), (1, 2), (2, 3), (3, 0), (0, 2)];
        let mut csp = Csp::new();
        for _ in 0..4 {
            csp.add_variable([0i64, 1, 2]).unwrap();
        }
        for (u, v) in edges {
            csp.add_constraint(Constraint::not_equal(u, v)).unwrap();
        }

        for inference in [Inference::None, Inference::ForwardChecking, Inference::Mac] {
            let (solution, stats) = BacktrackingSearch::new(
                Box::new(MinRemainingValuesHeuristic),
                Box::new(LeastConstrainingValueHeuristic),
            )
            .with_inference(inference)
            .solve(&csp)
            .unwrap();
            let solution = solution.unwrap();
            for (u, v) in edges {
                assert_ne!(solution[u as usize], solution[v as usize]);
            }
            assert_eq!(stats.status, SolveStatus::Solved);
        }
    }

    #[test]
    fn mac_detects_unsolvable_at_the_root() {
        let mut csp = Csp::new();
        let a = csp.add_variable([1]).unwrap();
        let b = csp.add_variable([1]).unwrap();
        csp.add_constraint(Constraint::not_equal(a, b)).unwrap();

        let (solution, stats) = basic_search::<i64>()
            .with_inference(Inference::Mac)
            .solve(&csp)
            .unwrap();
        assert_eq!(solution, None);
        assert_eq!(stats.status, SolveStatus::Unsolvable);
        // the root wipeout happened before any assignment
        assert_eq!(stats.assignments, 0);
    }

    #[test]
    fn expired_deadline_reports_budget_exceeded() {
        let mut csp = Csp::new();
        let vars: Vec<_> = (0..8).map(|_| csp.add_variable(0i64..8).unwrap()).collect();
        csp.add_constraints(all_different(&vars)).unwrap();

        let (solution, stats) = basic_search::<i64>()
            .with_time_limit(Some(Duration::from_nanos(1)))
            .solve(&csp)
            .unwrap();
        assert_eq!(solution, None);
        assert_eq!(stats.status, SolveStatus::BudgetExceeded);
    }

    #[test]
    fn weights_grow_monotonically_under_dom_wdeg() {
        // K4 with 3 colors is unsolvable and guarantees wipeouts under FC
        let mut csp = Csp::new();
        let vars: Vec<_> = (0..4).map(|_| csp.add_variable([0i64, 1, 2]).unwrap()).collect();
        csp.add_constraints(all_different(&vars)).unwrap();

        let (solution, stats) = dom_wdeg_search::<i64>()
            .with_inference(Inference::ForwardChecking)
            .solve(&csp)
            .unwrap();
        assert_eq!(solution, None);
        assert!(stats.constraint_weights.iter().all(|&w| w >= 1));
        assert!(stats.constraint_weights.iter().any(|&w| w > 1));

        // warm-started weights stay monotone over the earlier run
        let warm = stats.constraint_weights.clone();
        let (_, warm_stats) = dom_wdeg_search::<i64>()
            .with_inference(Inference::ForwardChecking)
            .with_initial_weights(Some(warm.clone()))
            .solve(&csp)
            .unwrap();
        for (before, after) in warm.iter().zip(&warm_stats.constraint_weights) {
            assert!(after >= before);
        }
    }

    #[test]
    fn weights_stay_untouched_without_dom_wdeg() {
        let mut csp = Csp::new();
        let vars: Vec<_> = (0..4).map(|_| csp.add_variable([0i64, 1, 2]).unwrap()).collect();
        csp.add_constraints(all_different(&vars)).unwrap();

        // plenty of wipeouts happen, but only dom/wdeg may mutate weights
        let (solution, stats) = basic_search::<i64>()
            .with_inference(Inference::ForwardChecking)
            .solve(&csp)
            .unwrap();
        assert_eq!(solution, None);
        assert!(stats.backtracks > 0);
        assert!(stats.constraint_weights.iter().all(|&w| w == 1));
    }

    #[test]
    fn initial_weights_length_mismatch_is_rejected() {
        let mut csp = Csp::new();
        let a = csp.add_variable([1, 2]).unwrap();
        let b = csp.add_variable([1, 2]).unwrap();
        csp.add_constraint(Constraint::not_equal(a, b)).unwrap();

        let err = basic_search::<i64>()
            .with_initial_weights(Some(vec![1, 1, 1]))
            .solve(&csp)
            .unwrap_err();
        assert!(matches!(err.kind(), SolverError::InvalidConfig(_)));
    }

    #[test]
    fn cbj_matches_chronological_backtrack_counts_on_k4() {
        let mut csp = Csp::new();
        let vars: Vec<_> = (0..4).map(|_| csp.add_variable([0i64, 1, 2]).unwrap()).collect();
        csp.add_constraints(all_different(&vars)).unwrap();

        let (chrono_solution, chrono_stats) = basic_search::<i64>().solve(&csp).unwrap();
        let (cbj_solution, cbj_stats) = basic_search::<i64>().with_cbj(true).solve(&csp).unwrap();

        assert_eq!(chrono_solution, None);
        assert_eq!(cbj_solution, None);
        assert!(cbj_stats.backtracks <= chrono_stats.backtracks);
    }

    #[test]
    fn statistics_are_deterministic_across_runs() {
        let mut csp = Csp::new();
        let vars: Vec<_> = (0..6).map(|_| csp.add_variable(0i64..4).unwrap()).collect();
        for window in vars.windows(2) {
            csp.add_constraint(Constraint::not_equal(window[0], window[1]))
                .unwrap();
        }
        csp.add_constraint(Constraint::not_equal(vars[0], vars[5]))
            .unwrap();

        let run = || {
            let (solution, stats) = BacktrackingSearch::new(
                Box::new(MinRemainingValuesHeuristic),
                Box::new(LeastConstrainingValueHeuristic),
            )
            .with_inference(Inference::ForwardChecking)
            .solve(&csp)
            .unwrap();
            (
                solution,
                stats.backtracks,
                stats.assignments,
                stats.constraint_checks,
                stats.propagations,
            )
        };
        assert_eq!(run(), run());
    }

    mod prop_tests {
        use proptest::prelude::*;

        use super::*;

        /// Every total assignment, by odometer over the original domains.
        fn brute_force_solvable(csp: &Csp<i64>) -> bool {
            let domains: Vec<Vec<i64>> = csp
                .variables()
                .map(|v| csp.domain(v).iter().copied().collect())
                .collect();
            let mut counters = vec![0usize; domains.len()];
            loop {
                let mut assignment = crate::solver::csp::Assignment::new(domains.len());
                for (var, &idx) in counters.iter().enumerate() {
                    assignment.bind(var as VariableId, domains[var][idx]);
                }
                if csp
                    .constraints()
                    .iter()
                    .all(|c| c.is_satisfied(&assignment))
                {
                    return true;
                }
                let mut pos = 0;
                loop {
                    if pos == counters.len() {
                        return false;
                    }
                    counters[pos] += 1;
                    if counters[pos] < domains[pos].len() {
                        break;
                    }
                    counters[pos] = 0;
                    pos += 1;
                }
            }
        }

        fn small_csp_strategy() -> impl Strategy<Value = Csp<i64>> {
            (2..5usize, 1..4i64)
                .prop_flat_map(|(num_vars, domain_size)| {
                    let edges = proptest::collection::vec(
                        (0..num_vars as u32, 0..num_vars as u32)
                            .prop_filter("self loops are not edges", |(a, b)| a != b),
                        0..8,
                    );
                    (Just(num_vars), Just(domain_size), edges)
                })
                .prop_map(|(num_vars, domain_size, edges)| {
                    let mut csp = Csp::new();
                    for _ in 0..num_vars {
                        csp.add_variable(0..domain_size).unwrap();
                    }
                    for (a, b) in edges {
                        csp.add_constraint(Constraint::not_equal(a, b)).unwrap();
                    }
                    csp
                })
        }

        proptest! {
            /// Soundness and completeness against exhaustive enumeration,
            /// for every inference mode, with and without backjumping.
            #[test]
            fn verdict_matches_brute_force(csp in small_csp_strategy()) {
                let expected = brute_force_solvable(&csp);
                for inference in [Inference::None, Inference::ForwardChecking, Inference::Mac] {
                    for use_cbj in [false, true] {
                        let (solution, stats) = BacktrackingSearch::new(
                            Box::new(MinRemainingValuesHeuristic),
                            Box::new(LeastConstrainingValueHeuristic),
                        )
                        .with_inference(inference)
                        .with_cbj(use_cbj)
                        .solve(&csp)
                        .unwrap();

                        prop_assert_eq!(solution.is_some(), expected);
                        if let Some(solution) = solution {
                            let mut assignment =
                                crate::solver::csp::Assignment::new(csp.num_variables());
                            for (var, value) in solution.iter().enumerate() {
                                assignment.bind(var as VariableId, *value);
                            }
                            prop_assert!(csp
                                .constraints()
                                .iter()
                                .all(|c| c.is_satisfied(&assignment)));
                        } else {
                            prop_assert_eq!(stats.status, SolveStatus::Unsolvable);
                        }
                    }
                }
            }
        }
    }
}
