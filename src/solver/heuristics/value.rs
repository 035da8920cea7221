use crate::solver::{
    csp::Csp, engine::VariableId, state::SearchState, value::ValueOrdering,
};

/// A trait for strategies that determine the order in which a variable's
/// candidate values are tried.
pub trait ValueOrderingHeuristic<V: ValueOrdering> {
    /// Returns `var`'s current-domain values in the order to try them.
    fn order_values(&self, var: VariableId, csp: &Csp<V>, state: &SearchState<V>) -> Vec<V>;
}

/// Returns values in the domain's own (ascending) order. Deterministic by
/// construction, since domains iterate in value order.
pub struct IdentityValueHeuristic;

impl<V: ValueOrdering> ValueOrderingHeuristic<V> for IdentityValueHeuristic {
    fn order_values(&self, var: VariableId, _csp: &Csp<V>, state: &SearchState<V>) -> Vec<V> {
        state.domain(var).iter().cloned().collect()
    }
}

/// Least Constraining Value: try first the value that rules out the fewest
/// choices in unassigned neighbors' current domains.
///
/// The lookahead is one step deep and binary: a neighbor value `b` counts
/// as ruled out by `var = v` iff some binary constraint between the pair
/// rejects `(v, b)`. The sort is stable, so equally constraining values
/// keep their domain order.
pub struct LeastConstrainingValueHeuristic;

impl LeastConstrainingValueHeuristic {
    fn eliminated_count<V: ValueOrdering>(
        csp: &Csp<V>,
        state: &SearchState<V>,
        var: VariableId,
        value: &V,
    ) -> u64 {
        let mut eliminated = 0;
        for &neighbor in csp.neighbors(var) {
            if state.assignment.is_bound(neighbor) {
                continue;
            }
            for candidate in state.domain(neighbor).iter() {
                let ruled_out = csp.constraints_of(neighbor).iter().any(|&cid| {
                    let constraint = csp.constraint(cid);
                    constraint.is_binary()
                        && constraint.scope().contains(&var)
                        && !constraint.check_pair(var, value, neighbor, candidate)
                });
                if ruled_out {
                    eliminated += 1;
                }
            }
        }
        eliminated
    }
}

impl<V: ValueOrdering> ValueOrderingHeuristic<V> for LeastConstrainingValueHeuristic {
    fn order_values(&self, var: VariableId, csp: &Csp<V>, state: &SearchState<V>) -> Vec<V> {
        let values: Vec<V> = state.domain(var).iter().cloned().collect();
        if values.len() <= 1 {
            return values;
        }
        let mut keyed: Vec<(u64, V)> = values
            .into_iter()
            .map(|value| {
                let count = Self::eliminated_count(csp, state, var, &value);
                (count, value)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, value)| value).collect()
    }
}
