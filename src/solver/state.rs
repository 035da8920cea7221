use std::time::{Duration, Instant};

use im::HashSet;

use crate::solver::{
    csp::{Assignment, Csp},
    domain::Domain,
    engine::VariableId,
    value::ValueOrdering,
};

/// Previously assigned variables blamed for domain removals at a variable.
pub type ConflictSet = HashSet<VariableId>;

/// The mutable per-solve search state.
///
/// Owns the current domains together with their removal trail, the partial
/// assignment, per-variable conflict sets, and the per-solve constraint
/// weights. Domains shrink only through [`SearchState::remove`], so a frame
/// can always rewind to a trail mark and recover the exact domains it
/// started from.
pub struct SearchState<V: ValueOrdering> {
    pub assignment: Assignment<V>,
    pub conflict_sets: Vec<ConflictSet>,
    pub weights: Vec<u64>,
    domains: Vec<Domain<V>>,
    trail: Vec<(VariableId, V)>,
    deadline: Option<Instant>,
    started: Instant,
}

impl<V: ValueOrdering> SearchState<V> {
    pub fn new(csp: &Csp<V>, weights: Vec<u64>, time_limit: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            assignment: Assignment::new(csp.num_variables()),
            conflict_sets: vec![ConflictSet::new(); csp.num_variables()],
            weights,
            domains: csp.clone_domains(),
            trail: Vec::new(),
            deadline: time_limit.map(|limit| started + limit),
            started,
        }
    }

    /// The current domain of `var`.
    pub fn domain(&self, var: VariableId) -> &Domain<V> {
        &self.domains[var as usize]
    }

    /// The current trail position; pair with [`SearchState::undo_to`].
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Removes `value` from `var`'s current domain, recording the removal
    /// on the trail. Returns `false` if the value was already gone.
    pub fn remove(&mut self, var: VariableId, value: &V) -> bool {
        if self.domains[var as usize].remove(value) {
            self.trail.push((var, value.clone()));
            true
        } else {
            false
        }
    }

    /// Rewinds every removal made since `mark`, most recent first.
    pub fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let Some((var, value)) = self.trail.pop() else {
                break;
            };
            self.domains[var as usize].restore(value);
        }
    }

    /// Shrinks `var`'s current domain to exactly `value`, trailing the
    /// removals so they rewind with the rest of the frame.
    pub fn reduce_to_singleton(&mut self, var: VariableId, value: &V) {
        let doomed: Vec<V> = self.domains[var as usize]
            .iter()
            .filter(|v| *v != value)
            .cloned()
            .collect();
        for v in doomed {
            self.remove(var, &v);
        }
    }

    /// Adds `culprit` to `var`'s conflict set if it is currently assigned.
    pub fn blame(&mut self, var: VariableId, culprit: VariableId) {
        if culprit != var && self.assignment.is_bound(culprit) {
            self.conflict_sets[var as usize].insert(culprit);
        }
    }

    /// Merges another conflict set into `var`'s, dropping `var` itself.
    pub fn absorb_conflicts(&mut self, var: VariableId, conflicts: &ConflictSet) {
        for &culprit in conflicts.iter() {
            if culprit != var {
                self.conflict_sets[var as usize].insert(culprit);
            }
        }
    }

    pub fn deadline_expired(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
