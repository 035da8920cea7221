use crate::{
    error::{Result, SolverError},
    solver::{
        constraint::Constraint,
        domain::Domain,
        engine::{ConstraintId, VariableId},
        value::ValueOrdering,
    },
};

/// A finite-domain constraint satisfaction problem.
///
/// Variables are dense `VariableId`s in insertion order; problem builders
/// map their own structured identifiers (grid cells, graph vertices) onto
/// them. The container is read-only during search: the searcher keeps its
/// own current domains, and constraint weights live in the per-solve state.
#[derive(Debug, Clone)]
pub struct Csp<V: ValueOrdering> {
    domains: Vec<Domain<V>>,
    constraints: Vec<Constraint<V>>,
    neighbors: Vec<Vec<VariableId>>,
    constraints_of: Vec<Vec<ConstraintId>>,
}

impl<V: ValueOrdering> Csp<V> {
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
            constraints: Vec::new(),
            neighbors: Vec::new(),
            constraints_of: Vec::new(),
        }
    }

    /// Adds a variable with its original domain and returns its id.
    ///
    /// Fails fast on an empty domain; a variable that can never be assigned
    /// makes the whole problem malformed rather than merely unsolvable.
    pub fn add_variable(&mut self, domain: impl IntoIterator<Item = V>) -> Result<VariableId> {
        let id = self.domains.len() as VariableId;
        let domain = Domain::new(domain);
        if domain.is_empty() {
            return Err(SolverError::EmptyDomain(id).into());
        }
        self.domains.push(domain);
        self.neighbors.push(Vec::new());
        self.constraints_of.push(Vec::new());
        Ok(id)
    }

    /// Adds a constraint, updating the neighbor and incidence indexes.
    ///
    /// Fails fast if the scope is empty or references an unknown variable.
    pub fn add_constraint(&mut self, constraint: Constraint<V>) -> Result<ConstraintId> {
        if constraint.scope().is_empty() {
            return Err(SolverError::EmptyScope.into());
        }
        for &var in constraint.scope() {
            if var as usize >= self.domains.len() {
                return Err(SolverError::UnknownVariable(var).into());
            }
        }

        let id = self.constraints.len();
        for &var in constraint.scope() {
            self.constraints_of[var as usize].push(id);
            for &other in constraint.scope() {
                if other != var {
                    let bucket = &mut self.neighbors[var as usize];
                    if let Err(pos) = bucket.binary_search(&other) {
                        bucket.insert(pos, other);
                    }
                }
            }
        }
        self.constraints.push(constraint);
        Ok(id)
    }

    /// Adds a batch of constraints, e.g. an `all_different` expansion.
    pub fn add_constraints(
        &mut self,
        constraints: impl IntoIterator<Item = Constraint<V>>,
    ) -> Result<()> {
        for constraint in constraints {
            self.add_constraint(constraint)?;
        }
        Ok(())
    }

    pub fn num_variables(&self) -> usize {
        self.domains.len()
    }

    /// Iterates variable ids in their defined order.
    pub fn variables(&self) -> impl Iterator<Item = VariableId> {
        0..self.domains.len() as VariableId
    }

    /// The original (construction-time) domain of `var`.
    pub fn domain(&self, var: VariableId) -> &Domain<V> {
        &self.domains[var as usize]
    }

    pub fn constraints(&self) -> &[Constraint<V>] {
        &self.constraints
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint<V> {
        &self.constraints[id]
    }

    /// Variables sharing at least one constraint with `var`, ascending.
    pub fn neighbors(&self, var: VariableId) -> &[VariableId] {
        &self.neighbors[var as usize]
    }

    /// Ids of the constraints whose scope contains `var`.
    pub fn constraints_of(&self, var: VariableId) -> &[ConstraintId] {
        &self.constraints_of[var as usize]
    }

    /// A fresh copy of the original domains, for use as current domains.
    pub fn clone_domains(&self) -> Vec<Domain<V>> {
        self.domains.clone()
    }
}

/// An insertion-ordered partial assignment of values to variables.
///
/// The binding order is the current search path: `depth_of` reports how
/// deep a variable sits on that path, which is what conflict-directed
/// backjumping uses to pick its jump target.
#[derive(Debug, Clone)]
pub struct Assignment<V> {
    values: Vec<Option<V>>,
    order: Vec<VariableId>,
    depth: Vec<Option<u32>>,
}

impl<V: ValueOrdering> Assignment<V> {
    pub fn new(num_variables: usize) -> Self {
        Self {
            values: vec![None; num_variables],
            order: Vec::with_capacity(num_variables),
            depth: vec![None; num_variables],
        }
    }

    /// The number of bound variables.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True once every variable is bound.
    pub fn is_total(&self) -> bool {
        self.order.len() == self.values.len()
    }

    pub fn is_bound(&self, var: VariableId) -> bool {
        self.values[var as usize].is_some()
    }

    pub fn get(&self, var: VariableId) -> Option<&V> {
        self.values[var as usize].as_ref()
    }

    /// Position of `var` on the current path, if bound.
    pub fn depth_of(&self, var: VariableId) -> Option<u32> {
        self.depth[var as usize]
    }

    /// The most recently bound variable.
    pub fn last_bound(&self) -> Option<VariableId> {
        self.order.last().copied()
    }

    pub(crate) fn bind(&mut self, var: VariableId, value: V) {
        debug_assert!(!self.is_bound(var));
        self.depth[var as usize] = Some(self.order.len() as u32);
        self.order.push(var);
        self.values[var as usize] = Some(value);
    }

    /// Unbinds `var`, which must be the most recent binding.
    pub(crate) fn unbind(&mut self, var: VariableId) {
        debug_assert_eq!(self.order.last(), Some(&var));
        self.order.pop();
        self.values[var as usize] = None;
        self.depth[var as usize] = None;
    }

    /// Replaces the value of an already-bound variable in place, keeping
    /// its position on the path. Used by local search repair steps.
    pub(crate) fn rebind(&mut self, var: VariableId, value: V) {
        debug_assert!(self.is_bound(var));
        self.values[var as usize] = Some(value);
    }

    /// A dense copy of the assignment, if total.
    pub fn to_total(&self) -> Option<Vec<V>> {
        if !self.is_total() {
            return None;
        }
        self.values.iter().cloned().collect()
    }
}
