use std::fmt;
use std::sync::Arc;

use crate::solver::{
    csp::Assignment, domain::Domain, engine::VariableId, value::ValueOrdering,
};

/// Human-readable identification of a constraint, used by the statistics
/// table renderer.
#[derive(Debug, Clone)]
pub struct ConstraintDescriptor {
    pub name: String,
    pub description: String,
}

/// Predicate over the values bound to a constraint's scope, in scope order.
/// Only ever invoked with the scope fully bound.
pub type PredicateFn<V> = Arc<dyn Fn(&[&V]) -> bool + Send + Sync>;

/// The behaviour of a constraint. A closed set of kinds plus a user-supplied
/// predicate variant; the engine dispatches on the variant and never
/// introspects further.
#[derive(Clone)]
pub enum ConstraintKind<V: ValueOrdering> {
    /// Binary disequality between the two scope variables.
    NotEqual,
    /// User-defined predicate over the fully-bound scope.
    Predicate { name: String, test: PredicateFn<V> },
}

impl<V: ValueOrdering> fmt::Debug for ConstraintKind<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::NotEqual => write!(f, "NotEqual"),
            ConstraintKind::Predicate { name, .. } => write!(f, "Predicate({name})"),
        }
    }
}

/// A rule over a fixed scope of variables.
///
/// `is_satisfied` accepts partial assignments: a constraint whose scope is
/// not fully bound is never reported violated. Binary constraints
/// additionally answer point queries (`check_pair`) and support queries
/// (`supports`), which is what propagation and the value heuristics run on.
#[derive(Debug, Clone)]
pub struct Constraint<V: ValueOrdering> {
    scope: Vec<VariableId>,
    kind: ConstraintKind<V>,
}

impl<V: ValueOrdering> Constraint<V> {
    /// Creates the binary constraint `?a != ?b`.
    pub fn not_equal(a: VariableId, b: VariableId) -> Self {
        Self {
            scope: vec![a, b],
            kind: ConstraintKind::NotEqual,
        }
    }

    /// Creates a constraint from a user predicate over `scope`.
    ///
    /// The predicate receives the bound values in scope order and is only
    /// consulted once every scope variable is bound.
    pub fn predicate(
        scope: Vec<VariableId>,
        name: impl Into<String>,
        test: impl Fn(&[&V]) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            scope,
            kind: ConstraintKind::Predicate {
                name: name.into(),
                test: Arc::new(test),
            },
        }
    }

    pub fn scope(&self) -> &[VariableId] {
        &self.scope
    }

    pub fn is_binary(&self) -> bool {
        self.scope.len() == 2
    }

    /// Given one endpoint of a binary constraint, returns the other.
    pub fn other_end(&self, var: VariableId) -> VariableId {
        if self.scope[0] == var {
            self.scope[1]
        } else {
            self.scope[0]
        }
    }

    /// Checks the constraint against a (possibly partial) assignment.
    /// Unbound scope variables are ignored.
    pub fn is_satisfied(&self, assignment: &Assignment<V>) -> bool {
        match &self.kind {
            ConstraintKind::NotEqual => {
                match (assignment.get(self.scope[0]), assignment.get(self.scope[1])) {
                    (Some(a), Some(b)) => a != b,
                    _ => true,
                }
            }
            ConstraintKind::Predicate { test, .. } => {
                let mut bound = Vec::with_capacity(self.scope.len());
                for &var in &self.scope {
                    match assignment.get(var) {
                        Some(value) => bound.push(value),
                        None => return true,
                    }
                }
                test(&bound)
            }
        }
    }

    /// Checks a concrete pair against a binary constraint, with `x` bound to
    /// `a` and `y` bound to `b`. `x` and `y` must be the scope variables.
    pub fn check_pair(&self, x: VariableId, a: &V, _y: VariableId, b: &V) -> bool {
        debug_assert!(self.is_binary());
        match &self.kind {
            ConstraintKind::NotEqual => a != b,
            ConstraintKind::Predicate { test, .. } => {
                if self.scope[0] == x {
                    test(&[a, b])
                } else {
                    test(&[b, a])
                }
            }
        }
    }

    /// True iff some value in `dom_y` pairs consistently with `x = a` under
    /// this binary constraint.
    pub fn supports(&self, x: VariableId, a: &V, y: VariableId, dom_y: &Domain<V>) -> bool {
        dom_y.iter().any(|b| self.check_pair(x, a, y, b))
    }

    pub fn descriptor(&self) -> ConstraintDescriptor {
        let vars = self
            .scope
            .iter()
            .map(|v| format!("?{v}"))
            .collect::<Vec<_>>()
            .join(", ");
        match &self.kind {
            ConstraintKind::NotEqual => ConstraintDescriptor {
                name: "NotEqual".to_string(),
                description: format!("?{} != ?{}", self.scope[0], self.scope[1]),
            },
            ConstraintKind::Predicate { name, .. } => ConstraintDescriptor {
                name: name.clone(),
                description: format!("{name}({vars})"),
            },
        }
    }
}

/// Expands an all-different over `vars` into pairwise disequalities.
///
/// Propagation and the weighted-degree heuristic both work at binary
/// granularity, so the n-ary reading is always decomposed this way.
pub fn all_different<V: ValueOrdering>(vars: &[VariableId]) -> Vec<Constraint<V>> {
    let mut constraints = Vec::new();
    for i in 0..vars.len() {
        for j in (i + 1)..vars.len() {
            constraints.push(Constraint::not_equal(vars[i], vars[j]));
        }
    }
    constraints
}
