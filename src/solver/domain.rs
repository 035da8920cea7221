use im::OrdSet;

use crate::solver::value::ValueOrdering;

/// The set of values still considered feasible for one variable.
///
/// Backed by a persistent ordered set, so cloning the original domains into
/// the per-solve current domains is cheap, iteration order is the value
/// order (deterministic), and single-value removal plus later re-insertion
/// is exactly the trail discipline the searcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain<V: ValueOrdering>(OrdSet<V>);

impl<V: ValueOrdering> Domain<V> {
    pub fn new(values: impl IntoIterator<Item = V>) -> Self {
        Self(values.into_iter().collect())
    }

    /// Returns the number of feasible values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the domain has been wiped out.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the domain contains exactly one value.
    pub fn is_singleton(&self) -> bool {
        self.0.len() == 1
    }

    pub fn contains(&self, value: &V) -> bool {
        self.0.contains(value)
    }

    /// If the domain is a singleton, returns the single value.
    pub fn singleton_value(&self) -> Option<&V> {
        if self.is_singleton() {
            self.0.get_min()
        } else {
            None
        }
    }

    /// Iterates the values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.0.iter()
    }

    /// Removes `value`, returning `true` if it was present.
    pub(crate) fn remove(&mut self, value: &V) -> bool {
        self.0.remove(value).is_some()
    }

    /// Re-inserts a value removed earlier.
    pub(crate) fn restore(&mut self, value: V) {
        self.0.insert(value);
    }
}

impl<V: ValueOrdering> FromIterator<V> for Domain<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn iterates_in_value_order() {
        let domain = Domain::new([3, 1, 2]);
        let values: Vec<i64> = domain.iter().copied().collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn remove_and_restore_round_trip() {
        let mut domain = Domain::new([1, 2, 3]);
        let snapshot = domain.clone();

        assert!(domain.remove(&2));
        assert!(!domain.remove(&2));
        assert_eq!(domain.len(), 2);

        domain.restore(2);
        assert_eq!(domain, snapshot);
    }

    #[test]
    fn singleton_value_only_for_singletons() {
        let domain = Domain::new([7]);
        assert_eq!(domain.singleton_value(), Some(&7));
        let wide = Domain::new([1, 7]);
        assert_eq!(wide.singleton_value(), None);
    }
}
