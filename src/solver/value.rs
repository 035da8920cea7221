/// The base trait for any value in a domain.
pub trait ValueEquality: Clone + std::fmt::Debug + Eq + std::hash::Hash + 'static {}
impl<T> ValueEquality for T where T: Clone + std::fmt::Debug + Eq + std::hash::Hash + 'static {}

/// A capability trait for values that can be totally ordered.
///
/// Domain iteration, value ordering heuristics, and tie-breaking all rely on
/// this order, which is what makes the solver deterministic for a fixed
/// input and configuration.
pub trait ValueOrdering: ValueEquality + Ord {}
impl<T> ValueOrdering for T where T: ValueEquality + Ord {}
