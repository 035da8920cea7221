use prettytable::{Cell, Row, Table};

use crate::solver::{
    csp::Csp,
    engine::{ConstraintId, PerConstraintStats, SearchStats},
    value::ValueOrdering,
};

/// Renders a per-constraint activity table: revisions, prunings, and the
/// final dom/wdeg weight. Constraints that never took part in propagation
/// are omitted.
pub fn render_stats_table<V: ValueOrdering>(stats: &SearchStats, csp: &Csp<V>) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Constraint"),
        Cell::new("ID"),
        Cell::new("Description"),
        Cell::new("Revisions"),
        Cell::new("Prunings"),
        Cell::new("Weight"),
    ]));

    let mut sorted_stats: Vec<(&ConstraintId, &PerConstraintStats)> =
        stats.constraint_stats.iter().collect();
    sorted_stats.sort_by_key(|(id, _)| **id);

    for (constraint_id, constraint_stats) in sorted_stats {
        let descriptor = csp.constraint(*constraint_id).descriptor();
        let weight = stats
            .constraint_weights
            .get(*constraint_id)
            .copied()
            .unwrap_or(1);
        table.add_row(Row::new(vec![
            Cell::new(&descriptor.name),
            Cell::new(&constraint_id.to_string()),
            Cell::new(&descriptor.description),
            Cell::new(&constraint_stats.revisions.to_string()),
            Cell::new(&constraint_stats.prunings.to_string()),
            Cell::new(&weight.to_string()),
        ]));
    }

    table.to_string()
}

/// One-line summary of a finished solve, for logs and demo binaries.
pub fn render_summary(stats: &SearchStats) -> String {
    format!(
        "{:?} in {:.4}s: {} assignments, {} backtracks, {} checks, {} prunings, {} local steps",
        stats.status,
        stats.runtime_seconds(),
        stats.assignments,
        stats.backtracks,
        stats.constraint_checks,
        stats.propagations,
        stats.local_steps,
    )
}
