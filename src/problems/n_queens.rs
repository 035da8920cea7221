//! N-queens with one variable per column holding the queen's row.
//!
//! Attacks are expressed as user predicates, which makes this the standing
//! exercise for the predicate constraint variant.

use crate::{
    error::Result,
    solver::{constraint::Constraint, csp::Csp, engine::VariableId},
};

/// Builds the CSP for `n` queens on an `n` by `n` board.
pub fn n_queens(n: usize) -> Result<Csp<i64>> {
    let mut csp = Csp::new();
    let columns: Vec<VariableId> = (0..n)
        .map(|_| csp.add_variable(0..n as i64))
        .collect::<Result<_>>()?;

    for i in 0..n {
        for j in (i + 1)..n {
            let distance = (j - i) as i64;
            csp.add_constraint(Constraint::predicate(
                vec![columns[i], columns[j]],
                "no-attack",
                move |vals: &[&i64]| {
                    vals[0] != vals[1] && (*vals[0] - *vals[1]).abs() != distance
                },
            ))?;
        }
    }
    Ok(csp)
}

/// True iff `rows` is a valid placement (one row index per column).
pub fn is_valid_placement(rows: &[i64]) -> bool {
    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            if rows[i] == rows[j] || (rows[i] - rows[j]).abs() == (j - i) as i64 {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::{
        config::{Algorithm, Inference, SolverConfig},
        engine::{SolveStatus, SolverEngine},
    };

    #[test]
    fn eight_queens_has_a_solution() {
        let csp = n_queens(8).unwrap();
        let config = SolverConfig {
            inference: Inference::ForwardChecking,
            ..Default::default()
        };
        let (solution, stats) = SolverEngine::from_config(config)
            .unwrap()
            .solve(&csp)
            .unwrap();
        assert_eq!(stats.status, SolveStatus::Solved);
        assert!(is_valid_placement(&solution.unwrap()));
    }

    #[test]
    fn three_queens_is_unsolvable() {
        let csp = n_queens(3).unwrap();
        let (solution, stats) = SolverEngine::from_config(SolverConfig::default())
            .unwrap()
            .solve(&csp)
            .unwrap();
        assert_eq!(solution, None);
        assert_eq!(stats.status, SolveStatus::Unsolvable);
    }

    #[test]
    fn min_conflicts_places_fifty_queens_within_budget() {
        let csp = n_queens(50).unwrap();
        let config = SolverConfig {
            algorithm: Algorithm::MinConflicts,
            max_steps: 10_000,
            seed: 17,
            ..Default::default()
        };
        let (solution, stats) = SolverEngine::from_config(config)
            .unwrap()
            .solve(&csp)
            .unwrap();
        assert_eq!(stats.status, SolveStatus::Solved);
        assert!(stats.local_steps <= 10_000);
        assert!(is_valid_placement(&solution.unwrap()));
    }
}
