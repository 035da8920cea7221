//! Problem builders: thin constructors that translate familiar puzzle
//! inputs into [`Csp`](crate::solver::csp::Csp) values for the solver.

pub mod graph_coloring;
pub mod n_queens;
pub mod sudoku;
