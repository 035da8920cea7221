//! Expedio is a generic solver for finite-domain constraint satisfaction
//! problems (CSPs).
//!
//! The engine is problem-agnostic: you describe variables, their domains,
//! and the constraints between them, and the solver searches for a total
//! assignment that satisfies everything, or proves that none exists.
//!
//! # Core Concepts
//!
//! - **[`Csp`]**: the problem container. Variables are dense ids handed out
//!   by [`Csp::add_variable`]; constraints are added over those ids.
//! - **[`Constraint`]**: a rule over a scope of variables, either a built-in
//!   kind like binary disequality or a user-supplied predicate.
//! - **[`SolverConfig`]** and **[`SolverEngine`]**: pick an algorithm family
//!   (systematic backtracking or min-conflicts local search), an inference
//!   level (none, forward checking, or full arc consistency), and the
//!   variable/value heuristics, then solve.
//!
//! [`Csp`]: solver::csp::Csp
//! [`Csp::add_variable`]: solver::csp::Csp::add_variable
//! [`Constraint`]: solver::constraint::Constraint
//! [`SolverConfig`]: solver::config::SolverConfig
//! [`SolverEngine`]: solver::engine::SolverEngine
//!
//! # Example: A Simple 2-Variable Problem
//!
//! Solve `?a != ?b` where `?a` can be `1` or `2` and `?b` can only be `1`;
//! the solver must deduce that `?a` is `2`.
//!
//! ```
//! use expedio::solver::{
//!     config::SolverConfig, constraint::Constraint, csp::Csp, engine::SolverEngine,
//! };
//!
//! let mut csp: Csp<i64> = Csp::new();
//! let a = csp.add_variable([1, 2]).unwrap();
//! let b = csp.add_variable([1]).unwrap();
//! csp.add_constraint(Constraint::not_equal(a, b)).unwrap();
//!
//! let solver = SolverEngine::from_config(SolverConfig::default()).unwrap();
//! let (solution, stats) = solver.solve(&csp).unwrap();
//!
//! let solution = solution.unwrap();
//! assert_eq!(solution[a as usize], 2);
//! assert_eq!(solution[b as usize], 1);
//! println!("{}", expedio::solver::stats::render_summary(&stats));
//! ```
//!
//! Ready-made builders for Sudoku, graph coloring, and N-queens live under
//! [`problems`].

pub mod error;
pub mod problems;
pub mod solver;
