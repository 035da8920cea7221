//! Graph coloring instances, fixed or randomly generated.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::{Result, SolverError},
    solver::{constraint::Constraint, csp::Csp},
};

/// A color, `0..k`.
pub type Color = u32;

/// Builds a coloring CSP over `n` vertices from an explicit edge list.
pub fn from_edges(n: usize, edges: &[(u32, u32)], k: usize) -> Result<Csp<Color>> {
    let mut csp = Csp::new();
    for _ in 0..n {
        csp.add_variable(0..k as Color)?;
    }
    for &(u, v) in edges {
        csp.add_constraint(Constraint::not_equal(u, v))?;
    }
    Ok(csp)
}

/// A random G(n, p) coloring instance with `k` colors.
///
/// Edges are drawn pair by pair in lexicographic order `(i, j)` with
/// `i < j`, one Bernoulli draw per pair from a `StdRng` seeded with `seed`,
/// so a fixed seed always reproduces the same graph.
pub fn random(n: usize, p: f64, k: usize, seed: u64) -> Result<Csp<Color>> {
    if !(0.0..=1.0).contains(&p) {
        return Err(SolverError::MalformedProblem(format!(
            "edge probability {p} is not within [0, 1]"
        ))
        .into());
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for i in 0..n as u32 {
        for j in (i + 1)..n as u32 {
            if rng.gen_bool(p) {
                edges.push((i, j));
            }
        }
    }
    from_edges(n, &edges, k)
}

/// The complete graph K_n with `k` colors; colorable iff `k >= n`.
pub fn complete(n: usize, k: usize) -> Result<Csp<Color>> {
    let mut edges = Vec::new();
    for i in 0..n as u32 {
        for j in (i + 1)..n as u32 {
            edges.push((i, j));
        }
    }
    from_edges(n, &edges, k)
}
