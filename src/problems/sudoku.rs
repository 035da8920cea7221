//! Classic 9x9 Sudoku as a binary CSP.
//!
//! Each cell is one variable; rows, columns, and 3x3 boxes contribute
//! pairwise disequalities. Exploding all-different into pairs multiplies
//! the constraint count, but it keeps propagation and the weighted-degree
//! heuristic working at a single granularity.

use crate::{
    error::{Result, SolverError},
    solver::{constraint::all_different, csp::Csp, engine::VariableId},
};

/// A cell value, `1..=9`.
pub type CellValue = u8;

/// The variable id of cell `(row, col)`, both zero-based.
pub fn cell(row: usize, col: usize) -> VariableId {
    (row * 9 + col) as VariableId
}

/// Builds the CSP for a puzzle given as 81 cell characters.
///
/// `'1'..='9'` are clues, `'0'` or `'.'` mark empty cells, and whitespace
/// (spaces, newlines) is ignored, so both compact strings and laid-out
/// grids parse.
pub fn from_str(puzzle: &str) -> Result<Csp<CellValue>> {
    let cells: Vec<char> = puzzle.chars().filter(|c| !c.is_whitespace()).collect();
    if cells.len() != 81 {
        return Err(SolverError::MalformedProblem(format!(
            "expected 81 cells, got {}",
            cells.len()
        ))
        .into());
    }

    let mut csp = Csp::new();
    for ch in &cells {
        match ch {
            '0' | '.' => {
                csp.add_variable(1..=9u8)?;
            }
            '1'..='9' => {
                let clue = *ch as u8 - b'0';
                csp.add_variable([clue])?;
            }
            other => {
                return Err(SolverError::MalformedProblem(format!(
                    "unexpected cell character {other:?}"
                ))
                .into());
            }
        }
    }

    for row in 0..9 {
        let vars: Vec<VariableId> = (0..9).map(|col| cell(row, col)).collect();
        csp.add_constraints(all_different(&vars))?;
    }
    for col in 0..9 {
        let vars: Vec<VariableId> = (0..9).map(|row| cell(row, col)).collect();
        csp.add_constraints(all_different(&vars))?;
    }
    for band in 0..3 {
        for stack in 0..3 {
            let mut vars = Vec::with_capacity(9);
            for row in band * 3..band * 3 + 3 {
                for col in stack * 3..stack * 3 + 3 {
                    vars.push(cell(row, col));
                }
            }
            csp.add_constraints(all_different(&vars))?;
        }
    }

    Ok(csp)
}

/// Renders a solved grid with band and stack separators.
pub fn format_grid(solution: &[CellValue]) -> String {
    let mut out = String::new();
    for row in 0..9 {
        if row > 0 && row % 3 == 0 {
            out.push_str("------+-------+------\n");
        }
        for col in 0..9 {
            if col > 0 && col % 3 == 0 {
                out.push_str("| ");
            }
            out.push_str(&solution[cell(row, col) as usize].to_string());
            if col < 8 {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out
}
