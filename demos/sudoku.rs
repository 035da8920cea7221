use clap::Parser;
use expedio::{
    error::Result,
    problems::sudoku,
    solver::{
        config::{Inference, SolverConfig, ValueOrder, VariableOrder},
        engine::{SolveStatus, SolverEngine},
        stats::{render_stats_table, render_summary},
    },
};

/// Solve a Sudoku puzzle given as 81 characters ('0' or '.' for empty).
#[derive(Parser, Debug)]
struct Args {
    /// The puzzle string; defaults to a classic easy instance.
    #[arg(
        default_value = "530070000600195000098000060800060003400803001700020006060000280000419005000080079"
    )]
    puzzle: String,

    /// Inference level: none, fc, or mac.
    #[arg(long, default_value = "mac")]
    inference: String,

    /// Print the per-constraint activity table.
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let inference = match args.inference.as_str() {
        "none" => Inference::None,
        "fc" => Inference::ForwardChecking,
        _ => Inference::Mac,
    };

    let csp = sudoku::from_str(&args.puzzle)?;
    let config = SolverConfig {
        inference,
        variable_order: VariableOrder::Mrv,
        value_order: ValueOrder::Lcv,
        ..Default::default()
    };
    let solver = SolverEngine::from_config(config)?;
    let (solution, stats) = solver.solve(&csp)?;

    match solution {
        Some(solution) => {
            println!("{}", sudoku::format_grid(&solution));
        }
        None if stats.status == SolveStatus::Unsolvable => {
            println!("puzzle has no solution");
        }
        None => {
            println!("budget exhausted before a verdict");
        }
    }
    println!("{}", render_summary(&stats));
    if args.stats {
        println!("{}", render_stats_table(&stats, &csp));
    }
    Ok(())
}
