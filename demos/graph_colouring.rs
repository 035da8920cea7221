use clap::Parser;
use expedio::{
    error::Result,
    problems::graph_coloring,
    solver::{
        config::{Inference, SolverConfig, VariableOrder},
        engine::{SolveStatus, SolverEngine},
        stats::render_summary,
    },
};

/// Color a random G(n, p) graph with k colors.
#[derive(Parser, Debug)]
struct Args {
    /// Number of vertices.
    #[arg(long, default_value_t = 30)]
    n: usize,

    /// Edge probability.
    #[arg(long, default_value_t = 0.3)]
    p: f64,

    /// Number of colors.
    #[arg(long, default_value_t = 4)]
    k: usize,

    /// RNG seed for the instance.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Use the adaptive dom/wdeg variable heuristic.
    #[arg(long)]
    dom_wdeg: bool,

    /// Use conflict-directed backjumping.
    #[arg(long)]
    cbj: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let csp = graph_coloring::random(args.n, args.p, args.k, args.seed)?;
    println!(
        "generated {} vertices, {} edges",
        args.n,
        csp.constraints().len()
    );

    let config = SolverConfig {
        inference: Inference::ForwardChecking,
        variable_order: if args.dom_wdeg {
            VariableOrder::DomWdeg
        } else {
            VariableOrder::Mrv
        },
        use_cbj: args.cbj,
        ..Default::default()
    };
    let solver = SolverEngine::from_config(config)?;
    let (solution, stats) = solver.solve(&csp)?;

    match (solution, stats.status) {
        (Some(colors), _) => {
            println!("coloring found: {colors:?}");
        }
        (None, SolveStatus::Unsolvable) => {
            println!("not colorable with {} colors", args.k);
        }
        (None, _) => {
            println!("budget exhausted before a verdict");
        }
    }
    println!("{}", render_summary(&stats));
    Ok(())
}
