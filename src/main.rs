use std::{process::ExitCode, time::Duration};

use clap::Parser;
use klotski_solver::{Method, Outcome, Puzzle, SearchLimits, Solver, TileMode};

/// Solve one of the built-in sliding-block puzzles and print the moves.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Puzzle to solve: huarongdao, simple or warmup
    #[arg(short, long, default_value = "huarongdao")]
    puzzle: String,

    /// Search method: bfs or dfs
    #[arg(short, long, default_value_t = Method::Bfs)]
    method: Method,

    /// Whether same-shape tiles are interchangeable: distinct or interchangeable
    #[arg(long, default_value_t = TileMode::Interchangeable)]
    mode: TileMode,

    /// Give up after expanding this many positions
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Only count the positions reachable from the start
    #[arg(long)]
    survey: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let puzzle = match Puzzle::by_name(&args.puzzle, args.mode) {
        Ok(puzzle) => puzzle,
        Err(err) => {
            eprintln!("{err} (known puzzles: {})", Puzzle::NAMES.join(", "));
            return ExitCode::FAILURE;
        }
    };

    println!("----");
    println!("Puzzle {}, goal: {}", puzzle.name(), puzzle.goal());
    println!("{}", puzzle.initial().render(true));
    println!("----");

    if args.survey {
        println!("{} reachable positions", puzzle.initial().count_reachable());
        return ExitCode::SUCCESS;
    }

    let mut limits = SearchLimits::default();
    if let Some(max) = args.max_expansions {
        limits = limits.with_max_expansions(max);
    }
    if let Some(secs) = args.timeout_secs {
        limits = limits.with_max_duration(Duration::from_secs(secs));
    }

    let initial = puzzle.initial().clone();
    let mut solver = match Solver::new(initial, puzzle.goal().clone(), args.method) {
        Ok(solver) => solver.with_limits(limits),
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match solver.solve() {
        Outcome::Solved { path, stats } => {
            println!("Found a solution in {} moves:", path.len());
            println!("{stats}");
            println!("========== Solution ===========");
            print!("{}", path.trace());
            ExitCode::SUCCESS
        }
        Outcome::NoSolution { stats } => {
            println!("No solution found");
            println!("{stats}");
            ExitCode::FAILURE
        }
        Outcome::CutOff { limit, stats } => {
            println!("Gave up: {limit:?} limit reached");
            println!("{stats}");
            ExitCode::FAILURE
        }
    }
}
