#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that solves a Mouse Maze board and prints the greedy path.

mod layout;
mod scenario;

use std::{fmt, fs, num::NonZeroUsize, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mouse_maze_core::{CellCoord, CellKind, DEFAULT_TOLERANCE, MAX_BOARD_SIZE};
use mouse_maze_system_policy::walk;
use mouse_maze_system_solver::{
    solve_parallel_with_observer, solve_sequential_with_observer, Solution, SolverConfig,
    StopRule, SweepReport,
};
use mouse_maze_world::{query, Board};
use tracing::{debug, info, Level};

use self::scenario::Scenario;

/// Solve a Mouse Maze board by value iteration and walk the greedy path.
#[derive(Debug, Parser)]
#[command(name = "mouse-maze", version, about)]
struct Args {
    /// Text layout to solve (`.` empty, `M` mouse, `R` reward, `F` fire, `#` rock).
    #[arg(long, conflicts_with_all = ["scenario", "random"])]
    layout: Option<PathBuf>,
    /// Built-in board to solve when no layout is given.
    #[arg(long, value_enum, conflicts_with = "random")]
    scenario: Option<Scenario>,
    /// Seed for a reproducible random board.
    #[arg(long, value_name = "SEED")]
    random: Option<u64>,
    /// Side length of random boards.
    #[arg(
        long,
        default_value_t = 20,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_BOARD_SIZE))
    )]
    size: u32,
    /// Discount factor applied to future utility, strictly between 0 and 1.
    #[arg(long, default_value_t = 0.9)]
    gamma: f64,
    /// Error tolerance used to derive the convergence threshold.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    epsilon: f64,
    /// Sweeps attempted before reporting non-convergence.
    #[arg(long, conflicts_with = "fixed_sweeps")]
    max_sweeps: Option<u32>,
    /// Run exactly this many sweeps instead of testing for convergence.
    #[arg(long)]
    fixed_sweeps: Option<u32>,
    /// Solver used for value iteration.
    #[arg(long, value_enum, default_value_t = SolverKind::Parallel)]
    solver: SolverKind,
    /// Worker threads for the parallel solver.
    #[arg(long)]
    threads: Option<NonZeroUsize>,
    /// Log every sweep.
    #[arg(long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SolverKind {
    /// Single-threaded row-major sweeps.
    Sequential,
    /// Row-partitioned sweeps on a rayon thread pool.
    Parallel,
}

/// Entry point for the Mouse Maze command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let board = load_board(&args)?;
    let grid = query::reward_grid(&board).context("board does not form a reward grid")?;
    let config = solver_config(&args)?;

    info!(
        size = grid.size(),
        gamma = config.discount().get(),
        threshold = config.convergence_threshold(),
        solver = ?args.solver,
        "solving board"
    );

    let observer = |report: SweepReport| {
        debug!(sweep = report.sweep, max_delta = report.max_delta, "sweep");
    };
    let started = Instant::now();
    let solution = match args.solver {
        SolverKind::Sequential => solve_sequential_with_observer(&grid, &config, observer),
        SolverKind::Parallel => solve_parallel_with_observer(&grid, &config, observer),
    }
    .context("value iteration failed")?;
    info!(
        sweeps = solution.sweeps(),
        max_delta = solution.max_delta(),
        elapsed = ?started.elapsed(),
        "solve finished"
    );

    print!(
        "{}",
        Report {
            board: &board,
            solution: &solution,
        }
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_board(args: &Args) -> Result<Board> {
    if let Some(path) = &args.layout {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout {}", path.display()))?;
        return layout::parse(&text)
            .with_context(|| format!("failed to parse layout {}", path.display()));
    }

    if let Some(seed) = args.random {
        return Ok(scenario::random_board(args.size, seed));
    }

    Ok(args.scenario.unwrap_or(Scenario::Classic).board())
}

fn solver_config(args: &Args) -> Result<SolverConfig> {
    let mut config = SolverConfig::new(args.gamma)?
        .with_tolerance(args.epsilon)?
        .with_threads(args.threads);
    if let Some(max_sweeps) = args.max_sweeps {
        config = config.with_max_sweeps(max_sweeps)?;
    }
    if let Some(sweeps) = args.fixed_sweeps {
        config = config.with_stop(StopRule::FixedSweeps(sweeps))?;
    }
    Ok(config)
}

/// Text report printed after a successful solve.
struct Report<'a> {
    board: &'a Board,
    solution: &'a Solution,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let utilities = self.solution.utilities();
        let start = query::mouse_start(self.board);

        writeln!(f, "Board:\n{}\n", layout::render(self.board))?;
        writeln!(
            f,
            "Finished after {} sweeps (last change {:.3e}).\n",
            self.solution.sweeps(),
            self.solution.max_delta()
        )?;
        writeln!(f, "Utilities:")?;
        for row in utilities.rows() {
            let line: Vec<String> = row.iter().map(|value| format!("{value:>6.2}")).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        writeln!(f, "\nPath from {}:", format_cell(start))?;
        for (step, cell) in walk(utilities, start).enumerate() {
            let note = match query::kind_at(self.board, cell).unwrap_or_default() {
                CellKind::Reward => " reward",
                CellKind::Fire => " fire",
                _ => "",
            };
            writeln!(f, "{step:>4}: {}{note}", format_cell(cell))?;
        }
        Ok(())
    }
}

fn format_cell(cell: CellCoord) -> String {
    format!("({}, {})", cell.row(), cell.column())
}
