//! CLI for testing a maze solver

use std::{io, path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{bail, Context};
use clap::Parser;
use micromouse_harness::{
    harness::{build_solver, generate_maze_files, maze_files, run_batch, BatchConfig},
    logging::init_tracing,
    simulator::DEFAULT_MAX_STEPS,
    BatchSummary, GenerationConfig, MazeGenerator, SolverCommand,
};

/// Run a micromouse solver against every maze in a directory
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Solver executable
    solver: PathBuf,

    /// Directory of `.maz` files
    #[arg(default_value = "mazes")]
    mazes_dir: PathBuf,

    /// Argument passed on to the solver, may be repeated
    #[arg(long = "arg", value_name = "ARG")]
    solver_args: Vec<String>,

    /// Shell command that builds the solver before testing
    #[arg(long, value_name = "CMD")]
    build: Option<String>,

    /// Directory to run the build command and the solver in
    #[arg(long, value_name = "DIR")]
    build_dir: Option<PathBuf>,

    /// Generate this many fresh mazes into the maze directory first
    #[arg(long, value_name = "N")]
    generate: Option<usize>,

    /// Random seed for generated mazes
    #[arg(long)]
    seed: Option<u64>,

    /// Copy failing mazes into this directory
    #[arg(long, value_name = "DIR")]
    failures: Option<PathBuf>,

    /// Forward moves allowed per maze
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Give up on a solver that sends nothing for this long
    #[arg(long, default_value_t = 10_000)]
    read_timeout_ms: u64,

    /// Maze width
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Maze height
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// More log output, may be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> anyhow::Result<BatchSummary> {
    if let Some(script) = &args.build {
        build_solver(script, args.build_dir.as_deref())?;
        println!("Build succeeded.\n");
    }

    if let Some(count) = args.generate {
        let config = GenerationConfig {
            width: args.width,
            height: args.height,
            ..Default::default()
        };
        let mut gen = MazeGenerator::new(args.seed);
        generate_maze_files(&mut gen, &config, &args.mazes_dir, "random", count)?;
        println!("Generated {count} mazes in {}\n", args.mazes_dir.display());
    }

    let mut solver = SolverCommand::new(&args.solver);
    solver.args = args.solver_args;
    solver.working_dir = args.build_dir;

    let mut config = BatchConfig::new(solver);
    config.failures_dir = args.failures;
    config.session.max_steps = args.max_steps;
    config.read_timeout = Some(Duration::from_millis(args.read_timeout_ms));
    config.width = args.width;
    config.height = args.height;

    let files = maze_files(&args.mazes_dir)?;
    if files.is_empty() {
        bail!(
            "no .maz files in {}; generate some with `generate-maze` or `--generate N`",
            args.mazes_dir.display()
        );
    }

    println!("Running {} mazes...\n", files.len());
    println!("{}", BatchSummary::header());
    run_batch(&config, &files, |i, _total, run| println!("{}", run.row(i)))
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let summary = run(args)?;
    summary
        .write_totals(&mut io::stdout().lock())
        .context("failed to write report")?;

    Ok(if summary.failed() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
