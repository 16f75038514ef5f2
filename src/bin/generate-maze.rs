//! CLI for maze generation

use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::Parser;
use micromouse_harness::{
    controller::DEFAULT_MAX_ATTEMPTS, generate_connected, harness::generate_maze_files,
    logging::init_tracing, maze_file::write_maze, GenerationConfig, MazeGenerator,
};

/// Micromouse maze generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze width
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Maze height
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of mazes to generate
    #[arg(long, default_value_t = 1)]
    count: usize,

    /// Write `.maz` files here instead of printing to stdout
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// File name prefix for mazes written to `--out-dir`
    #[arg(long, default_value = "maze")]
    prefix: String,

    /// Give up after this many disconnected candidates
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    /// Print a picture of the maze instead of the `.maz` lines
    #[arg(long)]
    render: bool,

    /// More log output, may be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Generate mazes, write them to files or stdout
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = GenerationConfig {
        width: args.width,
        height: args.height,
        goal: None,
        max_attempts: Some(args.max_attempts),
    };
    let mut gen = MazeGenerator::new(args.seed);

    if let Some(dir) = &args.out_dir {
        let paths = generate_maze_files(&mut gen, &config, dir, &args.prefix, args.count)?;
        for path in paths {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    for i in 0..args.count {
        let maze = generate_connected(&mut gen, &config)?;
        if i > 0 {
            writeln!(stdout)?;
        }
        if args.render {
            write!(stdout, "{}", maze.walls)?;
        } else {
            write_maze(&maze.walls, &mut stdout)?;
        }
    }
    Ok(())
}
