//! Batch testing of a solver against a directory of maze files

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{bail, Context};
use itertools::Itertools;

use crate::controller::{generate_connected, GenerationConfig};
use crate::goal::GoalRegion;
use crate::maze_file::{save_maze, MazeFileError, MazeLayout};
use crate::maze_generator::MazeGenerator;
use crate::process::{LaunchError, ProcessLink, SolverCommand};
use crate::simulator::{run_session, SessionConfig, SessionReport};

/// Default time to wait for the solver's next command
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Extension of maze files picked up by [maze_files]
pub const MAZE_EXTENSION: &str = "maz";

/// Settings for a batch run
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub solver: SolverCommand,
    /// Failing mazes are copied here when set
    pub failures_dir: Option<PathBuf>,
    pub session: SessionConfig,
    pub read_timeout: Option<Duration>,
    pub width: usize,
    pub height: usize,
}

impl BatchConfig {
    pub fn new(solver: SolverCommand) -> Self {
        BatchConfig {
            solver,
            failures_dir: None,
            session: SessionConfig::default(),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            width: 10,
            height: 10,
        }
    }
}

/// What happened with one maze file
#[derive(Debug)]
pub enum RunResult {
    Completed(SessionReport),
    /// The file could not be loaded, so the solver was never started
    InvalidMaze(MazeFileError),
}

/// One maze of a batch
#[derive(Debug)]
pub struct MazeRun {
    pub name: String,
    pub path: PathBuf,
    pub result: RunResult,
}

impl MazeRun {
    pub fn passed(&self) -> bool {
        matches!(&self.result, RunResult::Completed(report) if report.is_success())
    }

    pub fn steps(&self) -> usize {
        match &self.result {
            RunResult::Completed(report) => report.steps,
            RunResult::InvalidMaze(_) => 0,
        }
    }

    pub fn reason(&self) -> String {
        match &self.result {
            RunResult::Completed(report) => report.to_string(),
            RunResult::InvalidMaze(err) => format!("Invalid maze file: {err}"),
        }
    }

    /// Table row under [BatchSummary::header]
    pub fn row(&self, index: usize) -> String {
        let status = if self.passed() { "PASS" } else { "FAIL" };
        format!(
            "{:<6} {:<30} {:<10} {:<8} {}",
            index,
            self.name,
            status,
            self.steps(),
            self.reason()
        )
    }
}

/// Results of a batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub runs: Vec<MazeRun>,
    pub failures_dir: Option<PathBuf>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.runs.len()
    }

    pub fn passed(&self) -> usize {
        self.runs.iter().filter(|run| run.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn total_steps(&self) -> usize {
        self.runs.iter().map(MazeRun::steps).sum()
    }

    pub fn average_steps(&self) -> f64 {
        if self.runs.is_empty() {
            0.0
        } else {
            self.total_steps() as f64 / self.total() as f64
        }
    }

    /// Table header for the per-maze rows
    pub fn header() -> String {
        format!(
            "{:<6} {:<30} {:<10} {:<8} Reason\n{}",
            "#",
            "Maze",
            "Result",
            "Steps",
            "-".repeat(80)
        )
    }

    /// Totals and the list of failures
    pub fn write_totals<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rule = "=".repeat(80);
        let total = self.total();
        writeln!(out, "\n{rule}")?;
        writeln!(
            out,
            "RESULTS: {}/{total} passed,  {}/{total} failed",
            self.passed(),
            self.failed()
        )?;
        writeln!(
            out,
            "AVERAGE STEPS: {:.1}  (total: {})",
            self.average_steps(),
            self.total_steps()
        )?;

        let failures = self.runs.iter().filter(|run| !run.passed()).collect_vec();
        if failures.is_empty() {
            writeln!(out, "\nAll mazes passed!")?;
        } else {
            if let Some(dir) = &self.failures_dir {
                writeln!(out, "\nFailed mazes saved to: {}", dir.display())?;
            }
            writeln!(out)?;
            for run in failures {
                writeln!(out, "  {}  -  {}", run.name, run.reason())?;
            }
        }
        writeln!(out, "{rule}")
    }
}

/// Run a shell build command, e.g. `g++ Main.cpp API.cpp -o mouse`
pub fn build_solver(script: &str, dir: Option<&Path>) -> anyhow::Result<()> {
    tracing::info!(script, "building solver");
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    let output = cmd
        .output()
        .with_context(|| format!("failed to run build command `{script}`"))?;
    if !output.status.success() {
        bail!(
            "build command `{script}` failed ({}):\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }
    Ok(())
}

/// Generate `count` connected mazes into `dir` as `{prefix}_000.maz`,
/// `{prefix}_001.maz` and so on
pub fn generate_maze_files<R: rand::Rng>(
    generator: &mut MazeGenerator<R>,
    config: &GenerationConfig,
    dir: &Path,
    prefix: &str,
    count: usize,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create maze directory {}", dir.display()))?;
    let mut paths = Vec::with_capacity(count);
    for i in 0..count {
        let maze = generate_connected(generator, config)?;
        let path = dir.join(format!("{prefix}_{i:03}.{MAZE_EXTENSION}"));
        save_maze(&maze.walls, &path)?;
        tracing::info!(path = %path.display(), attempts = maze.attempts, "wrote maze");
        paths.push(path);
    }
    Ok(paths)
}

/// All maze files in `dir`, sorted by name
pub fn maze_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot read maze directory {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == MAZE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load one maze and run the solver against it
pub fn run_maze(path: &Path, config: &BatchConfig) -> Result<RunResult, LaunchError> {
    let layout = match MazeLayout::load(path, config.width, config.height) {
        Ok(layout) => layout,
        Err(err) => return Ok(RunResult::InvalidMaze(err)),
    };
    for (cell, dir) in layout.inconsistencies() {
        tracing::warn!(
            maze = %path.display(),
            %cell,
            %dir,
            "neighbouring cells disagree about a wall"
        );
    }

    let goal = GoalRegion::centered(config.width, config.height);
    let mut link = ProcessLink::spawn(&config.solver, config.read_timeout)?;
    let report = run_session(&layout, goal, &mut link, &config.session);
    Ok(RunResult::Completed(report))
}

/// Run the solver against each of `files`, usually found by [maze_files].
///
/// `on_run` sees each result as soon as it is available, with its 1-based
/// index and the total number of mazes. A solver that cannot be launched
/// aborts the batch.
pub fn run_batch(
    config: &BatchConfig,
    files: &[PathBuf],
    mut on_run: impl FnMut(usize, usize, &MazeRun),
) -> anyhow::Result<BatchSummary> {
    if let Some(dir) = &config.failures_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create failures directory {}", dir.display()))?;
    }

    let mut summary = BatchSummary {
        runs: Vec::with_capacity(files.len()),
        failures_dir: config.failures_dir.clone(),
    };
    for (i, path) in files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let result = run_maze(path, config)?;
        let run = MazeRun {
            name,
            path: path.clone(),
            result,
        };

        if !run.passed() {
            if let Some(dir) = &config.failures_dir {
                let target = dir.join(&run.name);
                fs::copy(path, &target)
                    .with_context(|| format!("cannot copy failed maze to {}", target.display()))?;
            }
        }
        on_run(i + 1, files.len(), &run);
        summary.runs.push(run);
    }
    Ok(summary)
}
