//! Generate micromouse mazes and test maze-solving programs against them
//!
//! Mazes are 10×10 by default, with the start in the south-west corner at
//! `(0, 0)` and a 2×2 goal region in the middle. A solver talks to the
//! simulator over a line protocol: it asks about walls and moves, the
//! simulator answers and keeps track of where the mouse is.
//!
//! # Examples
//! ## Generating a maze
//! ```
//! use micromouse_harness::{generate_connected, is_fully_connected, GenerationConfig, MazeGenerator, Point};
//!
//! let mut gen = MazeGenerator::new(Some(13));
//! let maze = generate_connected(&mut gen, &GenerationConfig::default()).unwrap();
//! assert!(is_fully_connected(&maze.walls, Point::new(0, 0)));
//!
//! // One line per cell: x y north east south west
//! let text = micromouse_harness::maze_file::to_maz_string(&maze.walls);
//! assert_eq!(text.lines().count(), 100);
//! println!("{}", maze.walls);
//! ```
//!
//! ## Running a solver session
//! ```
//! use micromouse_harness::{run_session, GoalRegion, Outcome, ScriptedLink, SessionConfig, WallGrid};
//!
//! // Every wall standing: the first move crashes
//! let maze = WallGrid::new(10, 10);
//! let mut link = ScriptedLink::new(["mazeWidth", "wallFront", "moveForward"]);
//! let report = run_session(&maze, GoalRegion::centered(10, 10), &mut link, &SessionConfig::default());
//!
//! assert_eq!(link.replies(), ["10", "true", "crash"]);
//! assert!(matches!(report.outcome, Outcome::Crashed { .. }));
//! println!("{report}");
//! ```

pub mod controller;
pub mod goal;
pub mod harness;
pub mod link;
pub mod logging;
pub mod maze_file;
pub mod maze_generator;
pub mod process;
pub mod simulator;
pub mod validator;
pub mod walls;

#[cfg(test)]
mod fixtures;

pub use controller::{generate_connected, GeneratedMaze, GenerationConfig};
pub use goal::GoalRegion;
pub use harness::{run_batch, BatchConfig, BatchSummary};
pub use link::{Received, ScriptedLink, SolverLink};
pub use maze_file::{MazeFileError, MazeLayout};
pub use maze_generator::{GenerationError, MazeGenerator};
pub use process::{ProcessLink, SolverCommand};
pub use simulator::{run_session, Outcome, SessionConfig, SessionReport, Simulator};
pub use validator::is_fully_connected;
pub use walls::{Direction, Point, WallGrid, WallId, WallSource};
