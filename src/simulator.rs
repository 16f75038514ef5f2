//! Headless stand-in for the maze simulator
//!
//! A solver talks to the simulator with one command per line (`wallFront`,
//! `moveForward`, `turnLeft`, ...) and gets at most one line back. The
//! [Simulator] answers those commands against a fixed maze and follows the
//! mouse around; [run_session] wires it to a [SolverLink] and produces a
//! [SessionReport] for the run.
//!
//! A run is successful when the mouse has entered the goal region and then
//! come back to the start cell by the time the solver stops talking.

use std::fmt;

use crate::goal::GoalRegion;
use crate::link::{Received, SolverLink};
use crate::walls::{Direction, Point, WallSource};

/// Default limit on forward moves before a run is declared stuck
pub const DEFAULT_MAX_STEPS: usize = 5000;

/// Prefixes of drawing commands, which need no reply
const COSMETIC_PREFIXES: [&str; 8] = [
    "setWall",
    "clearWall",
    "setColor",
    "clearColor",
    "clearAllColor",
    "setText",
    "clearText",
    "clearAllText",
];

/// A command from the solver
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Command {
    MazeWidth,
    MazeHeight,
    WallFront,
    WallRight,
    WallLeft,
    /// Any `moveForward` variant; always a single cell
    MoveForward,
    TurnRight,
    TurnLeft,
    WasReset,
    AckReset,
    /// Display-only command such as `setColor 0 0 G`
    Cosmetic,
    Unknown,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "mazeWidth" => Command::MazeWidth,
            "mazeHeight" => Command::MazeHeight,
            "wallFront" => Command::WallFront,
            "wallRight" => Command::WallRight,
            "wallLeft" => Command::WallLeft,
            "turnRight" => Command::TurnRight,
            "turnLeft" => Command::TurnLeft,
            "wasReset" => Command::WasReset,
            "ackReset" => Command::AckReset,
            _ if line.starts_with("moveForward") => Command::MoveForward,
            _ if COSMETIC_PREFIXES.iter().any(|p| line.starts_with(p)) => Command::Cosmetic,
            _ => Command::Unknown,
        }
    }
}

/// A reply line to the solver
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Reply {
    Number(usize),
    Bool(bool),
    Ack,
    Crash,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Number(n) => write!(f, "{n}"),
            Reply::Bool(b) => write!(f, "{b}"),
            Reply::Ack => write!(f, "ack"),
            Reply::Crash => write!(f, "crash"),
        }
    }
}

/// Where a session stands
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SessionState {
    Running,
    /// The mouse drove into a wall or off the grid
    Crashed,
    /// The step budget ran out
    TimedOut,
    /// The solver closed its output
    Exited,
}

/// Initial heading of the mouse
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum StartHeading {
    Fixed(Direction),
    /// Face the first open side of the start cell, checking N, E, S, W
    OpenPassage,
}

/// Per-session settings
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SessionConfig {
    /// Forward moves allowed before `moveForward` is treated as a timeout
    pub max_steps: usize,
    pub start_heading: StartHeading,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_steps: DEFAULT_MAX_STEPS,
            start_heading: StartHeading::Fixed(Direction::North),
        }
    }
}

/// Position and progress of the mouse
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct AgentState {
    pub position: Point,
    pub heading: Direction,
    /// Successful forward moves
    pub steps: usize,
    pub reached_center: bool,
    pub reached_start_after_center: bool,
}

/// How a session ended
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Outcome {
    /// Reached the goal and returned to the start
    Success,
    /// Reached the goal but never made it back
    Partial,
    /// Never reached the goal
    NoProgress,
    Crashed {
        position: Point,
        heading: Direction,
    },
    TimedOut {
        max_steps: usize,
    },
    /// The solver stopped sending commands
    Hung,
    /// The harness itself failed, e.g. could not deliver a reply
    Fault {
        message: String,
    },
}

/// Result of one session
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SessionReport {
    pub outcome: Outcome,
    /// Forward moves made by the mouse
    pub steps: usize,
}

impl SessionReport {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Success => write!(f, "Search and return complete in {} steps", self.steps),
            Outcome::Partial => write!(f, "Reached center but did not return to start"),
            Outcome::NoProgress => write!(f, "Process exited without reaching center"),
            Outcome::Crashed { position, heading } => write!(
                f,
                "Crash: mouse moved into a wall at {position} heading {heading}"
            ),
            Outcome::TimedOut { max_steps } => write!(f, "Timeout: exceeded {max_steps} steps"),
            Outcome::Hung => write!(f, "Hung: solver stopped sending commands"),
            Outcome::Fault { message } => write!(f, "Harness error: {message}"),
        }
    }
}

/// Answers solver commands for one run over a fixed maze
pub struct Simulator<'m, M: WallSource + ?Sized> {
    maze: &'m M,
    goal: GoalRegion,
    max_steps: usize,
    agent: AgentState,
    state: SessionState,
}

impl<'m, M: WallSource + ?Sized> Simulator<'m, M> {
    pub fn new(maze: &'m M, goal: GoalRegion, config: &SessionConfig) -> Self {
        let start = Point::new(0, 0);
        let heading = match config.start_heading {
            StartHeading::Fixed(dir) => dir,
            StartHeading::OpenPassage => Direction::ALL
                .into_iter()
                .find(|&dir| !maze.has_wall(start, dir))
                .unwrap_or(Direction::North),
        };
        Simulator {
            maze,
            goal,
            max_steps: config.max_steps,
            agent: AgentState {
                position: start,
                heading,
                steps: 0,
                reached_center: false,
                reached_start_after_center: false,
            },
            state: SessionState::Running,
        }
    }

    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Apply one command and return the reply to send, if any.
    ///
    /// Commands received after the session has ended are ignored.
    pub fn handle(&mut self, command: Command) -> Option<Reply> {
        if self.state != SessionState::Running {
            return None;
        }
        let heading = self.agent.heading;
        match command {
            Command::MazeWidth => Some(Reply::Number(self.maze.width())),
            Command::MazeHeight => Some(Reply::Number(self.maze.height())),
            Command::WallFront => Some(Reply::Bool(self.sense(heading))),
            Command::WallRight => Some(Reply::Bool(self.sense(heading.turn_right()))),
            Command::WallLeft => Some(Reply::Bool(self.sense(heading.turn_left()))),
            Command::MoveForward => self.move_forward(),
            Command::TurnRight => {
                self.agent.heading = heading.turn_right();
                Some(Reply::Ack)
            }
            Command::TurnLeft => {
                self.agent.heading = heading.turn_left();
                Some(Reply::Ack)
            }
            Command::WasReset => Some(Reply::Bool(false)),
            Command::AckReset => Some(Reply::Ack),
            Command::Cosmetic | Command::Unknown => None,
        }
    }

    fn sense(&self, dir: Direction) -> bool {
        self.maze.has_wall(self.agent.position, dir)
    }

    fn move_forward(&mut self) -> Option<Reply> {
        if self.agent.steps > self.max_steps {
            self.state = SessionState::TimedOut;
            return None;
        }

        let AgentState {
            position, heading, ..
        } = self.agent;
        let next = match self.maze.neighbor(position, heading) {
            Some(next) if !self.maze.has_wall(position, heading) => next,
            _ => {
                tracing::debug!(%position, %heading, "mouse crashed");
                self.state = SessionState::Crashed;
                return Some(Reply::Crash);
            }
        };

        self.agent.position = next;
        self.agent.steps += 1;
        if self.goal.contains(next) && !self.agent.reached_center {
            tracing::debug!(steps = self.agent.steps, "reached center");
            self.agent.reached_center = true;
        } else if next == Point::new(0, 0)
            && self.agent.reached_center
            && !self.agent.reached_start_after_center
        {
            tracing::debug!(steps = self.agent.steps, "returned to start");
            self.agent.reached_start_after_center = true;
        }
        Some(Reply::Ack)
    }

    /// The solver closed its side of the session
    pub fn close(&mut self) {
        if self.state == SessionState::Running {
            self.state = SessionState::Exited;
        }
    }

    /// Report for the session as it stands
    pub fn report(&self) -> SessionReport {
        let outcome = match self.state {
            SessionState::Crashed => Outcome::Crashed {
                position: self.agent.position,
                heading: self.agent.heading,
            },
            SessionState::TimedOut => Outcome::TimedOut {
                max_steps: self.max_steps,
            },
            SessionState::Running | SessionState::Exited => {
                match (
                    self.agent.reached_center,
                    self.agent.reached_start_after_center,
                ) {
                    (true, true) => Outcome::Success,
                    (true, false) => Outcome::Partial,
                    _ => Outcome::NoProgress,
                }
            }
        };
        SessionReport {
            outcome,
            steps: self.agent.steps,
        }
    }
}

/// Run a whole session: serve commands from `link` until the solver exits,
/// crashes, times out or goes silent.
///
/// The link is terminated on every ending except a normal exit, where it is
/// finished instead.
pub fn run_session<M, L>(
    maze: &M,
    goal: GoalRegion,
    link: &mut L,
    config: &SessionConfig,
) -> SessionReport
where
    M: WallSource + ?Sized,
    L: SolverLink + ?Sized,
{
    let mut sim = Simulator::new(maze, goal, config);
    let report = loop {
        let line = match link.recv_command() {
            Received::Line(line) => line,
            Received::Closed => {
                sim.close();
                link.finish();
                break sim.report();
            }
            Received::Hung => {
                link.terminate();
                break SessionReport {
                    outcome: Outcome::Hung,
                    steps: sim.agent().steps,
                };
            }
            Received::Error(message) => {
                tracing::warn!(%message, "unreadable solver output");
                link.terminate();
                break SessionReport {
                    outcome: Outcome::Fault { message },
                    steps: sim.agent().steps,
                };
            }
        };

        let command = Command::parse(&line);
        if command == Command::Unknown {
            tracing::debug!(line = line.trim(), "ignoring unknown command");
        }
        let reply = sim.handle(command);
        tracing::trace!(line = line.trim(), ?reply, "served command");

        if let Some(reply) = reply {
            if let Err(err) = link.send_reply(&reply.to_string()) {
                if sim.state() == SessionState::Running {
                    tracing::warn!(%err, "failed to reply to solver");
                    link.terminate();
                    break SessionReport {
                        outcome: Outcome::Fault {
                            message: err.to_string(),
                        },
                        steps: sim.agent().steps,
                    };
                }
            }
        }
        if sim.state() != SessionState::Running {
            link.terminate();
            break sim.report();
        }
    };
    tracing::info!(steps = report.steps, "{report}");
    report
}
