//! Solver running as a child process
//!
//! Commands are read from the child's stdout and replies written to its
//! stdin. Lines are pulled off stdout by a reader thread so that waiting for
//! the next command can give up after a timeout. Anything the solver prints
//! to stderr is forwarded to the log.
//!
//! On unix the solver gets its own process group, and stopping it kills the
//! whole group, so helpers started by a wrapper script go with it.

use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::link::{Received, SolverLink};

/// How long a solver may take to exit on its own after closing its output
pub const EXIT_GRACE: Duration = Duration::from_secs(2);

const EXIT_POLL: Duration = Duration::from_millis(20);

/// The solver could not be started
#[derive(Debug, Error)]
#[error("failed to launch solver {}", .program.display())]
pub struct LaunchError {
    pub program: PathBuf,
    #[source]
    pub source: io::Error,
}

/// How to start the solver
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SolverCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl SolverCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        SolverCommand {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Link to a solver child process.
///
/// The child is killed and reaped when the link is dropped, if that has not
/// happened already.
pub struct ProcessLink {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Receiver<io::Result<String>>,
    read_timeout: Option<Duration>,
    reaped: bool,
}

impl ProcessLink {
    /// Start the solver.
    ///
    /// With a `read_timeout`, waiting longer than that for a command makes
    /// the solver count as hung.
    pub fn spawn(
        command: &SolverCommand,
        read_timeout: Option<Duration>,
    ) -> Result<Self, LaunchError> {
        let launch_error = |source: io::Error| LaunchError {
            program: command.program.clone(),
            source,
        };

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let mut child = cmd.spawn().map_err(launch_error)?;
        tracing::debug!(pid = child.id(), program = %command.program.display(), "spawned solver");

        let stdin = child.stdin.take();
        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(launch_error(io::Error::other("solver pipes not captured")));
        };

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            loop {
                let line = match read_line(&mut reader) {
                    Ok(Some(bytes)) => String::from_utf8(bytes).map_err(|_| {
                        io::Error::new(
                            io::ErrorKind::InvalidData,
                            "solver output is not valid UTF-8",
                        )
                    }),
                    Ok(None) => break,
                    Err(err) => Err(err),
                };
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });
        thread::spawn(move || {
            let mut reader = BufReader::new(stderr);
            loop {
                match read_line(&mut reader) {
                    Ok(Some(bytes)) => {
                        tracing::debug!(target: "solver", "{}", String::from_utf8_lossy(&bytes));
                    }
                    Ok(None) => break,
                    Err(err) => {
                        tracing::warn!(%err, "failed to read solver stderr");
                        break;
                    }
                }
            }
        });

        Ok(ProcessLink {
            child,
            stdin,
            lines,
            read_timeout,
            reaped: false,
        })
    }

    fn kill(&mut self) {
        if self.reaped {
            return;
        }
        kill_process_group(&mut self.child);
        match self.child.wait() {
            Ok(status) => tracing::debug!(%status, "solver stopped"),
            Err(err) => tracing::warn!(%err, "failed to reap solver"),
        }
        self.reaped = true;
    }
}

impl SolverLink for ProcessLink {
    fn recv_command(&mut self) -> Received {
        match self.read_timeout {
            Some(timeout) => match self.lines.recv_timeout(timeout) {
                Ok(line) => received(line),
                Err(RecvTimeoutError::Timeout) => Received::Hung,
                Err(RecvTimeoutError::Disconnected) => Received::Closed,
            },
            None => match self.lines.recv() {
                Ok(line) => received(line),
                Err(_) => Received::Closed,
            },
        }
    }

    fn send_reply(&mut self, reply: &str) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "solver stdin closed"))?;
        writeln!(stdin, "{reply}")?;
        stdin.flush()
    }

    fn terminate(&mut self) {
        self.stdin = None;
        self.kill();
    }

    /// Close stdin and give the solver [EXIT_GRACE] to exit before killing it
    fn finish(&mut self) {
        self.stdin = None;
        let deadline = Instant::now() + EXIT_GRACE;
        while !self.reaped && Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!(%status, "solver exited");
                    // Helpers it left behind in its group
                    #[cfg(unix)]
                    kill_process_group(&mut self.child);
                    self.reaped = true;
                }
                Ok(None) => thread::sleep(EXIT_POLL),
                Err(err) => {
                    tracing::warn!(%err, "failed to poll solver");
                    break;
                }
            }
        }
        self.kill();
    }
}

fn received(line: io::Result<String>) -> Received {
    match line {
        Ok(line) => Received::Line(line),
        Err(err) => Received::Error(err.to_string()),
    }
}

/// Next line without its terminator, or `None` at end of output
fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(buf))
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    // The solver leads its own group, so -pid reaches everything it started
    let pgid = child.id() as libc::pid_t;
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        tracing::debug!(err = %io::Error::last_os_error(), "failed to kill solver group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    if let Err(err) = child.kill() {
        tracing::debug!(%err, "failed to kill solver");
    }
}

impl Drop for ProcessLink {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::fixtures::{l_corridor, l_corridor_round_trip};
    use crate::goal::GoalRegion;
    use crate::simulator::{run_session, Outcome, SessionConfig};
    use crate::walls::WallGrid;

    fn shell(script: &str) -> SolverCommand {
        SolverCommand::new("sh").arg("-c").arg(script)
    }

    /// Shell solver that sends each command and waits for its reply
    fn scripted_solver(commands: &[&str]) -> SolverCommand {
        let body = commands
            .iter()
            .map(|cmd| format!("echo '{cmd}'; read reply"))
            .join("\n");
        shell(&body)
    }

    #[test]
    fn solver_process_completes_round_trip() {
        let grid = l_corridor();
        let solver = scripted_solver(&l_corridor_round_trip());
        let mut link = ProcessLink::spawn(&solver, Some(Duration::from_secs(10))).unwrap();
        let report = run_session(
            &grid,
            GoalRegion::centered(10, 10),
            &mut link,
            &SessionConfig::default(),
        );
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.steps, 16);
    }

    #[test]
    fn solver_sees_replies() {
        let grid = l_corridor();
        // Exits early unless the first reply is the maze width
        let solver = shell("echo mazeWidth; read w; [ \"$w\" = 10 ] || exit 1; echo moveForward; read r");
        let mut link = ProcessLink::spawn(&solver, Some(Duration::from_secs(10))).unwrap();
        let report = run_session(
            &grid,
            GoalRegion::centered(10, 10),
            &mut link,
            &SessionConfig::default(),
        );
        assert_eq!(report.outcome, Outcome::NoProgress);
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn silent_solver_is_killed_as_hung() {
        let grid = l_corridor();
        let mut link =
            ProcessLink::spawn(&shell("exec sleep 30"), Some(Duration::from_millis(200))).unwrap();
        let started = Instant::now();
        let report = run_session(
            &grid,
            GoalRegion::centered(10, 10),
            &mut link,
            &SessionConfig::default(),
        );
        assert_eq!(report.outcome, Outcome::Hung);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn crashed_solver_is_killed() {
        let grid = WallGrid::new(10, 10);
        let solver = shell("echo moveForward; read r; exec sleep 30");
        let mut link = ProcessLink::spawn(&solver, Some(Duration::from_secs(10))).unwrap();
        let started = Instant::now();
        let report = run_session(
            &grid,
            GoalRegion::centered(10, 10),
            &mut link,
            &SessionConfig::default(),
        );
        assert!(matches!(report.outcome, Outcome::Crashed { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn garbled_output_is_a_fault() {
        let grid = l_corridor();
        let mut commands = l_corridor_round_trip()
            .iter()
            .map(|cmd| format!("echo '{cmd}'; read reply"))
            .collect_vec();
        commands.push("printf '\\377\\376\\n'; exec sleep 30".to_string());
        let mut link = ProcessLink::spawn(&shell(&commands.join("\n")), Some(Duration::from_secs(10)))
            .unwrap();
        let started = Instant::now();
        let report = run_session(
            &grid,
            GoalRegion::centered(10, 10),
            &mut link,
            &SessionConfig::default(),
        );
        assert!(matches!(report.outcome, Outcome::Fault { .. }), "{report}");
        assert_eq!(report.steps, 16);
        assert!(started.elapsed() < EXIT_GRACE);
    }

    #[test]
    fn binary_stderr_does_not_stop_the_solver() {
        let grid = l_corridor();
        let noise = "printf '\\377\\n' >&2; yes 'debug line' | head -c 200000 >&2";
        let solver = shell(&format!(
            "{noise}\n{}",
            l_corridor_round_trip()
                .iter()
                .map(|cmd| format!("echo '{cmd}'; read reply"))
                .join("\n")
        ));
        let mut link = ProcessLink::spawn(&solver, Some(Duration::from_secs(10))).unwrap();
        let report = run_session(
            &grid,
            GoalRegion::centered(10, 10),
            &mut link,
            &SessionConfig::default(),
        );
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.steps, 16);
    }

    #[test]
    fn helpers_started_by_the_solver_are_killed() {
        let grid = WallGrid::new(10, 10);
        // No exec: the shell stays around as the parent of sleep, which
        // holds on to stdout
        let solver = shell("echo moveForward; read r; sleep 30; true");
        let mut link = ProcessLink::spawn(&solver, Some(Duration::from_secs(5))).unwrap();
        let report = run_session(
            &grid,
            GoalRegion::centered(10, 10),
            &mut link,
            &SessionConfig::default(),
        );
        assert!(matches!(report.outcome, Outcome::Crashed { .. }));
        assert_eq!(link.recv_command(), Received::Closed);
    }

    #[test]
    fn missing_solver_fails_to_launch() {
        let err = ProcessLink::spawn(&SolverCommand::new("/nonexistent/mouse"), None)
            .err()
            .unwrap();
        assert_eq!(err.program, PathBuf::from("/nonexistent/mouse"));
    }
}
