//! Request/response channel to the solver under test
//!
//! The simulator only ever needs three things from the other side: the next
//! command line, a way to answer it, and a way to stop the solver. Keeping
//! that behind [SolverLink] lets the same session loop drive a real child
//! process or a scripted list of commands.

use std::collections::VecDeque;
use std::io;

/// What came back when waiting for the next command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// One command line, without the line terminator
    Line(String),
    /// The solver closed its output
    Closed,
    /// Nothing arrived within the read timeout
    Hung,
    /// The solver's output could not be read as a line of text
    Error(String),
}

/// Solver side of a session
pub trait SolverLink {
    /// Block until the solver sends its next command
    fn recv_command(&mut self) -> Received;

    /// Send a single reply line
    fn send_reply(&mut self, reply: &str) -> io::Result<()>;

    /// Stop the solver immediately
    fn terminate(&mut self);

    /// The solver has finished talking; let it wind down
    fn finish(&mut self) {
        self.terminate()
    }
}

/// In-process solver replaying a fixed list of commands.
///
/// Replies are recorded for inspection. Once the script runs out the link
/// reports [Received::Closed], or [Received::Hung] if built with
/// [ScriptedLink::hang_at_end].
#[derive(Debug, Clone, Default)]
pub struct ScriptedLink {
    commands: VecDeque<String>,
    replies: Vec<String>,
    hang_at_end: bool,
    terminated: bool,
}

impl ScriptedLink {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedLink {
            commands: commands.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Go silent instead of closing once the script is exhausted
    pub fn hang_at_end(mut self) -> Self {
        self.hang_at_end = true;
        self
    }

    /// Replies received so far, in order
    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    /// Commands not yet consumed
    pub fn remaining(&self) -> usize {
        self.commands.len()
    }

    pub fn was_terminated(&self) -> bool {
        self.terminated
    }
}

impl SolverLink for ScriptedLink {
    fn recv_command(&mut self) -> Received {
        match self.commands.pop_front() {
            Some(line) => Received::Line(line),
            None if self.hang_at_end => Received::Hung,
            None => Received::Closed,
        }
    }

    fn send_reply(&mut self, reply: &str) -> io::Result<()> {
        self.replies.push(reply.to_string());
        Ok(())
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }

    fn finish(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_then_closes() {
        let mut link = ScriptedLink::new(["mazeWidth", "turnLeft"]);
        assert_eq!(link.recv_command(), Received::Line("mazeWidth".into()));
        link.send_reply("10").unwrap();
        assert_eq!(link.recv_command(), Received::Line("turnLeft".into()));
        assert_eq!(link.recv_command(), Received::Closed);
        assert_eq!(link.replies(), ["10"]);
        assert!(!link.was_terminated());
    }

    #[test]
    fn hangs_when_asked() {
        let mut link = ScriptedLink::new(Vec::<String>::new()).hang_at_end();
        assert_eq!(link.recv_command(), Received::Hung);
        link.terminate();
        assert!(link.was_terminated());
    }
}
