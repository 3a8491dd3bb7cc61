//! Supervised process model.
//!
//! `ProcessSpec` describes what to launch; `ExitState` is the last
//! observed lifecycle state of the unit, published by its supervisor.

use std::process::{ExitStatus, Stdio};

use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};

/// Program and arguments for one supervised unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Executable path.
    pub program: String,
    /// Argument vector (excluding argv[0]).
    pub args: Vec<String>,
}

impl ProcessSpec {
    /// Create a spec from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Launch the process.
    ///
    /// stdout and stderr both go to our stderr so container logs keep
    /// stdout free. The child is killed if its handle is dropped.
    pub fn spawn(&self) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(std::io::stderr())
            .stderr(std::io::stderr())
            .kill_on_drop(true)
            .spawn()
    }
}

impl std::fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Last observed state of a supervised process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ExitState {
    /// No instance has been launched yet.
    #[default]
    NotStarted,
    /// An instance is currently running.
    Running,
    /// The last instance exited on its own; `None` when no code was reported.
    Exited(Option<i32>),
    /// The last instance was terminated by a signal or by shutdown.
    Killed,
}

impl ExitState {
    /// Classify a reaped child's status.
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::Exited(Some(code)),
            None => Self::Killed,
        }
    }

    /// Whether the last instance exited on its own.
    ///
    /// A signalled instance (including the shutdown kill) does not count.
    pub const fn has_exited(self) -> bool {
        matches!(self, Self::Exited(_))
    }
}

impl std::fmt::Display for ExitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Running => write!(f, "running"),
            Self::Exited(Some(code)) => write!(f, "exited ({code})"),
            Self::Exited(None) => write!(f, "exited"),
            Self::Killed => write!(f, "killed"),
        }
    }
}
