//! Scoped external-command execution
//!
//! A [`CommandRunner`] runs one program to completion and reports how it
//! terminated. The child is always reaped before `run` returns, and also
//! when the awaiting future is dropped.

mod system;

pub(crate) use system::classify_spawn_error;
pub use system::SystemRunner;

use crate::error::DropResult;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Exit status reported when the program could not be executed in the child
pub const EXEC_FAILURE_CODE: i32 = libc::EXIT_FAILURE;

/// A single command line to run in a child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Absolute path of the program
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Issue an OS-wide sync(2) inside the child before executing the program
    pub sync_filesystems: bool,
}

impl CommandSpec {
    /// Create a command spec for a program with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            sync_filesystems: false,
        }
    }

    /// Append arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Request a filesystem sync inside the child before exec
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync_filesystems = sync;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a child process terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "termination", content = "value", rename_all = "snake_case")]
pub enum ExitOutcome {
    /// Normal termination with an exit code
    Exited(i32),
    /// Terminated by a signal
    Signaled(i32),
}

impl ExitOutcome {
    /// Exit code, if the process terminated normally
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Signaled(_) => None,
        }
    }

    pub fn terminated_by_signal(&self) -> bool {
        matches!(self, Self::Signaled(_))
    }

    /// Normal termination with status exactly 0
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "return code {}", code),
            Self::Signaled(signal) => write!(f, "signal {}", signal),
        }
    }
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }

        Self::Exited(-1)
    }
}

/// Runs a command in an isolated child process and waits for it
///
/// Implementations must:
/// - return `Err(DropError::SpawnFailed)` only when no child could be
///   created, before any side effect of the command;
/// - report a program that exists but cannot be executed, or does not
///   exist, as `ExitOutcome::Exited(EXEC_FAILURE_CODE)`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion
    async fn run(&self, spec: &CommandSpec) -> DropResult<ExitOutcome>;

    /// Human-readable runner name
    fn runner_name(&self) -> &'static str;
}
