//! Command runner backed by real child processes

use crate::error::{DropError, DropResult};
use crate::exec::{CommandRunner, CommandSpec, ExitOutcome, EXEC_FAILURE_CODE};
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs commands as child processes of the current process
///
/// Standard streams are inherited so the child's own diagnostics reach
/// the operator.
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }

    fn build(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            if spec.sync_filesystems {
                // SAFETY: sync(2) takes no arguments and does not allocate.
                unsafe {
                    cmd.pre_exec(sync_filesystems);
                }
            }
        }

        cmd
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn sync_filesystems() -> io::Result<()> {
    // sync(2) reports no errors.
    unsafe { libc::sync() };
    Ok(())
}

/// Errors returned before or by fork(2); no child exists afterwards
const FORK_ERRNOS: &[i32] = &[
    libc::EAGAIN,
    libc::ENOMEM,
    libc::ENOSYS,
    libc::EMFILE,
    libc::ENFILE,
];

/// Map a spawn error to the caller-visible result
///
/// Errors raised before a child exists are `SpawnFailed`. Every other OS
/// error is the child's execve(2) failing after fork, which is reported
/// like a child that exited with `EXEC_FAILURE_CODE`.
pub(crate) fn classify_spawn_error(spec: &CommandSpec, err: io::Error) -> DropResult<ExitOutcome> {
    match err.raw_os_error() {
        Some(errno) if !FORK_ERRNOS.contains(&errno) => {
            warn!("Could not execute {}: {}", spec.program, err);
            Ok(ExitOutcome::Exited(EXEC_FAILURE_CODE))
        }
        _ => Err(DropError::spawn_failed(spec.to_string(), err)),
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> DropResult<ExitOutcome> {
        debug!("Executing: {}", spec);

        let status = match Self::build(spec).status().await {
            Ok(status) => status,
            Err(e) => return classify_spawn_error(spec, e),
        };

        let outcome = ExitOutcome::from(status);
        debug!("{} finished with {}", spec.program, outcome);
        Ok(outcome)
    }

    fn runner_name(&self) -> &'static str {
        "system"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::Duration;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("/bin/sh").args(["-c", script])
    }

    #[tokio::test]
    async fn reports_zero_exit() {
        let outcome = SystemRunner::new().run(&sh("exit 0")).await.unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(0));
        assert!(outcome.success());
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        let outcome = SystemRunner::new().run(&sh("exit 7")).await.unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(7));
    }

    #[tokio::test]
    async fn reports_signal_termination() {
        let outcome = SystemRunner::new().run(&sh("kill -9 $$")).await.unwrap();
        assert_eq!(outcome, ExitOutcome::Signaled(9));
        assert!(outcome.terminated_by_signal());
    }

    #[tokio::test]
    async fn missing_program_exits_with_failure_code() {
        let spec = CommandSpec::new("/nonexistent/pgdrop-test-binary");
        let outcome = SystemRunner::new().run(&spec).await.unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(EXEC_FAILURE_CODE));
    }

    #[tokio::test]
    async fn non_executable_program_exits_with_failure_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("not-executable");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();

        let spec = CommandSpec::new(path.to_string_lossy());
        let outcome = SystemRunner::new().run(&spec).await.unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(EXEC_FAILURE_CODE));
    }

    #[tokio::test]
    async fn not_a_directory_exits_with_failure_code() {
        // ENOTDIR comes from execve in the already-forked child
        let spec = CommandSpec::new("/etc/passwd/sysctl").with_sync(true);
        let outcome = SystemRunner::new().run(&spec).await.unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(EXEC_FAILURE_CODE));
    }

    #[tokio::test]
    async fn symlink_loop_exits_with_failure_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let link = dir.path().join("loop");
        std::os::unix::fs::symlink(&link, &link).unwrap();

        let spec = CommandSpec::new(link.to_string_lossy()).with_sync(true);
        let outcome = SystemRunner::new().run(&spec).await.unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(EXEC_FAILURE_CODE));
    }

    #[test]
    fn fork_errors_are_environment_errors() {
        let spec = CommandSpec::new("/usr/bin/sudo");
        for errno in [libc::EAGAIN, libc::ENOMEM] {
            let err = classify_spawn_error(&spec, io::Error::from_raw_os_error(errno)).unwrap_err();
            assert!(matches!(err, DropError::SpawnFailed { .. }));
            assert_eq!(err.kind(), ErrorKind::Environment);
            assert!(err.to_string().contains("Failed to fork"));
        }
    }

    #[test]
    fn exec_errors_are_exit_failures() {
        let spec = CommandSpec::new("/usr/bin/sudo");
        for errno in [
            libc::ENOENT,
            libc::EACCES,
            libc::ENOEXEC,
            libc::ENOTDIR,
            libc::ELOOP,
            libc::ETXTBSY,
            libc::E2BIG,
        ] {
            let outcome = classify_spawn_error(&spec, io::Error::from_raw_os_error(errno)).unwrap();
            assert_eq!(outcome, ExitOutcome::Exited(EXEC_FAILURE_CODE), "errno {}", errno);
        }
    }

    #[test]
    fn errors_without_errno_are_environment_errors() {
        let spec = CommandSpec::new("/usr/bin/sudo");
        let err = io::Error::new(io::ErrorKind::InvalidInput, "nul byte found in provided data");
        let err = classify_spawn_error(&spec, err).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Environment);
    }

    #[tokio::test]
    async fn sync_before_exec_still_runs_program() {
        let outcome = SystemRunner::new()
            .run(&sh("exit 5").with_sync(true))
            .await
            .unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(5));
    }

    #[tokio::test]
    async fn hung_command_blocks_caller() {
        let runner = SystemRunner::new();
        let spec = sh("sleep 30");

        // There is no timeout: the call only ends when the child does.
        let result = tokio::time::timeout(Duration::from_millis(300), runner.run(&spec)).await;
        assert!(result.is_err());
    }
}
