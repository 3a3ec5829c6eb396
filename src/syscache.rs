//! Operating system page cache dropping
//!
//! Runs `sudo sysctl -w vm.drop_caches=3` in a child process after a
//! filesystem-wide sync. The effect is machine-wide: every process on the
//! host loses its page cache, dentries and inodes, not just this one.
//!
//! Permissions are never checked up front. The command is attempted and a
//! non-zero status is reported together with the sudo rule it needs.

use crate::error::{DropError, DropResult};
use crate::exec::{CommandRunner, CommandSpec, SystemRunner};
use tracing::info;

/// Privilege wrapper
pub const SUDO: &str = "/usr/bin/sudo";

/// Kernel tunable utility
pub const SYSCTL: &str = "/sbin/sysctl";

/// Drop page cache plus reclaimable slab objects
pub const DROP_CACHES_SETTING: &str = "vm.drop_caches=3";

/// Command line run under sudo
pub fn elevated_command() -> CommandSpec {
    CommandSpec::new(SYSCTL).args(["-w", DROP_CACHES_SETTING])
}

/// Full command line, including the privilege wrapper and the pre-exec sync
pub fn drop_caches_command() -> CommandSpec {
    let elevated = elevated_command();
    CommandSpec::new(SUDO)
        .args(std::iter::once(elevated.program).chain(elevated.args))
        .with_sync(true)
}

/// Drops the OS page cache through a [`CommandRunner`]
pub struct SystemCacheDropper<R = SystemRunner> {
    runner: R,
}

impl<R: CommandRunner> SystemCacheDropper<R> {
    /// Create a dropper using the given runner
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Sync filesystems and drop the OS page cache
    ///
    /// Blocks until the child terminates; there is no timeout. Fails with
    /// an environment error if the child cannot be created, and with an
    /// operation error carrying the exit status otherwise.
    pub async fn drop_system_cache(&self) -> DropResult<()> {
        let spec = drop_caches_command();
        let outcome = self.runner.run(&spec).await?;

        if outcome.success() {
            info!("Dropped system cache successfully");
            Ok(())
        } else {
            Err(DropError::SystemCacheDrop {
                command: elevated_command().to_string(),
                outcome,
            })
        }
    }

    /// Runner used to execute the command
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl Default for SystemCacheDropper<SystemRunner> {
    fn default() -> Self {
        Self::new(SystemRunner::new())
    }
}

/// Sync filesystems and drop the OS page cache using real child processes
pub async fn drop_system_cache() -> DropResult<()> {
    SystemCacheDropper::<SystemRunner>::default()
        .drop_system_cache()
        .await
}
