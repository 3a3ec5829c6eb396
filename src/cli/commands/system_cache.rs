//! System-cache command - sync filesystems and drop the OS page cache

use crate::audit::AuditLog;
use crate::cli::args::SystemCacheArgs;
use crate::config::Config;
use crate::error::{DropError, DropResult};
use crate::exec::{CommandRunner, SystemRunner};
use crate::syscache::{elevated_command, SystemCacheDropper};
use crate::ui::{self, UiContext};
use std::time::Instant;

const MACHINE_WIDE_NOTE: &str = "Dropping the OS page cache affects every process on this host, \
    not only the database. Expect a burst of disk reads afterwards.";

/// Execute the system-cache command
pub async fn execute(args: SystemCacheArgs, config: &Config) -> DropResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes || !config.system_cache.confirm);
    let dropper = SystemCacheDropper::new(SystemRunner::new());
    let audit = AuditLog::new(config);

    run(&ctx, &dropper, &audit).await
}

async fn run<R: CommandRunner>(
    ctx: &UiContext,
    dropper: &SystemCacheDropper<R>,
    audit: &AuditLog,
) -> DropResult<()> {
    ui::note(ctx, "Machine-wide", MACHINE_WIDE_NOTE);

    if !ui::confirm(ctx, "Sync filesystems and drop the OS page cache?", false).await? {
        return Err(DropError::Declined);
    }

    let command = elevated_command().to_string();
    let started = Instant::now();
    let result = dropper.drop_system_cache().await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            audit
                .log(
                    "system_cache.dropped",
                    &serde_json::json!({
                        "command": command,
                        "runner": dropper.runner().runner_name(),
                        "elapsed_ms": elapsed_ms,
                    }),
                )
                .await;
            ui::step_ok_detail(ctx, "Dropped system cache", &command);
            Ok(())
        }
        Err(e) => {
            let outcome = match &e {
                DropError::SystemCacheDrop { outcome, .. } => serde_json::to_value(outcome).ok(),
                _ => None,
            };
            audit
                .log(
                    "system_cache.failed",
                    &serde_json::json!({
                        "command": command,
                        "code": e.code(),
                        "error": e.to_string(),
                        "outcome": outcome,
                        "elapsed_ms": elapsed_ms,
                    }),
                )
                .await;
            Err(e)
        }
    }
}
