//! Status command - check prerequisites for dropping the OS page cache
//!
//! Only reports what is installed. Whether sudo will actually allow the
//! command is discovered by running it.

use crate::config::{Config, ConfigManager};
use crate::error::DropResult;
use crate::syscache::{SUDO, SYSCTL};
use console::{style, Emoji};
use std::path::Path;

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

const DROP_CACHES_PROC: &str = "/proc/sys/vm/drop_caches";

/// Execute the status command
pub async fn execute(config: &Config) -> DropResult<()> {
    println!("{}", style("pgdrop Status").bold().cyan());
    println!();

    let mut all_ok = true;

    println!("{}", style("Platform:").bold());
    if std::env::consts::OS == "linux" {
        println!("  {} Detected: Linux", CHECK);
    } else {
        println!(
            "  {} {} - vm.drop_caches is Linux only",
            CROSS,
            style(std::env::consts::OS).red()
        );
        all_ok = false;
    }

    println!();
    println!("{}", style("Commands:").bold());
    all_ok &= check_executable("sudo", SUDO, "install sudo");
    all_ok &= check_executable("sysctl", SYSCTL, "install procps");
    all_ok &= check_exists("drop_caches", DROP_CACHES_PROC);

    println!();
    println!("{}", style("Privileges:").bold());
    if is_root() {
        println!("  {} Running as root", CHECK);
    } else {
        println!(
            "  {} {} - sudo must allow `{} -w vm.drop_caches=3` without a password",
            WARN,
            style("Not root").yellow(),
            SYSCTL
        );
    }

    println!();
    println!("{}", style("Audit:").bold());
    if config.general.audit_log {
        println!(
            "  {} Logging to {}",
            CHECK,
            ConfigManager::audit_log_path().display()
        );
    } else {
        println!("  {} {}", WARN, style("Disabled").yellow());
    }

    println!();
    if all_ok {
        println!("{}", style("All critical checks passed").green().bold());
    } else {
        println!(
            "{}",
            style("Some checks failed - see above for details").yellow().bold()
        );
    }

    Ok(())
}

fn check_executable(name: &str, path: &str, install_hint: &str) -> bool {
    if is_executable(Path::new(path)) {
        println!("  {} {} ({})", CHECK, name, style(path).dim());
        true
    } else {
        println!(
            "  {} {} - {} not found, {}",
            CROSS,
            style(name).red(),
            path,
            install_hint
        );
        false
    }
}

fn check_exists(name: &str, path: &str) -> bool {
    if Path::new(path).exists() {
        println!("  {} {} ({})", CHECK, name, style(path).dim());
        true
    } else {
        println!("  {} {} - {} not found", CROSS, style(name).red(), path);
        false
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(unix)]
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}
