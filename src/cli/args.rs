//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// pgdrop - Drop database buffers and the OS page cache
///
/// Gives benchmarks a cold cache. Dropping the OS page cache runs
/// `sudo /sbin/sysctl -w vm.drop_caches=3` and affects the whole machine.
#[derive(Parser, Debug)]
#[command(name = "pgdrop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PGDROP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync filesystems and drop the OS page cache (machine-wide)
    SystemCache(SystemCacheArgs),

    /// Check that the cache drop command can run on this host
    Status,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the system-cache command
#[derive(Parser, Debug)]
pub struct SystemCacheArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
