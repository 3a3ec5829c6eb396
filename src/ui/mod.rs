//! Terminal output and prompts
//!
//! Uses `cliclack` when attached to a terminal and plain lines otherwise,
//! so the same commands work from cron jobs and benchmark scripts.

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{note, step_ok_detail, step_warn_hint};
pub use prompts::confirm;
