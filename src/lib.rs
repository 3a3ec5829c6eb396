//! pgdrop - cold-cache tooling for database benchmarks
//!
//! Two one-shot operations: flush and discard the current database's
//! pages from a host buffer pool, and drop the operating system's page
//! cache through `sudo sysctl`.

pub mod audit;
pub mod buffers;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod syscache;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use buffers::drop_current_db_buffers;
pub use error::{DropError, DropResult, ErrorKind};
pub use syscache::drop_system_cache;
