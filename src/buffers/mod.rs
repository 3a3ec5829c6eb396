//! Shared buffer dropping for the current database
//!
//! The host engine owns the buffer pool. This module only sequences the
//! host's own primitives: flush every dirty page of the caller's database,
//! then discard every cached page of that database.

pub mod memory;

pub use memory::{InMemoryBufferPool, StaticSession};

use crate::error::DropResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Opaque identifier of a database inside the host engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseId(u32);

impl DatabaseId {
    pub const fn new(oid: u32) -> Self {
        Self(oid)
    }

    pub const fn oid(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The calling session, as seen by the host
pub trait Session: Send + Sync {
    /// Database the session is currently connected to
    fn current_database(&self) -> DatabaseId;
}

/// Buffer pool primitives provided by the host engine
///
/// Ordering between a flush and a later drop, and consistency with
/// concurrent writers, is the implementation's responsibility.
#[async_trait]
pub trait BufferCache: Send + Sync {
    /// Write every dirty page of `database` to durable storage
    async fn flush_database(&self, database: DatabaseId) -> DropResult<()>;

    /// Discard every cached page of `database`, clean or dirty
    async fn drop_database(&self, database: DatabaseId) -> DropResult<()>;
}

/// Flush, then drop, all shared buffers of the session's current database
///
/// A flush failure is returned as-is and the drop step is not attempted.
/// Pages of other databases are left cached.
pub async fn drop_current_db_buffers(
    session: &dyn Session,
    cache: &dyn BufferCache,
) -> DropResult<()> {
    let database = session.current_database();

    debug!(database = %database, "Flushing database buffers");
    cache.flush_database(database).await?;

    debug!(database = %database, "Dropping database buffers");
    cache.drop_database(database).await?;

    info!(database = %database, "Dropped shared buffers for the current database");
    Ok(())
}
