//! In-memory host for tests and dry runs.

use crate::buffers::{BufferCache, DatabaseId, Session};
use crate::error::{DropError, DropResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

/// Page number within a database
pub type PageNo = u32;

/// Primitive calls recorded by [`InMemoryBufferPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOp {
    Flush(DatabaseId),
    Drop(DatabaseId),
}

#[derive(Default)]
struct PoolState {
    /// Cached frames and their dirty flag
    frames: BTreeMap<(DatabaseId, PageNo), bool>,
    /// Pages that reached durable storage
    durable: BTreeSet<(DatabaseId, PageNo)>,
    journal: Vec<PoolOp>,
    flush_faults: HashMap<DatabaseId, String>,
    drop_faults: HashMap<DatabaseId, String>,
}

/// Host buffer cache kept entirely in memory
///
/// Frames live in a map behind a [`RwLock`], so the [`BufferCache`]
/// methods work on `&self`. Every primitive call is journaled, and a
/// failure can be injected per database to exercise error paths. There is
/// no capacity and no eviction policy.
///
/// # Examples
///
/// ```
/// use pgdrop::buffers::{drop_current_db_buffers, DatabaseId, InMemoryBufferPool, StaticSession};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = DatabaseId::new(16384);
/// let pool = InMemoryBufferPool::with_pages([(db, 0, true), (db, 1, false)]);
///
/// drop_current_db_buffers(&StaticSession::new(db), &pool).await?;
/// assert_eq!(pool.resident_pages(db).await, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct InMemoryBufferPool {
    state: RwLock<PoolState>,
}

impl InMemoryBufferPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool pre-populated with `(database, page, dirty)` frames
    pub fn with_pages(pages: impl IntoIterator<Item = (DatabaseId, PageNo, bool)>) -> Self {
        let frames = pages
            .into_iter()
            .map(|(database, page, dirty)| ((database, page), dirty))
            .collect();
        Self {
            state: RwLock::new(PoolState {
                frames,
                ..PoolState::default()
            }),
        }
    }

    /// Cache a page, replacing any existing frame
    pub async fn cache_page(&self, database: DatabaseId, page: PageNo, dirty: bool) {
        self.state.write().await.frames.insert((database, page), dirty);
    }

    /// Number of cached pages belonging to `database`
    pub async fn resident_pages(&self, database: DatabaseId) -> usize {
        self.state
            .read()
            .await
            .frames
            .keys()
            .filter(|(db, _)| *db == database)
            .count()
    }

    /// Number of cached, not yet flushed pages belonging to `database`
    pub async fn dirty_pages(&self, database: DatabaseId) -> usize {
        self.state
            .read()
            .await
            .frames
            .iter()
            .filter(|((db, _), dirty)| *db == database && **dirty)
            .count()
    }

    /// Whether a page has been written to durable storage
    pub async fn is_durable(&self, database: DatabaseId, page: PageNo) -> bool {
        self.state.read().await.durable.contains(&(database, page))
    }

    /// Primitive calls in the order they were made
    pub async fn operations(&self) -> Vec<PoolOp> {
        self.state.read().await.journal.clone()
    }

    /// Make the next flushes of `database` fail with `reason`
    pub async fn fail_flush_for(&self, database: DatabaseId, reason: impl Into<String>) {
        self.state
            .write()
            .await
            .flush_faults
            .insert(database, reason.into());
    }

    /// Make the next drops of `database` fail with `reason`
    pub async fn fail_drop_for(&self, database: DatabaseId, reason: impl Into<String>) {
        self.state
            .write()
            .await
            .drop_faults
            .insert(database, reason.into());
    }
}

#[async_trait]
impl BufferCache for InMemoryBufferPool {
    async fn flush_database(&self, database: DatabaseId) -> DropResult<()> {
        let mut state = self.state.write().await;
        state.journal.push(PoolOp::Flush(database));

        if let Some(reason) = state.flush_faults.get(&database) {
            return Err(DropError::FlushFailed {
                database,
                reason: reason.clone(),
            });
        }

        let PoolState { frames, durable, .. } = &mut *state;
        for ((db, page), dirty) in frames.iter_mut() {
            if *db == database && *dirty {
                durable.insert((*db, *page));
                *dirty = false;
            }
        }
        Ok(())
    }

    async fn drop_database(&self, database: DatabaseId) -> DropResult<()> {
        let mut state = self.state.write().await;
        state.journal.push(PoolOp::Drop(database));

        if let Some(reason) = state.drop_faults.get(&database) {
            return Err(DropError::EvictFailed {
                database,
                reason: reason.clone(),
            });
        }

        state.frames.retain(|(db, _), _| *db != database);
        Ok(())
    }
}

/// Session permanently connected to one database
#[derive(Debug, Clone, Copy)]
pub struct StaticSession {
    database: DatabaseId,
}

impl StaticSession {
    pub fn new(database: DatabaseId) -> Self {
        Self { database }
    }
}

impl Session for StaticSession {
    fn current_database(&self) -> DatabaseId {
        self.database
    }
}
