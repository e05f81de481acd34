//! Async collaborators: where vessels come from and where edits go.
//!
//! [`SqliteBackend`] implements all three traits over a [`Storage`];
//! [`MemoryBackend`] keeps everything in process and can be told to fail
//! writes. [`CachedSource`] puts a [`TtlCache`] in front of any source.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::cache::TtlCache;
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::flags::{FlagColor, FlagKey, FlagSet};
use crate::storage::Storage;
use crate::vessel::{ScheduleField, Vessel};

/// Supplies the current vessel list.
#[async_trait]
pub trait VesselSource: Send + Sync {
    /// Fetch every vessel record.
    async fn fetch_vessels(&self) -> Result<Vec<Vessel>>;

    /// Discard anything cached so the next fetch is fresh.
    async fn invalidate(&self) {}
}

/// Persists user overrides of scheduling fields.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Write one override column. `None` clears it.
    async fn update_override(
        &self,
        vessel_id: i64,
        field: ScheduleField,
        value: Option<String>,
    ) -> Result<()>;
}

/// Persists per-user flags.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// All flags one user has set.
    async fn flags_for_user(&self, user_id: &str) -> Result<FlagSet>;

    /// Create or replace a flag.
    async fn upsert_flag(&self, key: &FlagKey, color: FlagColor) -> Result<()>;

    /// Remove a flag. Removing a missing flag is not an error.
    async fn delete_flag(&self, key: &FlagKey) -> Result<()>;
}

/// All three collaborators backed by one `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    storage: Arc<Mutex<Storage>>,
}

impl SqliteBackend {
    /// Wrap an open storage.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Shared handle to the underlying storage.
    #[must_use]
    pub fn storage(&self) -> Arc<Mutex<Storage>> {
        Arc::clone(&self.storage)
    }
}

#[async_trait]
impl VesselSource for SqliteBackend {
    async fn fetch_vessels(&self) -> Result<Vec<Vessel>> {
        let records = self.storage.lock().await.list_vessels()?;
        debug!(count = records.len(), "Fetched vessels from database");
        Ok(records.into_iter().map(Vessel::from).collect())
    }
}

#[async_trait]
impl OverrideStore for SqliteBackend {
    async fn update_override(
        &self,
        vessel_id: i64,
        field: ScheduleField,
        value: Option<String>,
    ) -> Result<()> {
        self.storage
            .lock()
            .await
            .set_override(vessel_id, field, value.as_deref())
    }
}

#[async_trait]
impl FlagStore for SqliteBackend {
    async fn flags_for_user(&self, user_id: &str) -> Result<FlagSet> {
        let flags = self.storage.lock().await.flags_for_user(user_id)?;
        Ok(flags.into_iter().collect())
    }

    async fn upsert_flag(&self, key: &FlagKey, color: FlagColor) -> Result<()> {
        debug!(resource = %key.resource_path(), %color, "Writing flag");
        self.storage
            .lock()
            .await
            .upsert_flag(key.vessel_id, &key.user_id, color)
    }

    async fn delete_flag(&self, key: &FlagKey) -> Result<()> {
        debug!(resource = %key.resource_path(), "Deleting flag");
        self.storage
            .lock()
            .await
            .delete_flag(key.vessel_id, &key.user_id)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryData {
    vessels: Vec<Vessel>,
    flags: HashMap<FlagKey, FlagColor>,
    fail_writes: bool,
    fetches: usize,
}

/// In-process implementation of all three collaborators.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryBackend {
    /// Create a backend holding `vessels`.
    #[must_use]
    pub fn new(vessels: Vec<Vessel>) -> Self {
        Self {
            data: Arc::new(RwLock::new(MemoryData {
                vessels,
                ..MemoryData::default()
            })),
        }
    }

    /// Make every subsequent write fail (or succeed again).
    pub async fn set_fail_writes(&self, fail: bool) {
        self.data.write().await.fail_writes = fail;
    }

    /// How many times vessels have been fetched.
    pub async fn fetch_count(&self) -> usize {
        self.data.read().await.fetches
    }

    async fn check_writable(&self) -> Result<()> {
        if self.data.read().await.fail_writes {
            return Err(Error::internal("write rejected by backend"));
        }
        Ok(())
    }
}

#[async_trait]
impl VesselSource for MemoryBackend {
    async fn fetch_vessels(&self) -> Result<Vec<Vessel>> {
        let mut data = self.data.write().await;
        data.fetches += 1;
        Ok(data.vessels.clone())
    }
}

#[async_trait]
impl OverrideStore for MemoryBackend {
    async fn update_override(
        &self,
        vessel_id: i64,
        field: ScheduleField,
        value: Option<String>,
    ) -> Result<()> {
        self.check_writable().await?;
        let mut data = self.data.write().await;
        let vessel = data
            .vessels
            .iter_mut()
            .find(|v| v.id == vessel_id)
            .ok_or(Error::VesselNotFound { id: vessel_id })?;
        vessel.schedule.field_mut(field).user = value;
        Ok(())
    }
}

#[async_trait]
impl FlagStore for MemoryBackend {
    async fn flags_for_user(&self, user_id: &str) -> Result<FlagSet> {
        let data = self.data.read().await;
        Ok(data
            .flags
            .iter()
            .filter(|(key, _)| key.user_id == user_id)
            .map(|(key, color)| (key.vessel_id, *color))
            .collect())
    }

    async fn upsert_flag(&self, key: &FlagKey, color: FlagColor) -> Result<()> {
        self.check_writable().await?;
        let mut data = self.data.write().await;
        if color.is_none() {
            data.flags.remove(key);
        } else {
            data.flags.insert(key.clone(), color);
        }
        Ok(())
    }

    async fn delete_flag(&self, key: &FlagKey) -> Result<()> {
        self.check_writable().await?;
        self.data.write().await.flags.remove(key);
        Ok(())
    }
}

/// A vessel source whose results are reused for a fixed time.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<TtlCache<(), Vec<Vessel>>>,
}

impl<S: VesselSource> CachedSource<S> {
    /// Cache `inner` for `ttl` using the system clock.
    #[must_use]
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self::with_clock(inner, ttl, Arc::new(SystemClock))
    }

    /// Cache `inner` for `ttl` using `clock`.
    #[must_use]
    pub fn with_clock(inner: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: Mutex::new(TtlCache::with_clock(ttl, clock)),
        }
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: VesselSource> VesselSource for CachedSource<S> {
    async fn fetch_vessels(&self) -> Result<Vec<Vessel>> {
        let mut cache = self.cache.lock().await;
        if let Some(vessels) = cache.get(&()) {
            debug!(count = vessels.len(), "Serving vessels from cache");
            return Ok(vessels);
        }
        let vessels = self.inner.fetch_vessels().await?;
        cache.insert((), vessels.clone());
        Ok(vessels)
    }

    async fn invalidate(&self) {
        self.cache.lock().await.invalidate_all();
        self.inner.invalidate().await;
    }
}

/// Build the source the CLI reads from: `SQLite`, cached when a TTL is set.
#[must_use]
pub fn vessel_source(backend: SqliteBackend, ttl: Option<Duration>) -> Arc<dyn VesselSource> {
    match ttl {
        Some(ttl) => Arc::new(CachedSource::new(backend, ttl)),
        None => {
            debug!("Vessel cache disabled");
            Arc::new(backend)
        }
    }
}
