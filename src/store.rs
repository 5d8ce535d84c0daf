//! Freshness-bounded catalog cache.
//!
//! [`CatalogStore`] owns the current [`Snapshot`] and hands out `Arc` clones
//! of it. A snapshot older than the configured TTL is refreshed synchronously
//! on the next read. Once the store has been primed by one successful fetch,
//! refresh failures are logged and the stale snapshot is served instead.
//!
//! ```text
//!  get_catalog()
//!       │
//!       ├── fresh snapshot? ──────────────▶ return it
//!       │
//!       ▼
//!  refresh lock (one fetch at a time)
//!       │
//!       ├── refreshed while waiting? ─────▶ return new snapshot
//!       ├── failed while waiting? ────────▶ stale snapshot / error
//!       ▼
//!  source.fetch() with timeout
//!       ├── ok ──▶ swap Arc, return new
//!       └── err ─▶ stale snapshot if any, else UpstreamUnavailable
//! ```
//!
//! The snapshot pointer sits behind a `std::sync::RwLock` that is only held
//! to clone or replace the `Arc`, never across an await.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::CatalogError;
use crate::models::Snapshot;
use crate::source::{create_source, CatalogSource};

/// Outcome of the most recent failed refresh, shared by callers queued on
/// the refresh lock.
#[derive(Default)]
struct RefreshState {
    last_failure: Option<(Instant, String)>,
}

pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    ttl: Duration,
    fetch_timeout: Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
    /// Bumped by every `invalidate()` call.
    invalidations: AtomicU64,
    /// Value of `invalidations` when the current snapshot's fetch started.
    snapshot_epoch: AtomicU64,
    refresh: Mutex<RefreshState>,
}

/// Cache status reported by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatus {
    pub primed: bool,
    pub records: usize,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_secs: Option<u64>,
    pub stale: bool,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            source,
            ttl,
            fetch_timeout,
            current: RwLock::new(None),
            invalidations: AtomicU64::new(0),
            snapshot_epoch: AtomicU64::new(0),
            refresh: Mutex::new(RefreshState::default()),
        }
    }

    /// Builds a store using `[cache]` and `[source]` settings.
    pub fn from_config(config: &Config, source: Arc<dyn CatalogSource>) -> Self {
        Self::new(source, config.cache.ttl(), config.source.timeout())
    }

    /// Builds a store over the source described by `[source]`.
    pub fn connect(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::from_config(config, create_source(&config.source)?))
    }

    /// Returns the current catalog, refreshing it first if it is stale.
    ///
    /// Fails only when no snapshot has ever been fetched and the fetch
    /// attempted for this call fails.
    pub async fn get_catalog(&self) -> Result<Arc<Snapshot>, CatalogError> {
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        let requested = Instant::now();
        let mut state = self.refresh.lock().await;

        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        // Another caller already tried and failed while we were queued.
        if let Some((failed_at, message)) = &state.last_failure {
            if *failed_at > requested {
                return match self.current() {
                    Some(stale) => Ok(stale),
                    None => Err(CatalogError::UpstreamUnavailable(message.clone())),
                };
            }
        }

        // An invalidation that lands mid-fetch must survive the swap.
        let epoch = self.invalidations.load(Ordering::SeqCst);
        match self.fetch().await {
            Ok(snapshot) => {
                tracing::info!(
                    source = %self.source.describe(),
                    records = snapshot.len(),
                    "catalog refreshed"
                );
                self.swap(snapshot.clone(), epoch);
                state.last_failure = None;
                Ok(snapshot)
            }
            Err(err) => {
                let message = format!("{:#}", err);
                state.last_failure = Some((Instant::now(), message.clone()));
                match self.current() {
                    Some(stale) => {
                        tracing::warn!(
                            source = %self.source.describe(),
                            error = %message,
                            age_secs = stale.fetched_instant().elapsed().as_secs(),
                            "catalog refresh failed, serving stale snapshot"
                        );
                        Ok(stale)
                    }
                    None => {
                        tracing::error!(
                            source = %self.source.describe(),
                            error = %message,
                            "catalog fetch failed with no snapshot to fall back on"
                        );
                        Err(CatalogError::UpstreamUnavailable(message))
                    }
                }
            }
        }
    }

    /// Marks the current snapshot stale so the next read refreshes it.
    pub fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }

    pub fn status(&self) -> CatalogStatus {
        match self.current() {
            Some(snapshot) => CatalogStatus {
                primed: true,
                records: snapshot.len(),
                fetched_at: Some(snapshot.fetched_at()),
                age_secs: Some(snapshot.fetched_instant().elapsed().as_secs()),
                stale: !self.is_fresh(&snapshot),
            },
            None => CatalogStatus {
                primed: false,
                records: 0,
                fetched_at: None,
                age_secs: None,
                stale: true,
            },
        }
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn fresh(&self) -> Option<Arc<Snapshot>> {
        self.current().filter(|s| self.is_fresh(s))
    }

    fn is_fresh(&self, snapshot: &Snapshot) -> bool {
        self.snapshot_epoch.load(Ordering::SeqCst) == self.invalidations.load(Ordering::SeqCst)
            && snapshot.fetched_instant().elapsed() < self.ttl
    }

    fn swap(&self, snapshot: Arc<Snapshot>, epoch: u64) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = Some(snapshot);
        self.snapshot_epoch.store(epoch, Ordering::SeqCst);
    }

    async fn fetch(&self) -> anyhow::Result<Arc<Snapshot>> {
        let exercises = tokio::time::timeout(self.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| anyhow!("fetch timed out after {:?}", self.fetch_timeout))??;
        Ok(Arc::new(Snapshot::new(exercises)))
    }
}
