use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, error, info, warn};
use tokio::sync::{Mutex, RwLock};

use crate::config::ResolverConfig;
use crate::errors::{Recovery, ResolverError};
use crate::models::{ListingSnapshot, Market};
use crate::source::{ListingSource, RefreshReport};

use super::store::SnapshotFile;

/// Lifecycle state of the listing cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No snapshot has been loaded or built yet.
    Empty,
    /// The snapshot is younger than the staleness threshold.
    Fresh,
    /// The snapshot is older than the staleness threshold. It is still
    /// served while a refresh is attempted.
    Stale,
}

/// Bookkeeping owned by whoever holds the refresh lock.
#[derive(Debug, Default)]
struct RefreshState {
    last_failure: Option<Instant>,
}

/// Holds the current listing snapshot and refreshes it from the source.
///
/// Readers get an `Arc` to an immutable snapshot; a refresh builds a new
/// one and swaps the pointer. At most one refresh runs at a time.
pub struct ListingCache {
    source: ListingSource,
    store: Option<SnapshotFile>,
    staleness: Duration,
    retry_cooldown: Duration,
    current: RwLock<Option<Arc<ListingSnapshot>>>,
    refresh_lock: Mutex<RefreshState>,
    last_report: RwLock<Option<RefreshReport>>,
}

impl ListingCache {
    /// Opens the cache persisted at `config.cache_path`.
    ///
    /// A missing, unreadable or corrupt file leaves the cache `Empty`; the
    /// first access then refreshes from the source.
    pub fn open(source: ListingSource, config: &ResolverConfig) -> Self {
        let store = SnapshotFile::new(&config.cache_path);
        let initial = match store.load() {
            Ok(Some(snapshot)) if !snapshot.is_empty() => Some(Arc::new(snapshot)),
            Ok(Some(_)) => {
                warn!(
                    "Listing cache at {} holds no records, ignoring it",
                    store.path().display()
                );
                None
            }
            Ok(None) => None,
            Err(e) => match e.recovery() {
                Recovery::Rebuild => {
                    warn!("Discarding listing cache: {}", e);
                    if let Err(remove_err) = std::fs::remove_file(store.path()) {
                        warn!(
                            "Failed to remove {}: {}",
                            store.path().display(),
                            remove_err
                        );
                    }
                    None
                }
                _ => {
                    warn!("Listing cache unreadable, starting empty: {}", e);
                    None
                }
            },
        };
        Self::build(source, Some(store), config, initial)
    }

    /// A cache that never touches the filesystem.
    pub fn in_memory(source: ListingSource, config: &ResolverConfig) -> Self {
        Self::build(source, None, config, None)
    }

    fn build(
        source: ListingSource,
        store: Option<SnapshotFile>,
        config: &ResolverConfig,
        initial: Option<Arc<ListingSnapshot>>,
    ) -> Self {
        Self {
            source,
            store,
            staleness: config.staleness,
            retry_cooldown: config.retry_cooldown,
            current: RwLock::new(initial),
            refresh_lock: Mutex::new(RefreshState::default()),
            last_report: RwLock::new(None),
        }
    }

    /// The snapshot currently served, without refreshing.
    pub async fn snapshot(&self) -> Option<Arc<ListingSnapshot>> {
        self.current.read().await.clone()
    }

    pub async fn state(&self) -> CacheState {
        self.state_at(Utc::now()).await
    }

    /// State as seen at `now`.
    pub async fn state_at(&self, now: DateTime<Utc>) -> CacheState {
        match self.current.read().await.as_deref() {
            None => CacheState::Empty,
            Some(snapshot) if snapshot.is_older_than(self.staleness, now) => CacheState::Stale,
            Some(_) => CacheState::Fresh,
        }
    }

    pub async fn is_stale(&self) -> bool {
        self.state().await == CacheState::Stale
    }

    /// Diagnostics of the most recent refresh attempt.
    pub async fn last_report(&self) -> Option<RefreshReport> {
        self.last_report.read().await.clone()
    }

    /// Fetches every universe and publishes a new snapshot.
    ///
    /// Waits for a refresh already in progress and ignores the retry
    /// cooldown. Fails with `RefreshFailed` when no universe produced rows;
    /// the previous snapshot then stays in service.
    pub async fn refresh(&self) -> Result<Arc<ListingSnapshot>, ResolverError> {
        let mut state = self.refresh_lock.lock().await;
        self.refresh_locked(&mut state).await
    }

    /// Returns a snapshot fit for matching, refreshing first when needed.
    ///
    /// - `Fresh`: served as is.
    /// - `Stale`: one caller refreshes; concurrent callers get the stale
    ///   snapshot instead of waiting.
    /// - `Empty`: callers wait for the refresh, so the first snapshot is
    ///   seen by everyone who asked for it.
    ///
    /// After a failed refresh no lazy refresh is attempted until the retry
    /// cooldown elapses.
    pub async fn ensure_current(&self) -> Option<Arc<ListingSnapshot>> {
        match self.state().await {
            CacheState::Fresh => {}
            CacheState::Stale => {
                let Ok(mut state) = self.refresh_lock.try_lock() else {
                    debug!("Listing refresh in progress, serving stale snapshot");
                    return self.snapshot().await;
                };
                if self.state().await == CacheState::Stale && !self.cooling_down(&state) {
                    if let Err(e) = self.refresh_locked(&mut state).await {
                        warn!("Listing refresh failed, serving stale snapshot: {}", e);
                    }
                }
            }
            CacheState::Empty => {
                let mut state = self.refresh_lock.lock().await;
                if self.state().await == CacheState::Empty && !self.cooling_down(&state) {
                    if let Err(e) = self.refresh_locked(&mut state).await {
                        error!("Listing refresh failed, no listings available: {}", e);
                    }
                }
            }
        }
        self.snapshot().await
    }

    fn cooling_down(&self, state: &RefreshState) -> bool {
        state
            .last_failure
            .is_some_and(|failed_at| failed_at.elapsed() < self.retry_cooldown)
    }

    async fn refresh_locked(
        &self,
        state: &mut RefreshState,
    ) -> Result<Arc<ListingSnapshot>, ResolverError> {
        info!("Refreshing listing index");
        let (records, report) = self.source.fetch_all().await;
        *self.last_report.write().await = Some(report);

        if records.is_empty() {
            state.last_failure = Some(Instant::now());
            return Err(ResolverError::RefreshFailed);
        }

        let snapshot = Arc::new(ListingSnapshot::build(
            records,
            Utc::now().trunc_subsecs(6),
        ));
        info!(
            "Listing index rebuilt: {} {} + {} {} instruments",
            snapshot.count_for(Market::Domestic),
            Market::Domestic,
            snapshot.count_for(Market::Offshore),
            Market::Offshore
        );

        if let Some(store) = self.store.clone() {
            let path = store.path().display().to_string();
            let to_save = Arc::clone(&snapshot);
            match tokio::task::spawn_blocking(move || store.save(&to_save)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Failed to persist listing cache to {}: {}", path, e),
                Err(e) => warn!("Listing cache writer for {} did not finish: {}", path, e),
            }
        }

        *self.current.write().await = Some(Arc::clone(&snapshot));
        state.last_failure = None;
        Ok(snapshot)
    }
}
