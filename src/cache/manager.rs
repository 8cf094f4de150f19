//! Snapshot cache gating every access to the upstream
//!
//! Provides a `SnapshotCache` that keeps zero or one snapshot and decides
//! between reuse and refetch from the snapshot's own business timestamp.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use crate::config::CacheSwitch;
use crate::data::{parse_business_timestamp, Snapshot, SnapshotSource, UpstreamError};

/// Minutes a snapshot stays fresh, counted from its business timestamp
pub const CACHE_TTL_MINUTES: i64 = 10;

/// The held snapshot and the business timestamp it was stored under
#[derive(Debug, Clone)]
pub struct CacheSlot {
    pub snapshot: Arc<Snapshot>,
    pub business_timestamp: String,
}

/// Where a snapshot handed out by [`SnapshotCache::read`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Served from the slot without an upstream call
    Cached,
    /// Fetched from the upstream; `changed` is false when the business
    /// timestamp matched the one already held
    Fetched { changed: bool },
}

/// A snapshot together with its origin
#[derive(Debug, Clone)]
pub struct CacheRead {
    pub snapshot: Arc<Snapshot>,
    pub origin: SnapshotOrigin,
}

#[derive(Debug, Default)]
struct SlotState {
    slot: Option<CacheSlot>,
    /// Generation of the most recently completed fetch
    last_generation: u64,
    /// Error of that fetch, handed only to callers that queued behind it
    last_error: Option<UpstreamError>,
}

/// Single-slot cache in front of a [`SnapshotSource`]
///
/// The read-check-fetch-store sequence runs under one async mutex. Callers
/// that queue up behind an in-flight fetch reuse its outcome, success or
/// failure, so N concurrent misses cost one upstream call. A failure is never
/// answered with stale data and is not remembered for later callers.
pub struct SnapshotCache<S> {
    source: S,
    switch: CacheSwitch,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<SlotState>,
    /// Count of finished fetches, successful or not
    completed_fetches: AtomicU64,
}

impl<S: SnapshotSource> SnapshotCache<S> {
    /// Creates an empty cache over `source` using the system clock
    pub fn new(source: S, switch: CacheSwitch) -> Self {
        Self {
            source,
            switch,
            ttl: Duration::minutes(CACHE_TTL_MINUTES),
            clock: Arc::new(SystemClock),
            state: Mutex::new(SlotState::default()),
            completed_fetches: AtomicU64::new(0),
        }
    }

    /// Replaces the clock used for freshness checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying snapshot source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether the held snapshot can be served without an upstream call
    ///
    /// False when caching is disabled, when nothing is held, or when the
    /// business timestamp is at least ten minutes old (or unparseable).
    pub async fn is_fresh(&self) -> bool {
        if !self.switch.is_enabled() {
            debug!("Cache is disabled, skipping cache validation");
            return false;
        }
        let state = self.state.lock().await;
        state
            .slot
            .as_ref()
            .is_some_and(|slot| self.slot_is_fresh(slot))
    }

    /// Returns the current snapshot, fetching it if the slot is not fresh
    pub async fn get_snapshot(&self, context: &str) -> Result<Arc<Snapshot>, UpstreamError> {
        self.read(context).await.map(|read| read.snapshot)
    }

    /// Like [`get_snapshot`](Self::get_snapshot), also reporting whether the
    /// snapshot came from the slot or from a fetch, and whether it was new
    pub async fn read(&self, context: &str) -> Result<CacheRead, UpstreamError> {
        if !self.switch.is_enabled() {
            debug!(context, "Cache is disabled, fetching without storing");
            let snapshot = Arc::new(self.source.fetch().await?);
            return Ok(CacheRead {
                snapshot,
                origin: SnapshotOrigin::Fetched { changed: true },
            });
        }

        let observed = self.completed_fetches.load(Ordering::Acquire);
        let mut state = self.state.lock().await;

        if let Some(slot) = state.slot.as_ref() {
            if self.slot_is_fresh(slot) {
                info!(
                    context,
                    business_timestamp = %slot.business_timestamp,
                    "Returning snapshot from cache"
                );
                return Ok(CacheRead {
                    snapshot: Arc::clone(&slot.snapshot),
                    origin: SnapshotOrigin::Cached,
                });
            }
        }

        // A fetch finished while this caller waited for the lock
        if state.last_generation > observed {
            if let Some(err) = &state.last_error {
                debug!(context, error = %err, "Reusing failure of fetch completed while waiting");
                return Err(err.clone());
            }
            if let Some(slot) = state.slot.as_ref() {
                debug!(context, "Reusing snapshot fetched while waiting");
                return Ok(CacheRead {
                    snapshot: Arc::clone(&slot.snapshot),
                    origin: SnapshotOrigin::Cached,
                });
            }
        }

        info!(context, "Cache stale or empty, fetching fresh snapshot");
        let fetched = self.source.fetch().await;
        state.last_generation = self.completed_fetches.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = match fetched {
            Ok(snapshot) => {
                state.last_error = None;
                Arc::new(snapshot)
            }
            Err(err) => {
                state.last_error = Some(err.clone());
                return Err(err);
            }
        };

        let changed = has_new_data(state.slot.as_ref(), &snapshot);
        if changed {
            info!(
                context,
                business_timestamp = snapshot.business_timestamp(),
                "Snapshot cached"
            );
            state.slot = Some(CacheSlot {
                snapshot: Arc::clone(&snapshot),
                business_timestamp: snapshot.business_timestamp().to_string(),
            });
        } else {
            debug!(
                context,
                business_timestamp = snapshot.business_timestamp(),
                "Business timestamp unchanged, keeping cached snapshot"
            );
        }

        Ok(CacheRead {
            snapshot,
            origin: SnapshotOrigin::Fetched { changed },
        })
    }

    /// Empties the slot so the next read refetches
    pub async fn invalidate(&self) {
        if !self.switch.is_enabled() {
            debug!("Cache is disabled, skipping cache clearing");
            return;
        }
        self.state.lock().await.slot = None;
        info!("Cache cleared");
    }

    /// The snapshot currently held, without any freshness check
    pub async fn cached(&self) -> Option<Arc<Snapshot>> {
        self.state
            .lock()
            .await
            .slot
            .as_ref()
            .map(|slot| Arc::clone(&slot.snapshot))
    }

    fn slot_is_fresh(&self, slot: &CacheSlot) -> bool {
        let Some(business_time) = parse_business_timestamp(&slot.business_timestamp) else {
            debug!(
                business_timestamp = %slot.business_timestamp,
                "Unparseable business timestamp, treating cache as stale"
            );
            return false;
        };
        let age = self.clock.now().signed_duration_since(business_time);
        debug!(age_secs = age.num_seconds(), "Cache business timestamp age");
        age < self.ttl
    }
}

/// True when `snapshot` carries a business timestamp other than the held one
fn has_new_data(slot: Option<&CacheSlot>, snapshot: &Snapshot) -> bool {
    slot.map_or(true, |slot| slot.business_timestamp != snapshot.business_timestamp())
}
