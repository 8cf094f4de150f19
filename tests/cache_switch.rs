//! `MCP_CACHE_DISABLED` is consulted on every cache operation
//!
//! Kept in its own test binary with a single test, since it mutates the
//! process environment.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use tesouro::cache::{ManualClock, SnapshotCache, SnapshotOrigin};
use tesouro::config::{CacheSwitch, CACHE_DISABLED_ENV};
use tesouro::data::tesouro::parse_snapshot;
use tesouro::data::{Snapshot, SnapshotSource, UpstreamError};

const FIXTURE_BODY: &str = include_str!("fixtures/treasury_bonds.json");

/// Serves the fixture with a business timestamp one minute later per call,
/// starting at 15:30 Brasília time
struct SteppingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl SnapshotSource for SteppingSource {
    async fn fetch(&self) -> Result<Snapshot, UpstreamError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut snapshot = parse_snapshot(FIXTURE_BODY)?;
        snapshot.business.timestamp = format!("2024-05-10T15:3{}:00", call);
        Ok(snapshot)
    }
}

/// Clears the variable again even if an assertion fails
struct EnvGuard;

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(CACHE_DISABLED_ENV);
    }
}

#[tokio::test]
async fn test_switch_is_reread_on_every_operation() {
    let _guard = EnvGuard;
    env::remove_var(CACHE_DISABLED_ENV);

    // Every timestamp the source hands out stays fresh at 15:39 Brasília time
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 10, 18, 39, 0).unwrap(),
    ));
    let source = SteppingSource {
        calls: AtomicUsize::new(0),
    };
    let cache = SnapshotCache::new(source, CacheSwitch::FromEnv).with_clock(clock);
    let calls = |cache: &SnapshotCache<SteppingSource>| cache.source().calls.load(Ordering::SeqCst);

    let first = cache.read("enabled").await.unwrap();
    assert_eq!(first.origin, SnapshotOrigin::Fetched { changed: true });
    assert!(cache.is_fresh().await);
    assert_eq!(calls(&cache), 1);

    env::set_var(CACHE_DISABLED_ENV, "true");

    assert!(!cache.is_fresh().await);
    let bypass = cache.read("disabled").await.unwrap();
    assert_eq!(bypass.snapshot.business.timestamp, "2024-05-10T15:31:00");
    assert_eq!(calls(&cache), 2);
    // Nothing stored and nothing cleared while disabled
    cache.invalidate().await;
    let held = cache.cached().await.expect("slot kept while disabled");
    assert!(Arc::ptr_eq(&held, &first.snapshot));

    env::remove_var(CACHE_DISABLED_ENV);

    let cached = cache.read("re-enabled").await.unwrap();
    assert_eq!(cached.origin, SnapshotOrigin::Cached);
    assert_eq!(calls(&cache), 2);

    cache.invalidate().await;
    let refreshed = cache.read("after invalidate").await.unwrap();
    assert_eq!(refreshed.origin, SnapshotOrigin::Fetched { changed: true });
    let held = cache.cached().await.expect("storing resumes");
    assert_eq!(held.business.timestamp, "2024-05-10T15:32:00");
    assert_eq!(calls(&cache), 3);

    env::set_var(CACHE_DISABLED_ENV, "false");
    assert!(cache.is_fresh().await, "only the literal true disables");
}
