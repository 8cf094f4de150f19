//! Periodic market polling through the snapshot cache

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheRead, SnapshotOrigin};
use crate::catalog::TreasuryCatalog;
use crate::data::{SnapshotSource, UpstreamError};

/// Short label for where a polled snapshot came from
pub fn origin_label(origin: SnapshotOrigin) -> &'static str {
    match origin {
        SnapshotOrigin::Cached => "cached",
        SnapshotOrigin::Fetched { changed: true } => "new data",
        SnapshotOrigin::Fetched { changed: false } => "unchanged",
    }
}

/// One status line for a successful poll
pub fn describe_poll(read: &CacheRead) -> String {
    let market = &read.snapshot.market;
    format!(
        "[{}] market {} ({}), quoted {}, business {}, {} bonds",
        origin_label(read.origin),
        market.status_text,
        market.status_code,
        market.quote_time,
        read.snapshot.business_timestamp(),
        read.snapshot.instruments.len()
    )
}

/// Polls the cache every `every` until `limit` polls are done or `shutdown`
/// resolves, handing each outcome to `on_poll`
///
/// `shutdown` also interrupts a poll whose fetch is still in flight. Returns
/// the number of completed polls.
pub async fn watch_market<S, F, P>(
    catalog: &TreasuryCatalog<S>,
    every: Duration,
    limit: Option<u64>,
    shutdown: F,
    mut on_poll: P,
) -> u64
where
    S: SnapshotSource,
    F: Future<Output = ()>,
    P: FnMut(Result<CacheRead, UpstreamError>),
{
    let mut ticker = tokio::time::interval(every);
    let mut polls: u64 = 0;
    tokio::pin!(shutdown);

    while limit.map_or(true, |limit| polls < limit) {
        let poll = async {
            ticker.tick().await;
            catalog.cache().read("watch").await
        };
        let outcome = tokio::select! {
            outcome = poll => outcome,
            _ = &mut shutdown => {
                debug!(polls, "Watch stopped");
                break;
            }
        };
        on_poll(outcome);
        polls += 1;
    }
    polls
}
