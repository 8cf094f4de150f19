//! Cache module holding the latest catalog snapshot in memory
//!
//! This module provides a single-slot cache whose freshness is derived from
//! the business timestamp the upstream embeds in each snapshot. A miss
//! triggers at most one upstream fetch no matter how many callers are waiting
//! on it, and a failed fetch is reported rather than papered over with stale
//! data.

mod clock;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{CacheRead, CacheSlot, SnapshotCache, SnapshotOrigin, CACHE_TTL_MINUTES};
