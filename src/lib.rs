//! Tesouro Direto treasury bond catalog
//!
//! A single-slot snapshot cache, gated by the upstream's own business
//! timestamp, in front of the public Tesouro Direto catalog, with query,
//! resource and tool surfaces on top.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod projection;
pub mod resources;
pub mod tools;
pub mod watch;

pub use cache::{SnapshotCache, SnapshotOrigin};
pub use catalog::{BondTypeFilter, MarketOverview, SearchCriteria, TreasuryCatalog};
pub use data::{BondEntry, Snapshot, SnapshotSource, TesouroClient, UpstreamError};
pub use error::CatalogError;
