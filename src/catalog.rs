//! Read-only query surface over the snapshot cache
//!
//! Every operation fetches through the cache and then filters in memory; none
//! of them touches cached data beyond triggering a fill on a miss.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::cache::SnapshotCache;
use crate::data::{BondEntry, BusinessStatus, MarketStatus, Snapshot, SnapshotSource};
use crate::error::CatalogError;
use crate::resources::{ResourceDocument, ResourceEntry, ResourceUri};

/// Literal bond-type value meaning "no type constraint"
pub const ANY_BOND_TYPE: &str = "ANY";

/// Market status plus the business status it was published under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOverview {
    pub market: MarketStatus,
    pub business: BusinessStatus,
}

/// Bond-type constraint of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BondTypeFilter {
    /// Matches every bond
    Any,
    /// Matches bonds whose reference index name contains this text,
    /// ignoring case
    Named(String),
}

impl BondTypeFilter {
    /// Parses a user-supplied type; blank input and `ANY` mean no constraint
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ANY_BOND_TYPE) {
            BondTypeFilter::Any
        } else {
            BondTypeFilter::Named(trimmed.to_string())
        }
    }

    fn matches(&self, bond: &BondEntry) -> bool {
        match self {
            BondTypeFilter::Any => true,
            BondTypeFilter::Named(name) => bond
                .index
                .name
                .to_lowercase()
                .contains(&name.to_lowercase()),
        }
    }
}

/// Conjunctive search filter; `None` fields impose no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub bond_type: Option<BondTypeFilter>,
    /// Inclusive lower bound on the maturity date
    pub maturity_after: Option<NaiveDate>,
    /// Inclusive upper bound on the maturity date
    pub maturity_before: Option<NaiveDate>,
}

impl SearchCriteria {
    /// Whether `bond` satisfies every provided criterion
    ///
    /// A bond whose maturity cannot be parsed never satisfies a date bound.
    pub fn matches(&self, bond: &BondEntry) -> bool {
        if let Some(filter) = &self.bond_type {
            if !filter.matches(bond) {
                return false;
            }
        }

        if self.maturity_after.is_none() && self.maturity_before.is_none() {
            return true;
        }
        let Some(maturity) = bond.maturity_date() else {
            return false;
        };
        if self.maturity_after.is_some_and(|after| maturity < after) {
            return false;
        }
        if self.maturity_before.is_some_and(|before| maturity > before) {
            return false;
        }
        true
    }
}

/// Query and resource façade over a [`SnapshotCache`]
pub struct TreasuryCatalog<S> {
    cache: Arc<SnapshotCache<S>>,
}

impl<S: SnapshotSource> TreasuryCatalog<S> {
    pub fn new(cache: SnapshotCache<S>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Builds a catalog sharing an existing cache
    pub fn with_shared_cache(cache: Arc<SnapshotCache<S>>) -> Self {
        Self { cache }
    }

    /// The cache backing this catalog
    pub fn cache(&self) -> &Arc<SnapshotCache<S>> {
        &self.cache
    }

    async fn snapshot(&self, context: &str) -> Result<Arc<Snapshot>, CatalogError> {
        Ok(self.cache.get_snapshot(context).await?)
    }

    /// Market opening/closing window, quotation status and business status
    pub async fn market_status(&self) -> Result<MarketOverview, CatalogError> {
        let snapshot = self.snapshot("market status").await?;
        Ok(overview_of(&snapshot))
    }

    /// Looks up one bond by its numeric code
    pub async fn bond(&self, code: u32) -> Result<BondEntry, CatalogError> {
        let snapshot = self.snapshot(&format!("bond data (code: {})", code)).await?;
        snapshot
            .find_bond(code)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Bond with code {} not found", code)))
    }

    /// Bonds matching every provided criterion, in snapshot order
    pub async fn search_bonds(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<BondEntry>, CatalogError> {
        let snapshot = self.snapshot("bond search").await?;
        let matches: Vec<BondEntry> = snapshot
            .instruments
            .iter()
            .filter(|bond| criteria.matches(bond))
            .cloned()
            .collect();
        info!(total = matches.len(), "Bond search completed");
        Ok(matches)
    }

    /// The market resource followed by one resource per bond
    pub async fn list_resources(&self) -> Result<Vec<ResourceEntry>, CatalogError> {
        let snapshot = self.snapshot("resource listing").await?;
        let mut resources = Vec::with_capacity(snapshot.instruments.len() + 1);
        resources.push(ResourceEntry::market());
        resources.extend(snapshot.instruments.iter().map(ResourceEntry::bond));
        info!(count = resources.len(), "Listed resources");
        Ok(resources)
    }

    /// Reads a resource by URI
    ///
    /// Unrecognised URIs fail with `NotFound` before the cache is consulted.
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceDocument, CatalogError> {
        let parsed = ResourceUri::parse(uri)
            .ok_or_else(|| CatalogError::NotFound(format!("Resource not found: {}", uri)))?;

        match parsed {
            ResourceUri::Market => {
                let snapshot = self.snapshot("market resource").await?;
                Ok(ResourceDocument::Market(overview_of(&snapshot)))
            }
            ResourceUri::Bond(code) => {
                let snapshot = self.snapshot(&format!("bond {}", code)).await?;
                snapshot
                    .find_bond(code)
                    .cloned()
                    .map(ResourceDocument::Bond)
                    .ok_or_else(|| CatalogError::NotFound(format!("Resource not found: {}", uri)))
            }
        }
    }
}

fn overview_of(snapshot: &Snapshot) -> MarketOverview {
    MarketOverview {
        market: snapshot.market.clone(),
        business: snapshot.business.clone(),
    }
}
