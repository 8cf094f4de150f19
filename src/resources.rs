//! Resource URIs exposed by the catalog
//!
//! The market overview lives at `tesourodireto://market`; each bond at
//! `tesourodireto://bond/{code}`.

use std::fmt;

use serde::Serialize;

use crate::catalog::MarketOverview;
use crate::data::BondEntry;

/// URI of the market overview resource
pub const MARKET_RESOURCE_URI: &str = "tesourodireto://market";

/// Prefix of every bond resource URI
pub const BOND_RESOURCE_URI_PREFIX: &str = "tesourodireto://bond/";

/// Display name of the market resource
pub const MARKET_RESOURCE_NAME: &str = "Tesouro Direto Market Data";

/// A recognised resource address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUri {
    Market,
    Bond(u32),
}

impl ResourceUri {
    /// Parses a URI; `None` when it is neither the market sentinel nor a
    /// bond URI with a numeric code
    pub fn parse(uri: &str) -> Option<Self> {
        if uri == MARKET_RESOURCE_URI {
            return Some(ResourceUri::Market);
        }
        uri.strip_prefix(BOND_RESOURCE_URI_PREFIX)
            .and_then(|code| code.parse::<u32>().ok())
            .map(ResourceUri::Bond)
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceUri::Market => f.write_str(MARKET_RESOURCE_URI),
            ResourceUri::Bond(code) => write!(f, "{}{}", BOND_RESOURCE_URI_PREFIX, code),
        }
    }
}

/// One entry of the resource listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    pub uri: String,
    pub name: String,
}

impl ResourceEntry {
    pub fn market() -> Self {
        Self {
            uri: MARKET_RESOURCE_URI.to_string(),
            name: MARKET_RESOURCE_NAME.to_string(),
        }
    }

    pub fn bond(bond: &BondEntry) -> Self {
        Self {
            uri: ResourceUri::Bond(bond.code).to_string(),
            name: format!("{} ({})", bond.name, bond.isin),
        }
    }
}

/// Content of a resource read
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDocument {
    Market(MarketOverview),
    Bond(BondEntry),
}

impl ResourceDocument {
    /// The canonical URI of this document
    pub fn uri(&self) -> String {
        match self {
            ResourceDocument::Market(_) => ResourceUri::Market.to_string(),
            ResourceDocument::Bond(bond) => ResourceUri::Bond(bond.code).to_string(),
        }
    }
}
