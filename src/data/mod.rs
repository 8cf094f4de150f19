//! Core data models for the treasury bond catalog
//!
//! This module contains the snapshot types produced by one read of the
//! Tesouro Direto catalog, plus parsing of the upstream date/time strings.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod tesouro;

pub use tesouro::{SnapshotSource, TesouroClient, UpstreamError};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC offset of the upstream's business clock (Brasília, no DST since 2019)
const UPSTREAM_UTC_OFFSET_SECS: i32 = -3 * 3600;

/// Offset-less date/time layouts the upstream has been seen to emit
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// One immutable full read of the upstream catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Trading window and quotation status
    pub market: MarketStatus,
    /// Business status, carrying the freshness timestamp
    pub business: BusinessStatus,
    /// Upstream `BdTxTp` code, carried verbatim
    pub bond_tax_type: Option<i64>,
    /// Tradable instruments in upstream order
    pub instruments: Vec<BondEntry>,
}

/// Market opening/closing window and quotation status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStatus {
    pub open_time: String,
    pub close_time: String,
    pub quote_time: String,
    pub status_code: i64,
    pub status_text: String,
}

/// Business status block; `timestamp` is the sole freshness signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessStatus {
    pub code: Option<i64>,
    pub timestamp: String,
}

/// Reference index of a bond (SELIC, IPCA, PREFIXADO, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexReference {
    pub code: i64,
    pub name: String,
}

/// Business segment a bond is offered under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSegment {
    pub code: i64,
    pub name: String,
}

/// Treasury bond type (LFT, LTN, NTN-B, ...) and its pricing extras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondTypeInfo {
    pub code: i64,
    pub name: String,
    pub custody_rate: Option<f64>,
    pub gross_price: Option<f64>,
}

/// One tradable treasury security and its terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondEntry {
    /// Numeric code, unique within a snapshot
    pub code: u32,
    pub isin: String,
    pub name: String,
    pub features: String,
    /// Maturity as sent by the upstream (e.g. "2029-05-15T00:00:00")
    pub maturity: String,
    pub index: IndexReference,
    pub segment: Option<BusinessSegment>,
    pub min_investment_amount: f64,
    pub unit_investment_value: f64,
    pub annual_investment_rate: f64,
    pub annual_redemption_rate: f64,
    pub min_redemption_quantity: f64,
    pub min_redemption_value: f64,
    pub unit_redemption_value: f64,
    pub amortization_quota_quantity: f64,
    pub semiannual_interest: bool,
    pub investment_stability: String,
    pub receiving_income: String,
    pub bond_type: BondTypeInfo,
    pub selic_code: Option<i64>,
    /// Absent when the bond has no withdrawal date
    pub withdrawal_date: Option<String>,
    /// Absent when the bond has no conversion date
    pub conversion_date: Option<String>,
}

impl Snapshot {
    /// The business timestamp string as sent by the upstream
    pub fn business_timestamp(&self) -> &str {
        &self.business.timestamp
    }

    /// Finds an instrument by its numeric code
    pub fn find_bond(&self, code: u32) -> Option<&BondEntry> {
        self.instruments.iter().find(|bond| bond.code == code)
    }
}

impl BondEntry {
    /// Calendar date of maturity, if the upstream string is parseable
    pub fn maturity_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.maturity)
    }
}

/// Parses an upstream business timestamp into UTC
///
/// Accepts RFC 3339 with an explicit offset, or the upstream's offset-less
/// local format, which is read as Brasília time. Returns `None` for anything
/// else.
pub fn parse_business_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let offset = FixedOffset::east_opt(UPSTREAM_UTC_OFFSET_SECS)?;
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| naive.and_local_timezone(offset).single())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses the date part of an upstream date/time string ("2029-05-15T00:00:00")
/// or a plain "YYYY-MM-DD" date
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
