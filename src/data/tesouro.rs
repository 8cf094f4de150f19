//! Tesouro Direto API client
//!
//! This module fetches the treasury bond catalog from the Tesouro Direto JSON
//! endpoint and parses its response envelope into a [`Snapshot`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::{
    BondEntry, BondTypeInfo, BusinessSegment, BusinessStatus, IndexReference, MarketStatus,
    Snapshot,
};
use crate::config::ClientConfig;

/// Application status the envelope carries on success
const RESPONSE_STATUS_OK: i64 = 200;

/// Errors that can occur when fetching the catalog
///
/// Cloneable so one failed fetch can be reported to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// HTTP request failed (connection, TLS, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[source] Arc<reqwest::Error>),

    /// Upstream answered with a non-success HTTP status
    #[error("Upstream returned HTTP status {0}")]
    HttpStatus(u16),

    /// Envelope carried a non-200 application status
    #[error("API returned error status {code}: {text}")]
    Status { code: i64, text: String },

    /// Payload could not be read as a catalog snapshot
    #[error("Malformed payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Request(Arc::new(err))
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        UpstreamError::Malformed(err.to_string())
    }
}

/// A source of full catalog snapshots
///
/// Each call performs exactly one upstream read; retries are the caller's
/// business.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Reads the whole catalog once
    async fn fetch(&self) -> Result<Snapshot, UpstreamError>;
}

#[async_trait]
impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    async fn fetch(&self) -> Result<Snapshot, UpstreamError> {
        (**self).fetch().await
    }
}

/// Response envelope wrapping every catalog payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEnvelope {
    response_status: i64,
    #[serde(default)]
    response_status_text: Option<String>,
    #[serde(default)]
    response: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ResponsePayload {
    #[serde(rename = "BdTxTp", default)]
    bond_tax_type: Option<CodeOnly>,
    #[serde(rename = "TrsrBondMkt")]
    market: RawMarket,
    #[serde(rename = "TrsrBdTradgList", default)]
    trading_list: Vec<RawTradingItem>,
    #[serde(rename = "BizSts")]
    business: RawBusinessStatus,
}

#[derive(Debug, Deserialize)]
struct CodeOnly {
    cd: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    #[serde(rename = "opngDtTm")]
    opening: Option<String>,
    #[serde(rename = "clsgDtTm")]
    closing: Option<String>,
    #[serde(rename = "qtnDtTm")]
    quotation: Option<String>,
    #[serde(rename = "stsCd")]
    status_code: i64,
    #[serde(rename = "sts")]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBusinessStatus {
    cd: Option<i64>,
    #[serde(rename = "dtTm")]
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct RawTradingItem {
    #[serde(rename = "TrsrBd")]
    bond: RawBond,
    #[serde(rename = "TrsrBdType")]
    bond_type: RawBondType,
    #[serde(rename = "SelicCode", default)]
    selic_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawCodeName {
    cd: i64,
    nm: String,
}

#[derive(Debug, Deserialize)]
struct RawBondType {
    cd: i64,
    nm: String,
    #[serde(rename = "ctdyRate", default)]
    custody_rate: Option<f64>,
    #[serde(rename = "grPr", default)]
    gross_price: Option<f64>,
}

/// A single bond record (`TrsrBd`) from the API
#[derive(Debug, Deserialize)]
struct RawBond {
    cd: u32,
    nm: String,
    #[serde(rename = "featrs", default)]
    features: Option<String>,
    #[serde(rename = "mtrtyDt")]
    maturity: String,
    #[serde(rename = "minInvstmtAmt")]
    min_investment_amount: f64,
    #[serde(rename = "untrInvstmtVal")]
    unit_investment_value: f64,
    #[serde(rename = "invstmtStbl", default)]
    investment_stability: Option<String>,
    #[serde(rename = "semiAnulIntrstInd")]
    semiannual_interest: bool,
    #[serde(rename = "rcvgIncm", default)]
    receiving_income: Option<String>,
    #[serde(rename = "anulInvstmtRate")]
    annual_investment_rate: f64,
    #[serde(rename = "anulRedRate")]
    annual_redemption_rate: f64,
    #[serde(rename = "minRedQty")]
    min_redemption_quantity: f64,
    #[serde(rename = "untrRedVal")]
    unit_redemption_value: f64,
    #[serde(rename = "minRedVal")]
    min_redemption_value: f64,
    #[serde(rename = "isinCd")]
    isin: String,
    #[serde(rename = "FinIndxs")]
    index: RawCodeName,
    #[serde(rename = "wdwlDt", default)]
    withdrawal_date: Option<String>,
    #[serde(rename = "convDt", default)]
    conversion_date: Option<String>,
    #[serde(rename = "BusSegmt", default)]
    segment: Option<RawCodeName>,
    #[serde(rename = "amortQuotQty", default)]
    amortization_quota_quantity: f64,
}

/// Client for fetching the treasury bond catalog
#[derive(Debug, Clone)]
pub struct TesouroClient {
    client: Client,
    api_url: String,
}

impl TesouroClient {
    /// Creates a client with the configured endpoint and request timeout
    pub fn new(config: &ClientConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Creates a client around an existing HTTP client and endpoint
    pub fn with_client(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// The endpoint this client reads from
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetches and parses the full catalog
    ///
    /// # Returns
    /// * `Ok(Snapshot)` - The catalog as currently published
    /// * `Err(UpstreamError)` - On transport failure, non-success HTTP or
    ///   application status, or a payload that is not a valid catalog
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, UpstreamError> {
        debug!(url = %self.api_url, "Requesting treasury bond catalog");

        let response = self.client.get(&self.api_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::HttpStatus(status.as_u16()));
        }

        let text = response.text().await?;
        let snapshot = parse_snapshot(&text)?;

        info!(
            bonds = snapshot.instruments.len(),
            business_timestamp = %snapshot.business.timestamp,
            "Fetched treasury bond catalog"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotSource for TesouroClient {
    async fn fetch(&self) -> Result<Snapshot, UpstreamError> {
        self.fetch_snapshot().await
    }
}

/// Parses a raw response body (envelope included) into a [`Snapshot`]
pub fn parse_snapshot(body: &str) -> Result<Snapshot, UpstreamError> {
    let envelope: ApiEnvelope = serde_json::from_str(body)?;

    if envelope.response_status != RESPONSE_STATUS_OK {
        return Err(UpstreamError::Status {
            code: envelope.response_status,
            text: envelope.response_status_text.unwrap_or_default(),
        });
    }

    let payload = envelope
        .response
        .ok_or_else(|| UpstreamError::Malformed("missing response payload".to_string()))?;
    let payload: ResponsePayload = serde_json::from_value(payload)?;

    into_snapshot(payload)
}

/// Converts the wire payload into domain types, enforcing unique bond codes
fn into_snapshot(payload: ResponsePayload) -> Result<Snapshot, UpstreamError> {
    let mut seen = HashSet::with_capacity(payload.trading_list.len());
    let mut instruments = Vec::with_capacity(payload.trading_list.len());

    for item in payload.trading_list {
        if !seen.insert(item.bond.cd) {
            return Err(UpstreamError::Malformed(format!(
                "duplicate bond code {}",
                item.bond.cd
            )));
        }
        instruments.push(into_bond_entry(item));
    }

    let market = payload.market;
    Ok(Snapshot {
        market: MarketStatus {
            open_time: market.opening.unwrap_or_default(),
            close_time: market.closing.unwrap_or_default(),
            quote_time: market.quotation.unwrap_or_default(),
            status_code: market.status_code,
            status_text: market.status.unwrap_or_default(),
        },
        business: BusinessStatus {
            code: payload.business.cd,
            timestamp: payload.business.timestamp,
        },
        bond_tax_type: payload.bond_tax_type.and_then(|t| t.cd),
        instruments,
    })
}

fn into_bond_entry(item: RawTradingItem) -> BondEntry {
    let bond = item.bond;
    BondEntry {
        code: bond.cd,
        isin: bond.isin,
        name: bond.nm,
        features: bond.features.unwrap_or_default(),
        maturity: bond.maturity,
        index: IndexReference {
            code: bond.index.cd,
            name: bond.index.nm,
        },
        segment: bond.segment.map(|s| BusinessSegment {
            code: s.cd,
            name: s.nm,
        }),
        min_investment_amount: bond.min_investment_amount,
        unit_investment_value: bond.unit_investment_value,
        annual_investment_rate: bond.annual_investment_rate,
        annual_redemption_rate: bond.annual_redemption_rate,
        min_redemption_quantity: bond.min_redemption_quantity,
        min_redemption_value: bond.min_redemption_value,
        unit_redemption_value: bond.unit_redemption_value,
        amortization_quota_quantity: bond.amortization_quota_quantity,
        semiannual_interest: bond.semiannual_interest,
        investment_stability: bond.investment_stability.unwrap_or_default(),
        receiving_income: bond.receiving_income.unwrap_or_default(),
        bond_type: BondTypeInfo {
            code: item.bond_type.cd,
            name: item.bond_type.nm,
            custody_rate: item.bond_type.custody_rate,
            gross_price: item.bond_type.gross_price,
        },
        selic_code: item.selic_code,
        withdrawal_date: bond.withdrawal_date,
        conversion_date: bond.conversion_date,
    }
}
