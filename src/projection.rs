//! JSON documents returned by tools and resource reads
//!
//! Field names here are the public response shape and are kept stable
//! independently of the domain structs.

use serde_json::{json, Value};

use crate::catalog::{BondTypeFilter, MarketOverview, SearchCriteria};
use crate::data::BondEntry;
use crate::resources::{ResourceDocument, ResourceEntry};

/// Mime type of every resource document
pub const RESOURCE_MIME_TYPE: &str = "application/json";

pub fn market_document(overview: &MarketOverview) -> Value {
    let market = &overview.market;
    let business = &overview.business;
    json!({
        "market_status": {
            "opening_time": market.open_time,
            "closing_time": market.close_time,
            "quotation_time": market.quote_time,
            "status_code": market.status_code,
            "status": market.status_text,
        },
        "business_status": {
            "code": business.code,
            "timestamp": business.timestamp,
        }
    })
}

pub fn bond_document(bond: &BondEntry) -> Value {
    json!({
        "code": bond.code,
        "name": bond.name,
        "features": bond.features,
        "maturity_date": bond.maturity,
        "minimum_investment_amount": bond.min_investment_amount,
        "unitary_investment_value": bond.unit_investment_value,
        "investment_stability": bond.investment_stability,
        "semiannual_interest_indicator": bond.semiannual_interest,
        "receiving_income": bond.receiving_income,
        "annual_investment_rate": bond.annual_investment_rate,
        "annual_redemption_rate": bond.annual_redemption_rate,
        "minimum_redemption_quantity": bond.min_redemption_quantity,
        "unitary_redemption_value": bond.unit_redemption_value,
        "minimum_redemption_value": bond.min_redemption_value,
        "isin_code": bond.isin,
        "financial_index": {
            "code": bond.index.code,
            "name": bond.index.name,
        },
        "withdrawal_date": bond.withdrawal_date,
        "conversion_date": bond.conversion_date,
        "business_segment": bond.segment.as_ref().map(|segment| json!({
            "code": segment.code,
            "name": segment.name,
        })),
        "amortization_quota_quantity": bond.amortization_quota_quantity,
        "selic_code": bond.selic_code,
        "treasury_bond_type": {
            "code": bond.bond_type.code,
            "name": bond.bond_type.name,
            "custody_rate": bond.bond_type.custody_rate,
            "gross_price": bond.bond_type.gross_price,
        }
    })
}

/// Search results with the criteria echoed back
pub fn search_document(criteria: &SearchCriteria, bonds: &[BondEntry]) -> Value {
    let bond_type = match &criteria.bond_type {
        None => None,
        Some(BondTypeFilter::Any) => Some("ANY".to_string()),
        Some(BondTypeFilter::Named(name)) => Some(name.clone()),
    };

    json!({
        "criteria": {
            "bondType": bond_type,
            "maturityAfter": criteria.maturity_after.map(|d| d.to_string()),
            "maturityBefore": criteria.maturity_before.map(|d| d.to_string()),
        },
        "total_results": bonds.len(),
        "bonds": bonds.iter().map(|bond| json!({
            "code": bond.code,
            "name": bond.name,
            "type": bond.bond_type.name,
            "index": bond.index.name,
            "maturity_date": bond.maturity,
            "investment_rate": bond.annual_investment_rate,
            "redemption_rate": bond.annual_redemption_rate,
            "minimum_investment": bond.min_investment_amount,
        })).collect::<Vec<_>>(),
    })
}

pub fn resource_list_document(resources: &[ResourceEntry]) -> Value {
    json!({ "resources": resources })
}

/// Resource read result: one content block holding the document as JSON text
pub fn resource_contents_document(document: &ResourceDocument) -> Value {
    let body = match document {
        ResourceDocument::Market(overview) => market_document(overview),
        ResourceDocument::Bond(bond) => bond_document(bond),
    };
    json!({
        "contents": [{
            "uri": document.uri(),
            "mimeType": RESOURCE_MIME_TYPE,
            "text": to_pretty_text(&body),
        }]
    })
}

/// Pretty-printed JSON text
pub fn to_pretty_text(value: &Value) -> String {
    // Serializing a `Value` cannot fail; fall back to compact output regardless
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
