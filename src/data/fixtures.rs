//! Snapshot builders shared by unit tests

use super::{BondEntry, BondTypeInfo, BusinessStatus, IndexReference, MarketStatus, Snapshot};

/// Upstream payload recorded from the live catalog
pub(crate) const FIXTURE_BODY: &str = include_str!("../../tests/fixtures/treasury_bonds.json");

pub(crate) fn bond(code: u32, index: &str, maturity: &str) -> BondEntry {
    BondEntry {
        code,
        isin: format!("BRSTN{:07}", code),
        name: format!("Tesouro {} {}", index, &maturity[..4]),
        features: String::new(),
        maturity: maturity.to_string(),
        index: IndexReference {
            code: 22,
            name: index.to_string(),
        },
        segment: None,
        min_investment_amount: 30.0,
        unit_investment_value: 3000.0,
        annual_investment_rate: 6.1,
        annual_redemption_rate: 6.2,
        min_redemption_quantity: 0.01,
        min_redemption_value: 30.0,
        unit_redemption_value: 2990.0,
        amortization_quota_quantity: 0.0,
        semiannual_interest: false,
        investment_stability: String::new(),
        receiving_income: String::new(),
        bond_type: BondTypeInfo {
            code: 1,
            name: "NTN-B".to_string(),
            custody_rate: None,
            gross_price: None,
        },
        selic_code: None,
        withdrawal_date: None,
        conversion_date: None,
    }
}

/// Snapshot whose bonds get index/maturity from their code:
/// 1 = SELIC 2029-03-01, 2 = IPCA 2029-05-15, 3 = PREFIXADO 2031-01-01,
/// anything else = IPCA 2035-05-15
pub(crate) fn snapshot_with(timestamp: &str, codes: &[u32]) -> Snapshot {
    let instruments = codes
        .iter()
        .map(|&code| match code {
            1 => bond(code, "SELIC", "2029-03-01T00:00:00"),
            2 => bond(code, "IPCA", "2029-05-15T00:00:00"),
            3 => bond(code, "PREFIXADO", "2031-01-01T00:00:00"),
            _ => bond(code, "IPCA", "2035-05-15T00:00:00"),
        })
        .collect();

    Snapshot {
        market: MarketStatus {
            open_time: "2024-05-10T09:25:00".to_string(),
            close_time: "2024-05-11T05:00:00".to_string(),
            quote_time: timestamp.to_string(),
            status_code: 1,
            status_text: "Aberto".to_string(),
        },
        business: BusinessStatus {
            code: None,
            timestamp: timestamp.to_string(),
        },
        bond_tax_type: Some(0),
        instruments,
    }
}
