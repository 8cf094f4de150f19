//! Tool surface: descriptors, argument validation and dispatch
//!
//! Arguments arrive as loose JSON. They are validated before the catalog (and
//! therefore the cache and upstream) is touched, and results are returned as
//! pretty JSON text.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::catalog::{BondTypeFilter, SearchCriteria, TreasuryCatalog};
use crate::data::SnapshotSource;
use crate::error::CatalogError;
use crate::projection::{bond_document, market_document, search_document, to_pretty_text};

pub const MARKET_DATA_TOOL: &str = "market_data";
pub const BOND_DATA_TOOL: &str = "bond_data";
pub const SEARCH_BONDS_TOOL: &str = "search_bonds";

/// Layout accepted for `maturityAfter` and `maturityBefore`
const DATE_ARG_FORMAT: &str = "%Y-%m-%d";

/// Suggested values for the `bondType` argument; free text is accepted too
pub const BOND_TYPE_SUGGESTIONS: &[&str] = &["ANY", "SELIC", "IPCA", "PREFIXADO", "IGPM"];

/// Name, description and JSON input schema of a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// All tools the catalog answers
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: MARKET_DATA_TOOL,
            description: "Retrieves general market data from Tesouro Direto, including opening/closing times and status",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDescriptor {
            name: BOND_DATA_TOOL,
            description: "Retrieves detailed data for a specific bond from Tesouro Direto",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "The numeric code of the bond to retrieve"
                    }
                },
                "required": ["code"]
            }),
        },
        ToolDescriptor {
            name: SEARCH_BONDS_TOOL,
            description: "Search for bonds by index type or maturity date range; with no criteria every bond matches",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "bondType": {
                        "type": "string",
                        "description": "Filter by reference index name (e.g. ANY, SELIC, IPCA, PREFIXADO, IGPM)",
                        "examples": BOND_TYPE_SUGGESTIONS
                    },
                    "maturityAfter": {
                        "type": "string",
                        "format": "date",
                        "description": "Only bonds maturing on or after this date (YYYY-MM-DD)"
                    },
                    "maturityBefore": {
                        "type": "string",
                        "format": "date",
                        "description": "Only bonds maturing on or before this date (YYYY-MM-DD)"
                    }
                }
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct BondDataArgs {
    code: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchBondsArgs {
    #[serde(default)]
    bond_type: Option<String>,
    #[serde(default)]
    maturity_after: Option<String>,
    #[serde(default)]
    maturity_before: Option<String>,
}

/// Validates `bond_data` arguments into a bond code
pub fn parse_bond_code(args: &Value) -> Result<u32, CatalogError> {
    let parsed: BondDataArgs = serde_json::from_value(args.clone())
        .map_err(|e| CatalogError::Validation(format!("code: {}", e)))?;

    if parsed.code <= 0 {
        return Err(CatalogError::Validation(
            "code must be a positive integer".to_string(),
        ));
    }
    u32::try_from(parsed.code)
        .map_err(|_| CatalogError::Validation(format!("code {} is out of range", parsed.code)))
}

/// Validates `search_bonds` arguments into search criteria
///
/// Missing or null arguments mean "no criteria", which matches every bond.
pub fn parse_search_criteria(args: &Value) -> Result<SearchCriteria, CatalogError> {
    let parsed: SearchBondsArgs = if args.is_null() {
        SearchBondsArgs::default()
    } else {
        serde_json::from_value(args.clone()).map_err(|e| CatalogError::Validation(e.to_string()))?
    };

    Ok(SearchCriteria {
        bond_type: parsed.bond_type.as_deref().map(BondTypeFilter::parse),
        maturity_after: parse_date_arg("maturityAfter", parsed.maturity_after.as_deref())?,
        maturity_before: parse_date_arg("maturityBefore", parsed.maturity_before.as_deref())?,
    })
}

fn parse_date_arg(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<chrono::NaiveDate>, CatalogError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => chrono::NaiveDate::parse_from_str(value, DATE_ARG_FORMAT)
            .map(Some)
            .map_err(|_| {
                CatalogError::Validation(format!(
                    "{} must be a date in YYYY-MM-DD format, got '{}'",
                    field, value
                ))
            }),
    }
}

/// Runs a tool by name and returns its result as pretty JSON text
pub async fn call_tool<S: SnapshotSource>(
    catalog: &TreasuryCatalog<S>,
    name: &str,
    args: &Value,
) -> Result<String, CatalogError> {
    let result = dispatch(catalog, name, args).await;
    if let Err(err) = &result {
        if err.is_not_found() {
            warn!(tool = name, "{}", err);
        } else {
            error!(tool = name, "Error executing tool: {}", err);
        }
    }
    result.map(|value| to_pretty_text(&value))
}

async fn dispatch<S: SnapshotSource>(
    catalog: &TreasuryCatalog<S>,
    name: &str,
    args: &Value,
) -> Result<Value, CatalogError> {
    match name {
        MARKET_DATA_TOOL => {
            let overview = catalog.market_status().await?;
            Ok(market_document(&overview))
        }
        BOND_DATA_TOOL => {
            let code = parse_bond_code(args)?;
            let bond = catalog.bond(code).await?;
            Ok(bond_document(&bond))
        }
        SEARCH_BONDS_TOOL => {
            let criteria = parse_search_criteria(args)?;
            let bonds = catalog.search_bonds(&criteria).await?;
            Ok(search_document(&criteria, &bonds))
        }
        other => Err(CatalogError::UnknownTool(other.to_string())),
    }
}
