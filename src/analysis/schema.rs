// src/analysis/schema.rs

//! Column role inference over arbitrary CSV headers.
//!
//! Each role is an ordered keyword list plus a list of disqualifying
//! substrings. Keywords are tried in priority order and, for each keyword,
//! columns are scanned left to right; the first hit wins. The result is a
//! deterministic first guess that a planner can always override.

use crate::error::{PlannerError, Result};
use crate::model::table::ColumnMapping;
use tracing::debug;

/// Keyword rule for one column role.
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub keywords: &'static [&'static str],
    pub exclusions: &'static [&'static str],
}

pub const DATE_RULE: RoleRule = RoleRule {
    keywords: &["date", "time", "jour", "day"],
    exclusions: &[],
};

/// "sold" is deliberately ahead of "total".
pub const SALES_RULE: RoleRule = RoleRule {
    keywords: &[
        "sold", "turnover", "revenue", "amount", "total", "sale", "vent", "qty", "quantity",
        "qte",
    ],
    exclusions: &["id", "transaction", "price", "prix", "code", "discount"],
};

pub const ITEM_RULE: RoleRule = RoleRule {
    keywords: &[
        "product", "produit", "name", "nom", "item", "art", "sku", "ref", "id",
    ],
    exclusions: &["transaction", "order", "row", "date", "payment", "ship", "region"],
};

/// Returns the first column matching `rule`, or `None` if no keyword matches.
pub fn detect_column<'a>(columns: &'a [String], rule: &RoleRule) -> Option<&'a str> {
    let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
    for keyword in rule.keywords {
        for (i, col) in lowered.iter().enumerate() {
            if col.contains(keyword) && !rule.exclusions.iter().any(|bad| col.contains(bad)) {
                return Some(columns[i].as_str());
            }
        }
    }
    None
}

/// Best-guess mapping for a dataset.
///
/// Falls back to the first column for date and item, and to the first numeric
/// column for sales.
///
/// # Arguments
/// * `columns` - All headers, in file order.
/// * `numeric` - The numeric-typed subset, in file order.
pub fn infer_mapping(columns: &[String], numeric: &[String]) -> Result<ColumnMapping> {
    let first = columns
        .first()
        .ok_or_else(|| PlannerError::Schema("the file has no columns".into()))?;
    let first_numeric = numeric
        .first()
        .ok_or_else(|| PlannerError::Schema("no numeric column available".into()))?;

    let date_col = detect_column(columns, &DATE_RULE).unwrap_or(first);
    let sales_col = detect_column(numeric, &SALES_RULE).unwrap_or(first_numeric);
    let item_col = detect_column(columns, &ITEM_RULE).unwrap_or(first);

    debug!(date_col, item_col, sales_col, "inferred column roles");

    Ok(ColumnMapping {
        date_col: date_col.to_string(),
        item_col: item_col.to_string(),
        sales_col: sales_col.to_string(),
    })
}
