// src/analysis/series.rs

use crate::analysis::dates::DatedTable;
use crate::error::{PlannerError, Result};
use crate::model::series::{DailyPoint, DailySeries};
use crate::model::table::parse_number;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Distinct item ids in order of first appearance.
pub fn list_items(dated: &DatedTable, item_col: &str) -> Result<Vec<String>> {
    let item_idx = dated.table.require_column(item_col)?;
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for row in 0..dated.table.len() {
        let item = dated.table.cell(row, item_idx).trim();
        if !item.is_empty() && seen.insert(item.to_string()) {
            items.push(item.to_string());
        }
    }
    Ok(items)
}

/// Resamples (date, quantity) observations to one value per calendar day.
///
/// Same-day entries are summed, days without entries become 0 and the
/// span runs from the earliest to the latest date inclusive.
pub fn resample_daily(item: &str, observations: &[(NaiveDate, f64)]) -> DailySeries {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for &(date, quantity) in observations {
        *by_day.entry(date).or_insert(0.0) += quantity;
    }

    let (first, last) = match (by_day.keys().next(), by_day.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return DailySeries::from_points(item.to_string(), Vec::new()),
    };

    let mut clamped = 0usize;
    let points: Vec<DailyPoint> = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| {
            let quantity = by_day.get(&date).copied().unwrap_or(0.0);
            if quantity < 0.0 {
                clamped += 1;
            }
            DailyPoint {
                date,
                quantity: quantity.max(0.0),
            }
        })
        .collect();

    if clamped > 0 {
        warn!(item, days = clamped, "negative daily totals clamped to zero");
    }
    DailySeries::from_points(item.to_string(), points)
}

/// Builds the daily demand series for one item.
///
/// A sales cell that is not a number counts as 0 on its date, so an item
/// with no readable sales still gets an all-zero series over its span.
pub fn build_daily_series(
    dated: &DatedTable,
    item_col: &str,
    sales_col: &str,
    item: &str,
) -> Result<DailySeries> {
    let item_idx = dated.table.require_column(item_col)?;
    let sales_idx = dated.table.require_column(sales_col)?;

    let mut unreadable = 0usize;
    let observations: Vec<(NaiveDate, f64)> = (0..dated.table.len())
        .filter(|&row| dated.table.cell(row, item_idx).trim() == item)
        .map(|row| {
            let qty = parse_number(dated.table.cell(row, sales_idx)).unwrap_or_else(|| {
                unreadable += 1;
                0.0
            });
            (dated.dates[row], qty)
        })
        .collect();

    if observations.is_empty() {
        return Err(PlannerError::Schema(format!(
            "item '{}' has no rows in column '{}'",
            item, item_col
        )));
    }
    if unreadable > 0 {
        warn!(item, sales_col, rows = unreadable, "non-numeric sales counted as zero");
    }

    let series = resample_daily(item, &observations);
    debug!(
        item,
        rows = observations.len(),
        days = series.len(),
        "built daily series"
    );
    Ok(series)
}
