// src/analysis/dates.rs

use crate::error::{PlannerError, Result};
use crate::model::table::RawTable;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

/// Day-first formats. The first pass picks one of these and applies it to the whole column.
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%y",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Extra formats only the mixed pass tries, value by value.
const MIXED_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatePass {
    /// One day-first format inferred from the first readable value.
    DayFirst,
    /// Each value parsed independently against every known format.
    Mixed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateParseSummary {
    pub column: String,
    pub pass: DatePass,
    pub total_rows: usize,
    pub dropped_rows: usize,
}

/// The table after date parsing: unreadable rows removed, one date per remaining row.
#[derive(Debug, Clone)]
pub struct DatedTable {
    pub table: RawTable,
    pub dates: Vec<NaiveDate>,
    pub summary: DateParseSummary,
}

fn parse_with(value: &str, format: &str) -> Option<NaiveDate> {
    let date = if format.contains("%H") {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(value, format).ok()
    };
    // %Y happily reads "24" as year 24; leave two-digit years to %y
    date.filter(|d| (1900..=2200).contains(&d.year()))
}

/// Tries every known format on a single value, day-first before month-first.
pub fn parse_mixed(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DAY_FIRST_FORMATS
        .iter()
        .chain(MIXED_FORMATS.iter())
        .find_map(|format| parse_with(value, format))
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// First pass: lock onto the first day-first format that reads any value.
pub fn parse_day_first(values: &[&str]) -> Vec<Option<NaiveDate>> {
    let format = values.iter().find_map(|v| {
        let v = v.trim();
        DAY_FIRST_FORMATS
            .iter()
            .find(|format| parse_with(v, format).is_some())
    });

    match format {
        Some(format) => values.iter().map(|v| parse_with(v.trim(), format)).collect(),
        None => vec![None; values.len()],
    }
}

/// Parses `column` and drops the rows whose date stays unreadable.
///
/// The mixed pass only runs when the day-first pass fails on more than
/// `failure_threshold` of the rows. It works on the buffered cells, so the
/// input file is never re-opened.
pub fn parse_date_column(
    table: RawTable,
    column: &str,
    failure_threshold: f64,
) -> Result<DatedTable> {
    let col = table.require_column(column)?;
    let values: Vec<&str> = (0..table.len()).map(|row| table.cell(row, col)).collect();
    let total_rows = values.len();

    let mut pass = DatePass::DayFirst;
    let mut parsed = parse_day_first(&values);
    let mut failed = parsed.iter().filter(|d| d.is_none()).count();

    if total_rows > 0 && failed as f64 / total_rows as f64 > failure_threshold {
        info!(
            column,
            failed, total_rows, "day-first date pass too lossy, retrying with mixed formats"
        );
        pass = DatePass::Mixed;
        parsed = values.iter().map(|v| parse_mixed(v)).collect();
        failed = parsed.iter().filter(|d| d.is_none()).count();
    }

    if failed == total_rows {
        return Err(PlannerError::DateParse {
            column: column.to_string(),
            rows: total_rows,
            failed,
        });
    }
    if failed > 0 {
        warn!(column, dropped = failed, "dropping rows with unreadable dates");
    }

    let keep: Vec<bool> = parsed.iter().map(Option::is_some).collect();
    let dates: Vec<NaiveDate> = parsed.into_iter().flatten().collect();
    let mut table = table;
    table.retain_rows(&keep);

    Ok(DatedTable {
        table,
        dates,
        summary: DateParseSummary {
            column: column.to_string(),
            pass,
            total_rows,
            dropped_rows: failed,
        },
    })
}
