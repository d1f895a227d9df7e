// src/model/table.rs

use crate::error::{PlannerError, Result};
use serde::{Deserialize, Serialize};

/// An uploaded sales export, buffered in memory as untyped text cells.
///
/// Column roles are unknown until the schema inferencer binds them.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Field delimiter detected while loading.
    pub delimiter: u8,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            headers,
            rows,
            delimiter,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like `column_index`, but a missing column is a schema failure.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            PlannerError::Schema(format!(
                "column '{}' not found (available: {})",
                name,
                self.headers.join(", ")
            ))
        })
    }

    /// Cell text, or "" for short rows.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(String::as_str).unwrap_or("")
    }

    /// Columns where every non-empty cell is a number (and at least one cell is filled).
    pub fn numeric_columns(&self) -> Vec<String> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(col, _)| {
                let mut filled = 0usize;
                for row in &self.rows {
                    let value = row.get(*col).map(|s| s.trim()).unwrap_or("");
                    if value.is_empty() {
                        continue;
                    }
                    if parse_number(value).is_none() {
                        return false;
                    }
                    filled += 1;
                }
                filled > 0
            })
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Keep only the rows whose index is set in `keep`.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        let mut flags = keep.iter();
        self.rows.retain(|_| *flags.next().unwrap_or(&false));
    }
}

/// Lenient numeric coercion: blank or non-numeric text becomes `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Which column plays which role. Immutable once forecasting starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date_col: String,
    pub item_col: String,
    pub sales_col: String,
}

/// Explicit user column choices. Any field set here beats the inferred guess.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverrides {
    pub date_col: Option<String>,
    pub item_col: Option<String>,
    pub sales_col: Option<String>,
}

impl ColumnOverrides {
    pub fn is_empty(&self) -> bool {
        self.date_col.is_none() && self.item_col.is_none() && self.sales_col.is_none()
    }
}

impl ColumnMapping {
    /// Returns a new mapping with the overrides applied on top of `self`.
    ///
    /// Overridden columns must exist; the sales column must also be numeric.
    pub fn with_overrides(
        &self,
        overrides: &ColumnOverrides,
        headers: &[String],
        numeric: &[String],
    ) -> Result<ColumnMapping> {
        let check = |name: &String, pool: &[String], role: &str| -> Result<String> {
            if pool.contains(name) {
                Ok(name.clone())
            } else {
                Err(PlannerError::Schema(format!(
                    "{} column override '{}' is not one of: {}",
                    role,
                    name,
                    pool.join(", ")
                )))
            }
        };

        Ok(ColumnMapping {
            date_col: match &overrides.date_col {
                Some(name) => check(name, headers, "date")?,
                None => self.date_col.clone(),
            },
            item_col: match &overrides.item_col {
                Some(name) => check(name, headers, "item")?,
                None => self.item_col.clone(),
            },
            sales_col: match &overrides.sales_col {
                Some(name) => check(name, numeric, "sales")?,
                None => self.sales_col.clone(),
            },
        })
    }
}
