// src/analysis/abc.rs

use crate::error::Result;
use crate::model::table::{parse_number, RawTable};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

/// Cumulative share up to which items are class A.
pub const CLASS_A_LIMIT: f64 = 0.80;
/// Cumulative share up to which items are class B.
pub const CLASS_B_LIMIT: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    fn from_cumulative_share(share: f64) -> Self {
        if share <= CLASS_A_LIMIT {
            AbcClass::A
        } else if share <= CLASS_B_LIMIT {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbcEntry {
    pub item: String,
    pub total_sales: f64,
    pub cumulative_share: f64,
    pub class: AbcClass,
}

/// Item classes over the whole dataset, ranked by descending sales.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AbcAssignment {
    pub ranked: Vec<AbcEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl AbcAssignment {
    fn from_ranked(ranked: Vec<AbcEntry>) -> Self {
        let index = ranked
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.item.clone(), i))
            .collect();
        Self { ranked, index }
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Class for a known item, `None` otherwise.
    pub fn get(&self, item: &str) -> Option<AbcClass> {
        self.index.get(item).map(|&i| self.ranked[i].class)
    }

    /// Class for an item, defaulting unknown items to C.
    pub fn class_of(&self, item: &str) -> AbcClass {
        self.get(item).unwrap_or(AbcClass::C)
    }

    pub fn count(&self, class: AbcClass) -> usize {
        self.ranked.iter().filter(|e| e.class == class).count()
    }
}

/// Sales totals per item from (item, sales) pairs.
///
/// Non-numeric sales and blank item ids are skipped. The map is ordered by
/// item id so the later ranking is reproducible.
pub fn totals_by_item<'a, I>(pairs: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for (item, sales) in pairs {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if let Some(value) = parse_number(sales) {
            *totals.entry(item.to_string()).or_insert(0.0) += value;
        }
    }
    totals
}

/// Ranks items by total sales and assigns classes by cumulative share.
///
/// Equal totals keep their item-id order (the sort is stable). A zero grand
/// total gives an empty assignment, so every item reads as C.
pub fn classify_totals(totals: BTreeMap<String, f64>) -> AbcAssignment {
    let mut ranked: Vec<(String, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let grand_total: f64 = ranked.iter().map(|(_, total)| total).sum();
    if grand_total == 0.0 {
        return AbcAssignment::default();
    }

    let mut cumulative = 0.0;
    let entries = ranked
        .into_iter()
        .map(|(item, total_sales)| {
            cumulative += total_sales / grand_total;
            AbcEntry {
                item,
                total_sales,
                cumulative_share: cumulative,
                class: AbcClass::from_cumulative_share(cumulative),
            }
        })
        .collect();

    AbcAssignment::from_ranked(entries)
}

/// ABC classes for every item in the table.
pub fn classify_items(table: &RawTable, item_col: &str, sales_col: &str) -> Result<AbcAssignment> {
    let item_idx = table.require_column(item_col)?;
    let sales_idx = table.require_column(sales_col)?;

    let totals = totals_by_item(
        (0..table.len()).map(|row| (table.cell(row, item_idx), table.cell(row, sales_idx))),
    );
    let assignment = classify_totals(totals);

    debug!(
        items = assignment.len(),
        a = assignment.count(AbcClass::A),
        b = assignment.count(AbcClass::B),
        c = assignment.count(AbcClass::C),
        "abc classification done"
    );
    Ok(assignment)
}
