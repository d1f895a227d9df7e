// src/io/demand.rs

use crate::error::{PlannerError, Result};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use std::path::Path;

/// One row of a synthetic sales export, shaped like a typical retail CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    #[serde(rename = "Order Date")]
    pub date: String,
    #[serde(rename = "Product Name")]
    pub product: String,
    #[serde(rename = "Units Sold")]
    pub units_sold: u32,
    #[serde(rename = "Unit Price")]
    pub unit_price: f64,
}

/// Generates a demand schedule where every day has the exact same quantity.
/// Useful for testing stability (a perfect forecast should score 100).
pub fn generate_constant_demand(days: usize, value: u32) -> Vec<u32> {
    vec![value; days]
}

/// Generates a demand schedule based on a Normal (Bell Curve) distribution.
///
/// # Arguments
/// * `days` - Length of the schedule.
/// * `mean` - The average daily quantity (e.g., 10.0).
/// * `std_dev` - The standard deviation (volatility) (e.g., 2.0).
/// * `seed` - Seed for the generator, so the same call gives the same schedule.
pub fn generate_normal_demand(days: usize, mean: f64, std_dev: f64, seed: u64) -> Result<Vec<u32>> {
    let normal = Normal::new(mean, std_dev)
        .map_err(|e| PlannerError::Config(format!("invalid demand distribution: {}", e)))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let schedule = (0..days)
        .map(|_| {
            // Round to nearest unit and clamp negatives (demand cannot be negative).
            let val: f64 = normal.sample(&mut rng);
            val.round().max(0.0) as u32
        })
        .collect();
    Ok(schedule)
}

/// Generates a weekly pattern: `weekday` units Monday to Friday, `weekend` units on Saturday and Sunday.
pub fn generate_weekly_demand(start: NaiveDate, days: usize, weekday: u32, weekend: u32) -> Vec<u32> {
    start
        .iter_days()
        .take(days)
        .map(|d| {
            if d.weekday().number_from_monday() >= 6 {
                weekend
            } else {
                weekday
            }
        })
        .collect()
}

/// Turns a daily schedule into sales rows. Zero days emit no row, like a real export.
pub fn to_sales_records(product: &str, start: NaiveDate, unit_price: f64, schedule: &[u32]) -> Vec<SalesRecord> {
    start
        .iter_days()
        .zip(schedule.iter())
        .filter(|(_, &qty)| qty > 0)
        .map(|(date, &qty)| SalesRecord {
            date: date.format("%d/%m/%Y").to_string(),
            product: product.to_string(),
            units_sold: qty,
            unit_price,
        })
        .collect()
}

/// A small multi-item dataset covering the interesting cases:
/// a steady seller, a noisy seller, a weekend-driven item and a brand new one.
pub fn demo_dataset(start: NaiveDate, seed: u64) -> Result<Vec<SalesRecord>> {
    let mut records = Vec::new();
    records.extend(to_sales_records(
        "WIDGET-1",
        start,
        4.5,
        &generate_constant_demand(90, 10),
    ));
    records.extend(to_sales_records(
        "GADGET-2",
        start,
        12.0,
        &generate_normal_demand(120, 25.0, 5.0, seed)?,
    ));
    records.extend(to_sales_records(
        "GIZMO-3",
        start,
        7.25,
        &generate_weekly_demand(start, 180, 4, 15),
    ));
    let late = start + chrono::Duration::days(177);
    records.extend(to_sales_records("NEW-4", late, 19.99, &[6, 2, 5]));
    Ok(records)
}

/// Writes sales rows as a comma-separated file with headers.
pub fn write_sales_csv(path: &Path, records: &[SalesRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
