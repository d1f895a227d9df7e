// src/model/series.rs

use chrono::NaiveDate;
use serde::Serialize;

/// One calendar day of demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub quantity: f64,
}

/// Daily demand for a single item.
///
/// Dates are strictly increasing and contiguous; quantities are never negative.
/// Only `analysis::series::build_daily_series` (or `from_values`) creates one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub item: String,
    points: Vec<DailyPoint>,
}

impl DailySeries {
    pub(crate) fn from_points(item: String, points: Vec<DailyPoint>) -> Self {
        Self { item, points }
    }

    /// Builds a contiguous series starting at `start`, one value per day.
    /// Negative values are clamped to zero.
    pub fn from_values(item: impl Into<String>, start: NaiveDate, values: &[f64]) -> Self {
        let points = start
            .iter_days()
            .zip(values.iter())
            .map(|(date, &quantity)| DailyPoint {
                date,
                quantity: quantity.max(0.0),
            })
            .collect();
        Self {
            item: item.into(),
            points,
        }
    }

    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.quantity).collect()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.quantity).sum()
    }

    /// Mean demand per day, 0 for an empty series.
    pub fn mean(&self) -> f64 {
        if self.points.is_empty() {
            0.0
        } else {
            self.total() / self.points.len() as f64
        }
    }

    /// Trailing moving average. The first `window - 1` days have no value.
    pub fn rolling_mean(&self, window: usize) -> Vec<Option<f64>> {
        if window == 0 {
            return vec![None; self.points.len()];
        }
        let mut out = Vec::with_capacity(self.points.len());
        let mut running = 0.0;
        for (i, point) in self.points.iter().enumerate() {
            running += point.quantity;
            if i >= window {
                running -= self.points[i - window].quantity;
            }
            if i + 1 >= window {
                out.push(Some(running / window as f64));
            } else {
                out.push(None);
            }
        }
        out
    }
}
