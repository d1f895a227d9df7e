// src/strategy/reliability.rs

//! Backtest scoring: how well did the fitted curve track the history it was fitted on?

use crate::model::forecast::Forecast;
use crate::model::plan::ReliabilityReport;
use crate::model::series::DailySeries;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::info;

/// Pairs each fitted value with the actual demand of the same day.
///
/// Inner join on date; pairs with a non-finite side are dropped.
/// Returns `(actual, predicted)` in forecast order.
pub fn join_fitted(forecast: &Forecast, series: &DailySeries) -> Vec<(f64, f64)> {
    let actuals: HashMap<NaiveDate, f64> = series
        .points()
        .iter()
        .map(|p| (p.date, p.quantity))
        .collect();

    forecast
        .fitted()
        .filter_map(|p| actuals.get(&p.date).map(|&actual| (actual, p.predicted)))
        .filter(|(actual, predicted)| actual.is_finite() && predicted.is_finite())
        .collect()
}

/// Scores a forecast against the series it was fitted on.
///
/// Needs strictly more than `min_points` joined days; otherwise the report
/// is the "new product" report with `has_data = false`.
///
/// score = max(0, 100 - MAE / mean(actual) * 100), the mean floored to 1
/// when it is not positive.
pub fn score_forecast(
    forecast: &Forecast,
    series: &DailySeries,
    min_points: usize,
) -> ReliabilityReport {
    let pairs = join_fitted(forecast, series);
    let n = pairs.len();
    if n <= min_points {
        info!(item = %series.item, joined = n, "not enough history to score the forecast");
        return ReliabilityReport::unscorable(n);
    }

    let count = n as f64;
    let mae = pairs.iter().map(|(a, p)| (a - p).abs()).sum::<f64>() / count;
    let rmse = (pairs.iter().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / count).sqrt();
    let mean_actual = pairs.iter().map(|(a, _)| a).sum::<f64>() / count;
    let average = if mean_actual > 0.0 { mean_actual } else { 1.0 };
    let score = (100.0 - mae / average * 100.0).clamp(0.0, 100.0);

    info!(item = %series.item, joined = n, mae, rmse, score, "forecast scored");

    ReliabilityReport {
        mae,
        rmse,
        score,
        sample_size: n,
        has_data: true,
    }
}
