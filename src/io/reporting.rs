// src/io/reporting.rs

use crate::error::Result;
use crate::model::forecast::{Forecast, PointKind};
use crate::model::series::DailySeries;
use crate::simulation::engine::{ItemRun, RunOutcome};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

/// Float-to-integer convention used on every printed quantity: truncate, never round.
pub fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// The numbers an order report shows, already truncated for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub item: String,
    pub abc_class: String,
    pub service_level_percent: u32,
    pub stockout_risk_percent: u32,
    pub confidence_score: i64,
    pub confidence_tier: String,
    /// On-screen band; `None` for a new product.
    pub confidence_band: Option<String>,
    /// `None` when the forecast could not be scored.
    pub mae: Option<i64>,
    pub horizon_demand: i64,
    pub safety_stock: i64,
    pub order_quantity: i64,
}

impl OrderSummary {
    pub fn from_run(run: &ItemRun) -> Self {
        let reliability = &run.reliability;
        Self {
            item: run.item.clone(),
            abc_class: run.abc_class.to_string(),
            service_level_percent: run.plan.service_level.percent(),
            stockout_risk_percent: run.plan.service_level.stockout_risk_percent(),
            confidence_score: truncate(reliability.score),
            confidence_tier: reliability.tier().label().to_string(),
            confidence_band: reliability.band().map(|b| b.label().to_string()),
            mae: reliability.has_data.then(|| truncate(reliability.mae)),
            horizon_demand: truncate(run.plan.horizon_demand),
            safety_stock: truncate(run.plan.safety_stock),
            order_quantity: truncate(run.plan.order_quantity),
        }
    }
}

/// Plain-text purchase order report for one item run.
pub struct OrderReport<'a> {
    pub run: &'a ItemRun,
    pub horizon_days: usize,
    pub report_date: NaiveDate,
}

impl fmt::Display for OrderReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = OrderSummary::from_run(self.run);
        let level = self.run.plan.service_level;

        writeln!(f, "SUPPLY CHAIN FORECAST - ORDER REPORT")?;
        writeln!(f, "Report date: {}", self.report_date.format("%d/%m/%Y"))?;
        writeln!(f)?;

        writeln!(f, "PRODUCT: {}", s.item)?;
        writeln!(f, "  ABC class: {}", s.abc_class)?;
        writeln!(
            f,
            "  Target service level: {}% ({}, {}% stock-out risk accepted)",
            s.service_level_percent,
            level.description(),
            s.stockout_risk_percent
        )?;
        writeln!(f)?;

        writeln!(f, "FORECAST RELIABILITY")?;
        writeln!(
            f,
            "  Confidence score: {}/100 ({})",
            s.confidence_score, s.confidence_tier
        )?;
        match &s.confidence_band {
            Some(band) => writeln!(f, "  Assessment: {}", band)?,
            None => writeln!(
                f,
                "  Assessment: new product, not enough history to grade the forecast"
            )?,
        }
        match s.mae {
            Some(mae) => writeln!(f, "  Mean absolute error: {} units/day", mae)?,
            None => writeln!(f, "  Mean absolute error: N/A (insufficient history)")?,
        }
        writeln!(f)?;

        writeln!(f, "REPLENISHMENT PLAN ({} days)", self.horizon_days)?;
        writeln!(f, "  Demand forecast: {} units", s.horizon_demand)?;
        writeln!(f, "  Safety stock:    {} units", s.safety_stock)?;
        writeln!(f)?;
        writeln!(f, "  RECOMMENDED ORDER: {} units", s.order_quantity)
    }
}

/// Renders the order report as text.
///
/// # Arguments
/// * `run` - The item run to report on.
/// * `horizon_days` - Length of the planning horizon, shown in the section title.
/// * `report_date` - Date printed in the header.
pub fn render_order_report(run: &ItemRun, horizon_days: usize, report_date: NaiveDate) -> String {
    OrderReport {
        run,
        horizon_days,
        report_date,
    }
    .to_string()
}

/// Writes the order report to a text file.
pub fn write_order_report(path: &Path, report: &OrderReport<'_>) -> Result<()> {
    std::fs::write(path, report.to_string())?;
    info!(path = %path.display(), item = %report.run.item, "order report written");
    Ok(())
}

#[derive(Debug, Serialize)]
struct ForecastRow {
    date: NaiveDate,
    predicted: f64,
    kind: PointKind,
}

/// Writes the forecast (fitted and future days) to CSV.
pub fn write_forecast_csv(path: &Path, forecast: &Forecast) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for p in forecast.points() {
        wtr.serialize(ForecastRow {
            date: p.date,
            predicted: p.predicted,
            kind: p.kind,
        })?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = forecast.points().len(), "forecast exported");
    Ok(())
}

#[derive(Debug, Serialize)]
struct HistoryRow {
    date: NaiveDate,
    quantity: f64,
    rolling_mean_7d: Option<f64>,
}

/// Writes the daily history with its 7-day moving average to CSV.
pub fn write_history_csv(path: &Path, series: &DailySeries) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let rolling = series.rolling_mean(7);
    for (point, rolling_mean_7d) in series.points().iter().zip(rolling) {
        wtr.serialize(HistoryRow {
            date: point.date,
            quantity: point.quantity,
            rolling_mean_7d,
        })?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = series.len(), "history exported");
    Ok(())
}

/// JSON view of a run: the display summary plus the raw numbers behind it.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub summary: OrderSummary,
    pub outcome: &'a RunOutcome,
}

pub fn run_report_json(outcome: &RunOutcome) -> Result<String> {
    let report = RunReport {
        summary: OrderSummary::from_run(&outcome.run),
        outcome,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::abc::AbcClass;
    use crate::model::plan::{ReliabilityReport, ReplenishmentPlan, SafetyStockPolicy};
    use crate::simulation::config::ServiceLevel;

    fn run(reliability: ReliabilityReport) -> ItemRun {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ItemRun {
            item: "WIDGET-1".into(),
            abc_class: AbcClass::B,
            series: DailySeries::from_values("WIDGET-1", start, &[10.0; 20]),
            forecast: None,
            reliability,
            plan: ReplenishmentPlan {
                horizon_demand: 299.99,
                safety_stock: 12.7,
                order_quantity: 312.69,
                service_level: ServiceLevel::P95,
                policy: SafetyStockPolicy::ErrorBased,
            },
        }
    }

    #[test]
    fn quantities_are_truncated_not_rounded() {
        let r = run(ReliabilityReport {
            mae: 3.9,
            rmse: 7.7,
            score: 81.99,
            sample_size: 20,
            has_data: true,
        });
        let s = OrderSummary::from_run(&r);
        assert_eq!(s.horizon_demand, 299);
        assert_eq!(s.safety_stock, 12);
        assert_eq!(s.order_quantity, 312);
        assert_eq!(s.confidence_score, 81);
        assert_eq!(s.mae, Some(3));
        assert_eq!(s.confidence_tier, "High");
    }

    #[test]
    fn report_lists_every_field() {
        let r = run(ReliabilityReport {
            mae: 0.0,
            rmse: 0.0,
            score: 100.0,
            sample_size: 20,
            has_data: true,
        });
        let text = render_order_report(&r, 30, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert!(text.contains("Report date: 16/10/2026"));
        assert!(text.contains("PRODUCT: WIDGET-1"));
        assert!(text.contains("ABC class: B"));
        assert!(text.contains("95% (Secure (recommended), 5% stock-out risk accepted)"));
        assert!(text.contains("Confidence score: 100/100 (High)"));
        assert!(text.contains("Mean absolute error: 0 units/day"));
        assert!(text.contains("Demand forecast: 299 units"));
        assert!(text.contains("RECOMMENDED ORDER: 312 units"));
    }

    #[test]
    fn unscorable_run_prints_na() {
        let r = run(ReliabilityReport::unscorable(3));
        let text = render_order_report(&r, 30, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert!(text.contains("N/A (insufficient history)"));
        assert!(text.contains("0/100 (Low (new product))"));
    }

    #[test]
    fn history_export_has_rolling_mean() {
        let r = run(ReliabilityReport::unscorable(0));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        write_history_csv(&path, &r.series).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,quantity,rolling_mean_7d");
        assert_eq!(lines[1], "2024-01-01,10.0,");
        assert_eq!(lines[7], "2024-01-07,10.0,10.0");
    }
}
