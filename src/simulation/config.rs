// src/simulation/config.rs

use crate::error::{PlannerError, Result};
use crate::model::table::ColumnOverrides;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Target probability of not stocking out over the horizon.
///
/// Only the four levels planners pick from are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ServiceLevel {
    P80,
    P90,
    #[default]
    P95,
    P99,
}

impl ServiceLevel {
    pub const ALL: [ServiceLevel; 4] = [
        ServiceLevel::P80,
        ServiceLevel::P90,
        ServiceLevel::P95,
        ServiceLevel::P99,
    ];

    pub fn as_f64(&self) -> f64 {
        match self {
            ServiceLevel::P80 => 0.80,
            ServiceLevel::P90 => 0.90,
            ServiceLevel::P95 => 0.95,
            ServiceLevel::P99 => 0.99,
        }
    }

    /// Whole-number percentage, e.g. 95.
    pub fn percent(&self) -> u32 {
        match self {
            ServiceLevel::P80 => 80,
            ServiceLevel::P90 => 90,
            ServiceLevel::P95 => 95,
            ServiceLevel::P99 => 99,
        }
    }

    /// Accepted stock-out risk in percent.
    pub fn stockout_risk_percent(&self) -> u32 {
        100 - self.percent()
    }

    pub fn description(&self) -> &'static str {
        match self {
            ServiceLevel::P80 => "Economy (low stock)",
            ServiceLevel::P90 => "Standard (balanced)",
            ServiceLevel::P95 => "Secure (recommended)",
            ServiceLevel::P99 => "Premium (zero stock-out)",
        }
    }
}

impl TryFrom<f64> for ServiceLevel {
    type Error = PlannerError;

    fn try_from(value: f64) -> Result<Self> {
        ServiceLevel::ALL
            .into_iter()
            .find(|level| (level.as_f64() - value).abs() < 1e-9)
            .ok_or_else(|| {
                PlannerError::Config(format!(
                    "service level {} is not one of 0.80, 0.90, 0.95, 0.99",
                    value
                ))
            })
    }
}

impl From<ServiceLevel> for f64 {
    fn from(level: ServiceLevel) -> f64 {
        level.as_f64()
    }
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Which forecasting model backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Trend plus weekly and yearly seasonality.
    #[default]
    Seasonal,
    /// Flat historical mean.
    Mean,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub service_level: ServiceLevel,
    pub horizon_days: usize,
    /// Shortest daily series the forecast engine will fit.
    pub min_history_days: usize,
    /// A backtest is scorable only with strictly more joined days than this.
    pub min_scorable_points: usize,
    /// Share of horizon demand held as safety stock when the forecast can't be scored.
    pub fallback_buffer: f64,
    /// Failure share of the first date pass above which the mixed pass runs.
    pub date_failure_threshold: f64,
    pub model: ModelKind,
    pub columns: ColumnOverrides,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            service_level: ServiceLevel::P95,
            horizon_days: 30,
            min_history_days: 7,
            min_scorable_points: 10,
            fallback_buffer: 0.5,
            date_failure_threshold: 0.30,
            model: ModelKind::Seasonal,
            columns: ColumnOverrides::default(),
        }
    }
}

impl PlannerConfig {
    /// Loads a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: PlannerConfig = serde_json::from_str(&text).map_err(|e| {
            PlannerError::Config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(PlannerError::Config("horizon_days must be at least 1".into()));
        }
        if self.min_history_days < 2 {
            return Err(PlannerError::Config(
                "min_history_days must be at least 2".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.date_failure_threshold) {
            return Err(PlannerError::Config(
                "date_failure_threshold must be within 0..=1".into(),
            ));
        }
        if !(self.fallback_buffer >= 0.0) {
            return Err(PlannerError::Config(
                "fallback_buffer must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
