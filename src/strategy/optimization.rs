// src/strategy/optimization.rs

//! Module for replenishment calculations.
//!
//! Turns a demand projection plus an error estimate into a safety stock and
//! an order quantity for a target service level.

use crate::error::{PlannerError, Result};
use crate::model::forecast::Forecast;
use crate::model::plan::{ReliabilityReport, ReplenishmentPlan, SafetyStockPolicy};
use crate::model::series::DailySeries;
use crate::simulation::config::ServiceLevel;
use tracing::{info, warn};

/// Z-score for a service level.
///
/// Fixed two-decimal table planners are used to; do not swap in an exact quantile.
pub fn z_score(level: ServiceLevel) -> f64 {
    match level {
        ServiceLevel::P80 => 0.84,
        ServiceLevel::P90 => 1.28,
        ServiceLevel::P95 => 1.65,
        ServiceLevel::P99 => 2.33,
    }
}

/// Where the horizon demand comes from.
#[derive(Debug, Clone, Copy)]
pub enum DemandBasis<'a> {
    /// A fitted forecast and its backtest.
    Forecast {
        forecast: &'a Forecast,
        reliability: &'a ReliabilityReport,
    },
    /// No forecast could be fitted; project the historical daily mean.
    History {
        series: &'a DailySeries,
        horizon: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ReplenishmentCalculator {
    service_level: ServiceLevel,
    /// Share of horizon demand held as safety stock when there is no error estimate.
    fallback_buffer: f64,
}

impl ReplenishmentCalculator {
    pub fn new(service_level: ServiceLevel, fallback_buffer: f64) -> Self {
        Self {
            service_level,
            fallback_buffer,
        }
    }

    pub fn service_level(&self) -> ServiceLevel {
        self.service_level
    }

    /// The one place a forecasting failure is absorbed.
    ///
    /// `InsufficientHistory` becomes `Ok(None)` so the caller plans from
    /// history with the flat buffer. Every other error passes through.
    pub fn recover<T>(&self, outcome: Result<T>) -> Result<Option<T>> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(PlannerError::InsufficientHistory { observed, required }) => {
                warn!(
                    observed,
                    required, "forecast unavailable, falling back to a flat safety buffer"
                );
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    /// Sizes safety stock and the order.
    ///
    /// # Formula
    /// Scorable forecast: SafetyStock = z(service level) * RMSE
    /// Otherwise:         SafetyStock = HorizonDemand * fallback_buffer
    /// Order = HorizonDemand + SafetyStock
    pub fn plan(&self, basis: DemandBasis<'_>) -> ReplenishmentPlan {
        let (horizon_demand, rmse) = match basis {
            DemandBasis::Forecast {
                forecast,
                reliability,
            } => (
                forecast.horizon_total(),
                reliability.has_data.then_some(reliability.rmse),
            ),
            DemandBasis::History { series, horizon } => (series.mean() * horizon as f64, None),
        };

        let (safety_stock, policy) = match rmse {
            Some(rmse) => (z_score(self.service_level) * rmse, SafetyStockPolicy::ErrorBased),
            None => (
                horizon_demand * self.fallback_buffer,
                SafetyStockPolicy::FlatBuffer,
            ),
        };

        let plan = ReplenishmentPlan {
            horizon_demand,
            safety_stock,
            order_quantity: horizon_demand + safety_stock,
            service_level: self.service_level,
            policy,
        };
        info!(
            horizon_demand = plan.horizon_demand,
            safety_stock = plan.safety_stock,
            order_quantity = plan.order_quantity,
            policy = ?plan.policy,
            "replenishment plan computed"
        );
        plan
    }
}
