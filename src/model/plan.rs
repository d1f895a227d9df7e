// src/model/plan.rs

use crate::simulation::config::ServiceLevel;
use serde::Serialize;

/// Backtest of a forecast against the observed history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReliabilityReport {
    pub mae: f64,
    pub rmse: f64,
    /// 0..=100, 100 meaning a perfect fit.
    pub score: f64,
    /// Number of days joined between fitted values and actuals.
    /// 0 when no model was fitted at all (see [`ReliabilityReport::no_forecast`]).
    pub sample_size: usize,
    /// False means "new product": too little history to grade the model.
    /// That is a separate path, not a score of 0 meaning a bad fit.
    pub has_data: bool,
}

impl ReliabilityReport {
    /// Report for a forecast too short to grade, carrying how many days did join.
    pub fn unscorable(sample_size: usize) -> Self {
        Self {
            mae: 0.0,
            rmse: 0.0,
            score: 0.0,
            sample_size,
            has_data: false,
        }
    }

    /// Report for an item where no model could be fitted, so nothing was joined.
    pub fn no_forecast() -> Self {
        Self::unscorable(0)
    }

    /// On-screen banding. `None` when the forecast could not be scored.
    pub fn band(&self) -> Option<ConfidenceBand> {
        self.has_data.then(|| ConfidenceBand::from_score(self.score))
    }

    /// Banding printed on the order report.
    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_score(self.score)
    }
}

/// score > 80 Excellent, 60 < score <= 80 Medium, otherwise Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceBand {
    Excellent,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_score(score: f64) -> Self {
        if score > 80.0 {
            ConfidenceBand::Excellent
        } else if score > 60.0 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::Excellent => "Excellent: the model is very reliable",
            ConfidenceBand::Medium => "Medium: volatile sales, use caution",
            ConfidenceBand::Low => "Low: very irregular sales, unreliable",
        }
    }
}

/// score > 70 High, 40 < score <= 70 Medium, otherwise Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            ConfidenceTier::High
        } else if score > 40.0 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low (new product)",
        }
    }
}

/// How the safety stock was sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SafetyStockPolicy {
    /// z(service level) x RMSE of the backtest.
    ErrorBased,
    /// Flat share of horizon demand, used when there is no error estimate.
    FlatBuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReplenishmentPlan {
    pub horizon_demand: f64,
    pub safety_stock: f64,
    /// Always `horizon_demand + safety_stock`.
    pub order_quantity: f64,
    pub service_level: ServiceLevel,
    pub policy: SafetyStockPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_cutoffs() {
        assert_eq!(ConfidenceBand::from_score(80.01), ConfidenceBand::Excellent);
        assert_eq!(ConfidenceBand::from_score(80.0), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_score(60.01), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_score(60.0), ConfidenceBand::Low);
    }

    #[test]
    fn tier_cutoffs() {
        assert_eq!(ConfidenceTier::from_score(70.5), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(70.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(40.0), ConfidenceTier::Low);
    }

    #[test]
    fn unscorable_report_has_no_band() {
        let r = ReliabilityReport::unscorable(4);
        assert_eq!(r.band(), None);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.tier(), ConfidenceTier::Low);
    }

    #[test]
    fn no_forecast_report_joins_nothing() {
        let r = ReliabilityReport::no_forecast();
        assert!(!r.has_data);
        assert_eq!(r.sample_size, 0);
        assert_eq!(r, ReliabilityReport::unscorable(0));
    }
}
