// src/strategy/engine.rs

use crate::error::{PlannerError, Result};
use crate::model::forecast::Forecast;
use crate::model::series::DailySeries;
use crate::strategy::traits::ForecastModel;
use tracing::info;

/// Wraps a forecasting model with the checks every run needs.
///
/// The engine refuses series shorter than `min_history_days`, verifies the
/// model returned one point per day and clips predictions at zero.
#[derive(Debug)]
pub struct ForecastEngine {
    model: Box<dyn ForecastModel>,
    horizon: usize,
    min_history_days: usize,
}

impl ForecastEngine {
    pub fn new(model: Box<dyn ForecastModel>, horizon: usize, min_history_days: usize) -> Self {
        Self {
            model,
            horizon,
            min_history_days: min_history_days.max(2),
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Projects `horizon` days past the end of `series`.
    pub fn run(&self, series: &DailySeries) -> Result<Forecast> {
        if series.len() < self.min_history_days {
            return Err(PlannerError::InsufficientHistory {
                observed: series.len(),
                required: self.min_history_days,
            });
        }
        let raw = self.model.fit_and_forecast(series, self.horizon)?;

        let expected = series.len() + self.horizon;
        if raw.points().len() != expected || raw.horizon_len() != self.horizon {
            return Err(PlannerError::Model(format!(
                "model '{}' returned {} points for '{}', expected {}",
                self.model.name(),
                raw.points().len(),
                series.item,
                expected
            )));
        }
        if raw.points().iter().any(|p| !p.predicted.is_finite()) {
            return Err(PlannerError::Model(format!(
                "model '{}' produced non-finite predictions for '{}'",
                self.model.name(),
                series.item
            )));
        }

        let forecast = raw.clipped();
        info!(
            item = %series.item,
            model = self.model.name(),
            horizon = self.horizon,
            horizon_total = forecast.horizon_total(),
            "forecast ready"
        );
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::implementations::MeanModel;
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct NegativeModel;

    impl ForecastModel for NegativeModel {
        fn name(&self) -> &str {
            "negative"
        }

        fn fit_and_forecast(&self, series: &DailySeries, horizon: usize) -> Result<Forecast> {
            let preds = vec![-3.0; series.len() + horizon];
            Ok(Forecast::new(
                series.item.clone(),
                self.name(),
                series.first_date().unwrap(),
                series.len(),
                &preds,
            ))
        }
    }

    #[derive(Debug)]
    struct ShortModel;

    impl ForecastModel for ShortModel {
        fn name(&self) -> &str {
            "short"
        }

        fn fit_and_forecast(&self, series: &DailySeries, _horizon: usize) -> Result<Forecast> {
            Ok(Forecast::new(
                series.item.clone(),
                self.name(),
                series.first_date().unwrap(),
                series.len(),
                &series.values(),
            ))
        }
    }

    fn series(days: usize) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        DailySeries::from_values("I", start, &vec![3.0; days])
    }

    #[test]
    fn three_days_is_insufficient_history() {
        let engine = ForecastEngine::new(Box::new(MeanModel::new()), 30, 7);
        let err = engine.run(&series(3)).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InsufficientHistory {
                observed: 3,
                required: 7
            }
        ));
    }

    #[test]
    fn predictions_are_clipped_at_zero() {
        let engine = ForecastEngine::new(Box::new(NegativeModel), 30, 7);
        let f = engine.run(&series(10)).unwrap();
        assert!(f.points().iter().all(|p| p.predicted == 0.0));
        assert_eq!(f.horizon_len(), 30);
    }

    #[test]
    fn malformed_model_output_is_rejected() {
        let engine = ForecastEngine::new(Box::new(ShortModel), 30, 7);
        assert!(matches!(
            engine.run(&series(10)),
            Err(PlannerError::Model(_))
        ));
    }
}
