// src/model/forecast.rs

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// Inside the observed history; used for backtesting.
    Fitted,
    /// Beyond the last observed day.
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub kind: PointKind,
}

/// Output of one model fit for one item: fitted history followed by the horizon.
///
/// Never mutated after construction; a re-run produces a new `Forecast`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub item: String,
    /// Name of the model that produced it.
    pub model: String,
    points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Assembles a forecast from per-day predictions.
    ///
    /// # Arguments
    /// * `history_start` - First observed day; predictions are assigned one per day from here.
    /// * `history_len` - How many leading predictions cover observed days.
    /// * `predictions` - Fitted values followed by future values.
    pub fn new(
        item: impl Into<String>,
        model: impl Into<String>,
        history_start: NaiveDate,
        history_len: usize,
        predictions: &[f64],
    ) -> Self {
        let points = history_start
            .iter_days()
            .zip(predictions.iter())
            .enumerate()
            .map(|(i, (date, &predicted))| ForecastPoint {
                date,
                predicted,
                kind: if i < history_len {
                    PointKind::Fitted
                } else {
                    PointKind::Future
                },
            })
            .collect();
        Self {
            item: item.into(),
            model: model.into(),
            points,
        }
    }

    /// Copy of this forecast with every prediction raised to at least zero.
    pub fn clipped(&self) -> Self {
        Self {
            item: self.item.clone(),
            model: self.model.clone(),
            points: self
                .points
                .iter()
                .map(|p| ForecastPoint {
                    predicted: p.predicted.max(0.0),
                    ..*p
                })
                .collect(),
        }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn fitted(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.kind == PointKind::Fitted)
    }

    pub fn future(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(|p| p.kind == PointKind::Future)
    }

    pub fn horizon_len(&self) -> usize {
        self.future().count()
    }

    /// Sum of predicted demand over the future horizon.
    pub fn horizon_total(&self) -> f64 {
        self.future().map(|p| p.predicted).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_fitted_and_future() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let f = Forecast::new("A", "stub", start, 3, &[1.0, 2.0, 3.0, -4.0, 5.0]);
        assert_eq!(f.fitted().count(), 3);
        assert_eq!(f.horizon_len(), 2);
        assert_eq!(f.points()[3].date, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
        assert_eq!(f.horizon_total(), 1.0);
        assert_eq!(f.clipped().horizon_total(), 5.0);
    }
}
