// src/strategy/traits.rs

use crate::error::Result;
use crate::model::forecast::Forecast;
use crate::model::series::DailySeries;
use std::fmt::Debug;

/// A forecasting capability the engine treats as a black box.
///
/// We require `Debug` so the configured model shows up in logs.
/// We require `Send` + `Sync` so one model can serve several runs.
pub trait ForecastModel: Debug + Send + Sync {
    /// Short name recorded on every forecast this model produces.
    fn name(&self) -> &str;

    /// Fits the model on `series` and predicts every historical day plus
    /// `horizon` future days.
    ///
    /// Implementations must be deterministic for the same input. The result
    /// must hold `series.len() + horizon` points starting at the series'
    /// first date.
    fn fit_and_forecast(&self, series: &DailySeries, horizon: usize) -> Result<Forecast>;
}
