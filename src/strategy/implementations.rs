// src/strategy/implementations.rs

use crate::error::{PlannerError, Result};
use crate::model::forecast::Forecast;
use crate::model::series::DailySeries;
use crate::strategy::traits::ForecastModel;
use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;
use tracing::debug;

// =========================================================================
// 1. Mean Model (Flat Baseline)
// =========================================================================

/// Projects the historical daily mean, flat, over every day.
/// Useful as a baseline and for very erratic items.
#[derive(Debug, Clone, Default)]
pub struct MeanModel;

impl MeanModel {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastModel for MeanModel {
    fn name(&self) -> &str {
        "mean"
    }

    fn fit_and_forecast(&self, series: &DailySeries, horizon: usize) -> Result<Forecast> {
        let start = series.first_date().ok_or(PlannerError::InsufficientHistory {
            observed: 0,
            required: 1,
        })?;
        let mean = series.mean();
        let predictions = vec![mean; series.len() + horizon];
        Ok(Forecast::new(
            series.item.clone(),
            self.name(),
            start,
            series.len(),
            &predictions,
        ))
    }
}

// =========================================================================
// 2. Seasonal Trend Model (Additive Decomposition)
// =========================================================================
// y(t) = intercept + slope * t + weekly(t) + yearly(t)
//
// Seasonal components are Fourier series keyed to the calendar, so a
// Monday effect stays a Monday effect in the projection. Coefficients come
// from ridge-regularised least squares on max-scaled values; only the
// intercept is unpenalised.
//
// Each block only enters the fit once the history covers it: weekly terms
// after two weeks, yearly terms after a full year (at full order after
// two), the trend after four weeks. The slope is shrunk by its t-statistic
// and projected at most half the history span past the last observed day.

const WEEK_DAYS: f64 = 7.0;
const YEAR_DAYS: f64 = 365.25;
/// History needed before weekly terms are fitted.
const MIN_WEEKLY_DAYS: usize = 14;
/// History needed before any yearly term is fitted.
const MIN_YEARLY_DAYS: usize = 365;
/// History at which the yearly block reaches its configured order.
const FULL_YEARLY_DAYS: usize = 730;

#[derive(Debug, Clone)]
pub struct SeasonalTrendModel {
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    /// Fourier order of the weekly component.
    pub weekly_order: usize,
    /// Fourier order of the yearly component once two years are observed.
    pub yearly_order: usize,
    /// Ridge weight on seasonal coefficients (0.1 = gentle shrinkage).
    pub seasonality_penalty: f64,
    /// Ridge weight on the slope.
    pub trend_penalty: f64,
    /// Shortest history on which a slope is fitted at all.
    pub min_trend_days: usize,
    /// Slope t-statistic at which none of the trend is kept; the kept share
    /// is `1 - (c / t)^2`.
    pub trend_significance: f64,
    /// How far past the last observed day the trend keeps moving, as a
    /// fraction of the history span. The projection is flat beyond that.
    pub trend_extrapolation: f64,
}

impl Default for SeasonalTrendModel {
    fn default() -> Self {
        Self {
            yearly_seasonality: true,
            weekly_seasonality: true,
            weekly_order: 3,
            yearly_order: 10,
            seasonality_penalty: 0.1,
            trend_penalty: 1e-6,
            min_trend_days: 28,
            trend_significance: 3.0,
            trend_extrapolation: 0.5,
        }
    }
}

/// The design columns a given history length supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Terms {
    trend: bool,
    weekly_order: usize,
    yearly_order: usize,
}

impl Terms {
    fn columns(&self) -> usize {
        1 + usize::from(self.trend) + 2 * (self.weekly_order + self.yearly_order)
    }

    /// One design-matrix row for `date` at centred time `t`.
    fn features(&self, date: NaiveDate, t: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.columns());
        row.push(1.0);
        if self.trend {
            row.push(t);
        }
        let day = date.num_days_from_ce() as f64;
        push_fourier(&mut row, day, WEEK_DAYS, self.weekly_order);
        push_fourier(&mut row, day, YEAR_DAYS, self.yearly_order);
        row
    }
}

impl SeasonalTrendModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn terms_for(&self, days: usize) -> Terms {
        let weekly_order = if self.weekly_seasonality && days >= MIN_WEEKLY_DAYS {
            self.weekly_order
        } else {
            0
        };
        let yearly_order =
            if self.yearly_seasonality && self.yearly_order > 0 && days >= MIN_YEARLY_DAYS {
                (self.yearly_order * days / FULL_YEARLY_DAYS).clamp(1, self.yearly_order)
            } else {
                0
            };
        Terms {
            trend: days >= self.min_trend_days.max(2),
            weekly_order,
            yearly_order,
        }
    }

    /// Ridge penalty per design column.
    fn penalties(&self, terms: Terms) -> Vec<f64> {
        let mut out = vec![0.0];
        if terms.trend {
            out.push(self.trend_penalty);
        }
        out.resize(terms.columns(), self.seasonality_penalty);
        out
    }

    /// Solves `(X'X + diag(penalty)) beta = X'y`.
    /// Returns the coefficients and the penalised normal matrix.
    fn ridge_fit(
        &self,
        terms: Terms,
        inputs: &[(NaiveDate, f64)],
        ys: &[f64],
    ) -> Option<(Vec<f64>, Vec<Vec<f64>>)> {
        let p = terms.columns();
        let mut xtx = vec![vec![0.0; p]; p];
        let mut xty = vec![0.0; p];
        for (&(date, t), &y) in inputs.iter().zip(ys) {
            let row = terms.features(date, t);
            for a in 0..p {
                xty[a] += row[a] * y;
                for b in 0..p {
                    xtx[a][b] += row[a] * row[b];
                }
            }
        }
        for (a, penalty) in self.penalties(terms).into_iter().enumerate() {
            xtx[a][a] += penalty;
        }
        let beta = solve_spd(&xtx, &xty)?;
        Some((beta, xtx))
    }

    /// Share of a fitted slope worth keeping given its sampling variance.
    fn trend_share(&self, slope: f64, variance: f64) -> f64 {
        if slope == 0.0 || !(variance > 0.0) {
            return 1.0;
        }
        (1.0 - self.trend_significance.powi(2) * variance / (slope * slope)).max(0.0)
    }
}

fn push_fourier(row: &mut Vec<f64>, day: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * day / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn degenerate(series: &DailySeries) -> PlannerError {
    PlannerError::Model(format!(
        "could not fit '{}': degenerate design over {} day(s)",
        series.item,
        series.len()
    ))
}

/// Solves `a * x = b` for symmetric positive-definite `a` (Cholesky).
/// Returns `None` when `a` is not positive definite.
fn solve_spd(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    let mut l = vec![vec![0.0; n]; n];

    for j in 0..n {
        let mut diag = a[j][j];
        for k in 0..j {
            diag -= l[j][k] * l[j][k];
        }
        if !(diag > 1e-12) {
            return None;
        }
        l[j][j] = diag.sqrt();

        for i in (j + 1)..n {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            l[i][j] = sum / l[j][j];
        }
    }

    // L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i][k] * z[k];
        }
        z[i] = sum / l[i][i];
    }

    // L^T x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[k][i] * x[k];
        }
        x[i] = sum / l[i][i];
    }
    Some(x)
}

impl ForecastModel for SeasonalTrendModel {
    fn name(&self) -> &str {
        "seasonal-trend"
    }

    fn fit_and_forecast(&self, series: &DailySeries, horizon: usize) -> Result<Forecast> {
        let n = series.len();
        let start = match series.first_date() {
            Some(start) if n >= 2 => start,
            _ => {
                return Err(PlannerError::InsufficientHistory {
                    observed: n,
                    required: 2,
                })
            }
        };

        let values = series.values();
        let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let ys: Vec<f64> = values.iter().map(|v| v / scale).collect();

        // t runs from -0.5 on the first day to 0.5 on the last
        let span = (n - 1) as f64;
        let time = |i: usize| i as f64 / span - 0.5;
        let inputs: Vec<(NaiveDate, f64)> = series
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| (p.date, time(i)))
            .collect();

        let terms = self.terms_for(n);
        let level_terms = Terms {
            trend: false,
            ..terms
        };

        let (beta, xtx) = self
            .ridge_fit(terms, &inputs, &ys)
            .ok_or_else(|| degenerate(series))?;

        let (slope, share, level) = if terms.trend {
            let p = terms.columns();
            let rss: f64 = inputs
                .iter()
                .zip(&ys)
                .map(|(&(date, t), &y)| (y - dot(&terms.features(date, t), &beta)).powi(2))
                .sum();
            let sigma2 = rss / n.saturating_sub(p).max(1) as f64;
            let mut unit = vec![0.0; p];
            unit[1] = 1.0;
            let slope_variance = solve_spd(&xtx, &unit).map_or(0.0, |col| sigma2 * col[1]);

            let share = self.trend_share(beta[1], slope_variance);
            let slope = beta[1] * share;
            let level = if share < 1.0 {
                // refit the other terms around the slope that was kept
                let detrended: Vec<f64> = inputs
                    .iter()
                    .zip(&ys)
                    .map(|(&(_, t), &y)| y - slope * t)
                    .collect();
                self.ridge_fit(level_terms, &inputs, &detrended)
                    .ok_or_else(|| degenerate(series))?
                    .0
            } else {
                let mut level = beta;
                level.remove(1);
                level
            };
            (slope, share, level)
        } else {
            (0.0, 0.0, beta)
        };

        let reach = (n - 1) + (span * self.trend_extrapolation.max(0.0)).round() as usize;
        let predictions: Vec<f64> = start
            .iter_days()
            .take(n + horizon)
            .enumerate()
            .map(|(i, date)| {
                let seasonal = dot(&level_terms.features(date, 0.0), &level);
                (seasonal + slope * time(i.min(reach))) * scale
            })
            .collect();

        debug!(
            item = %series.item,
            days = n,
            horizon,
            weekly_order = terms.weekly_order,
            yearly_order = terms.yearly_order,
            intercept = level[0] * scale,
            slope_per_day = slope * scale / span,
            trend_share = share,
            "seasonal trend model fitted"
        );

        Ok(Forecast::new(
            series.item.clone(),
            self.name(),
            start,
            n,
            &predictions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::demand::generate_normal_demand;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn constant_history_projects_the_same_level() {
        let series = DailySeries::from_values("W", start(), &[10.0; 90]);
        let f = SeasonalTrendModel::new().fit_and_forecast(&series, 30).unwrap();
        assert_eq!(f.points().len(), 120);
        for p in f.points() {
            assert!((p.predicted - 10.0).abs() < 1e-6, "got {}", p.predicted);
        }
        assert!((f.horizon_total() - 300.0).abs() < 1e-4);
    }

    #[test]
    fn weekly_pattern_is_carried_forward() {
        // weekend spikes on a flat base
        let values: Vec<f64> = start()
            .iter_days()
            .take(84)
            .map(|d| if d.weekday().number_from_monday() >= 6 { 30.0 } else { 10.0 })
            .collect();
        let series = DailySeries::from_values("W", start(), &values);
        let f = SeasonalTrendModel::new().fit_and_forecast(&series, 14).unwrap();

        let future: Vec<_> = f.future().collect();
        let saturday = future
            .iter()
            .find(|p| p.date.weekday().number_from_monday() == 6)
            .unwrap();
        let wednesday = future
            .iter()
            .find(|p| p.date.weekday().number_from_monday() == 3)
            .unwrap();
        assert!(saturday.predicted > wednesday.predicted + 10.0);
    }

    #[test]
    fn linear_growth_is_extrapolated() {
        let values: Vec<f64> = (0..60).map(|i| 5.0 + i as f64).collect();
        let series = DailySeries::from_values("G", start(), &values);
        let model = SeasonalTrendModel {
            yearly_seasonality: false,
            weekly_seasonality: false,
            ..SeasonalTrendModel::default()
        };
        let f = model.fit_and_forecast(&series, 10).unwrap();
        let last = f.points().last().unwrap();
        assert!((last.predicted - 74.0).abs() < 1e-3);
    }

    #[test]
    fn trend_stops_moving_half_a_span_past_the_history() {
        let values: Vec<f64> = (0..41).map(|i| i as f64).collect();
        let series = DailySeries::from_values("G", start(), &values);
        let model = SeasonalTrendModel {
            yearly_seasonality: false,
            weekly_seasonality: false,
            ..SeasonalTrendModel::default()
        };
        let f = model.fit_and_forecast(&series, 40).unwrap();
        let points = f.points();
        // span of 40 days, so the slope runs 20 days past day 40
        assert!((points[50].predicted - 50.0).abs() < 1e-3);
        assert!((points[60].predicted - 60.0).abs() < 1e-3);
        assert!((points[80].predicted - 60.0).abs() < 1e-3);
    }

    #[test]
    fn terms_follow_history_coverage() {
        let model = SeasonalTrendModel::new();
        let short = model.terms_for(13);
        assert_eq!((short.trend, short.weekly_order, short.yearly_order), (false, 0, 0));
        let month = model.terms_for(45);
        assert_eq!((month.trend, month.weekly_order, month.yearly_order), (true, 3, 0));
        assert_eq!(model.terms_for(400).yearly_order, 5);
        assert_eq!(model.terms_for(1000).yearly_order, 10);
    }

    #[test]
    fn noisy_stationary_demand_projects_near_its_mean() {
        for days in [15, 45, 60, 200] {
            let values: Vec<f64> = generate_normal_demand(days, 20.0, 6.0, days as u64)
                .unwrap()
                .into_iter()
                .map(f64::from)
                .collect();
            let series = DailySeries::from_values("N", start(), &values);
            let f = SeasonalTrendModel::new().fit_and_forecast(&series, 30).unwrap();

            let expected = series.mean() * 30.0;
            let total = f.horizon_total();
            assert!(
                (total - expected).abs() <= 0.25 * expected,
                "{} days: horizon {} vs mean x 30 = {}",
                days,
                total,
                expected
            );
        }
    }

    #[test]
    fn insignificant_slope_is_dropped() {
        let model = SeasonalTrendModel::new();
        assert_eq!(model.trend_share(0.01, 1.0), 0.0);
        assert_eq!(model.trend_share(2.0, 0.0), 1.0);
        assert!((model.trend_share(1.0, 0.01) - 0.91).abs() < 1e-12);
    }

    #[test]
    fn single_day_is_insufficient() {
        let series = DailySeries::from_values("S", start(), &[4.0]);
        let err = SeasonalTrendModel::new().fit_and_forecast(&series, 30).unwrap_err();
        assert!(matches!(err, PlannerError::InsufficientHistory { observed: 1, .. }));
    }

    #[test]
    fn fit_is_deterministic() {
        let values: Vec<f64> = (0..45).map(|i| ((i * 7919) % 13) as f64).collect();
        let series = DailySeries::from_values("D", start(), &values);
        let model = SeasonalTrendModel::new();
        let a = model.fit_and_forecast(&series, 30).unwrap();
        let b = model.fit_and_forecast(&series, 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mean_model_is_flat() {
        let series = DailySeries::from_values("M", start(), &[2.0, 4.0, 6.0]);
        let f = MeanModel::new().fit_and_forecast(&series, 5).unwrap();
        assert_eq!(f.points().len(), 8);
        assert!(f.points().iter().all(|p| p.predicted == 4.0));
        assert_eq!(f.model, "mean");
    }

    #[test]
    fn cholesky_solves_small_system() {
        let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let x = solve_spd(&a, &[2.0, 1.0]).unwrap();
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);
        assert!(solve_spd(&[vec![0.0]], &[1.0]).is_none());
    }
}
