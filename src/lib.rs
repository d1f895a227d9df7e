// src/lib.rs

//! Demand forecasting and replenishment planning for retail sales exports.
//!
//! Raw CSV rows go through schema inference, date parsing and ABC
//! classification, then a single item is turned into a daily series,
//! forecast, scored against its own history and sized into an order.

pub mod analysis;
pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use analysis::abc::{AbcAssignment, AbcClass};
pub use error::{PlannerError, Result};
pub use model::forecast::Forecast;
pub use model::plan::{ReliabilityReport, ReplenishmentPlan, SafetyStockPolicy};
pub use model::series::DailySeries;
pub use model::table::{ColumnMapping, ColumnOverrides, RawTable};
pub use simulation::config::{ModelKind, PlannerConfig, ServiceLevel};
pub use simulation::engine::{ItemRun, PlanningPipeline, PreparedDataset, RunOutcome};
pub use strategy::traits::ForecastModel;
