// src/error.rs

use thiserror::Error;

/// Every failure the planning pipeline can surface.
///
/// `Schema`, `DateParse` and `Config` stop a run before any forecast is
/// computed. `InsufficientHistory` is only ever recovered by the
/// replenishment step, which switches to the flat buffer policy.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("SchemaError: {0}")]
    Schema(String),

    #[error("DateParseError: column '{column}' has no readable dates ({failed} of {rows} rows failed)")]
    DateParse {
        column: String,
        rows: usize,
        failed: usize,
    },

    #[error("InsufficientHistoryError: {observed} day(s) of history, at least {required} required")]
    InsufficientHistory { observed: usize, required: usize },

    #[error("ConfigError: {0}")]
    Config(String),

    #[error("ModelError: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
