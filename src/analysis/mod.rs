// src/analysis/mod.rs

pub mod abc;
pub mod dates;
pub mod schema;
pub mod series;
