// src/model/mod.rs

pub mod forecast;
pub mod plan;
pub mod series;
pub mod table;
