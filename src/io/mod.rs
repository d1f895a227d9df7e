// src/io/mod.rs

pub mod demand;
pub mod loader;
pub mod reporting;
