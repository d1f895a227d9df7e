// src/strategy/mod.rs

pub mod engine;
pub mod implementations;
pub mod optimization;
pub mod reliability;
pub mod traits;
