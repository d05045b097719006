// src/handlers/mod.rs

pub mod analytics;
pub mod attempt;
pub(crate) mod queries;
pub mod result;
