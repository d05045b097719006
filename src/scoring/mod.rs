// src/scoring/mod.rs

//! Pure grading and scoring logic.
//!
//! Nothing in here touches the database: handlers load rows, call into
//! these functions and persist what comes back.

pub mod aggregate;
pub mod analytics;
pub mod answer;
pub mod order;
pub mod report;

pub use aggregate::{ScoreCard, grade_attempt};
pub use answer::{Verdict, evaluate};
