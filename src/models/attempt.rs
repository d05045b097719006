// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{answer::AnswerInput, question::PublicQuestion, test::TestInfo},
};

/// Represents the 'attempts' table in the database.
/// One row per (test, student); read-only once `is_submitted` is set.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub id: i64,
    pub test_id: i64,
    pub student_id: Uuid,

    /// Question IDs in the order fixed when the attempt was created.
    pub question_order: Json<Vec<i64>>,

    pub is_submitted: bool,
    pub total_marks: i64,
    pub obtained_marks: i64,
    pub time_spent_seconds: i64,

    /// Bumped on every save and on submission.
    pub version: i64,

    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Lifecycle of an attempt once its row exists.
/// "Not started" is the absence of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
}

impl Attempt {
    pub fn status(&self) -> AttemptStatus {
        if self.is_submitted {
            AttemptStatus::Submitted
        } else {
            AttemptStatus::InProgress
        }
    }

    /// Rejects writes to a submitted attempt.
    pub fn ensure_in_progress(&self) -> Result<(), AppError> {
        match self.status() {
            AttemptStatus::InProgress => Ok(()),
            AttemptStatus::Submitted => {
                Err(AppError::Conflict("Attempt already submitted".to_string()))
            }
        }
    }

    /// Rejects a save made against an older snapshot of the attempt.
    /// Clients that send no version keep last-write-wins behaviour.
    pub fn check_version(&self, expected: Option<i64>) -> Result<(), AppError> {
        match expected {
            Some(v) if v != self.version => Err(AppError::Conflict(format!(
                "Stale save: attempt is at version {}, request was based on {}",
                self.version, v
            ))),
            _ => Ok(()),
        }
    }

    /// Seconds left on the clock, never negative.
    pub fn remaining_seconds(&self, duration_minutes: i64) -> i64 {
        (duration_minutes * 60 - self.time_spent_seconds).max(0)
    }

    /// Final marks as stored on the attempt row.
    pub fn score_summary(&self) -> SubmitResponse {
        SubmitResponse {
            success: true,
            total_marks: self.total_marks,
            obtained_marks: self.obtained_marks,
            percentage: crate::scoring::aggregate::percentage(self.obtained_marks, self.total_marks),
        }
    }
}

/// Body of `POST /api/tests/{id}/save`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressRequest {
    pub attempt_id: i64,

    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<AnswerInput>,

    /// Seconds elapsed since the previous save.
    #[serde(default)]
    #[validate(range(min = 0, max = 86400))]
    pub time_spent: i64,

    /// Version the client last saw. Omit for last-write-wins.
    pub version: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SaveProgressResponse {
    pub success: bool,
    pub version: i64,
}

/// Body of `POST /api/tests/{id}/submit`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestRequest {
    pub attempt_id: i64,

    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<AnswerInput>,

    /// Seconds elapsed since the last autosave.
    #[serde(default)]
    #[validate(range(min = 0, max = 86400))]
    pub time_spent: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub total_marks: i64,
    pub obtained_marks: i64,
    pub percentage: i64,
}

/// Returned by `POST /api/tests/{id}/start`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTestResponse {
    pub status: AttemptStatus,
    pub attempt_id: i64,
    pub version: i64,
    pub test: TestInfo,
    /// Empty once the attempt is submitted.
    pub questions: Vec<PublicQuestion>,
    pub answers: Vec<AnswerInput>,
    pub remaining_seconds: i64,
    pub autosave_interval_seconds: u64,
}
