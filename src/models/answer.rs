// src/models/answer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerRow {
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_answers: Json<Vec<String>>,
    /// NULL until the attempt is graded.
    pub is_correct: Option<bool>,
    pub marks_awarded: i64,
    pub is_marked_for_review: bool,
    pub time_spent_seconds: i64,
    pub answered_at: Option<DateTime<Utc>>,
}

/// One answer as sent by the test-taking client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: i64,

    #[serde(default)]
    #[validate(length(max = 16))]
    pub selected_answers: Vec<String>,

    #[serde(default)]
    pub is_marked_for_review: bool,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub time_spent: i64,
}

impl From<AnswerRow> for AnswerInput {
    fn from(row: AnswerRow) -> Self {
        Self {
            question_id: row.question_id,
            selected_answers: row.selected_answers.0,
            is_marked_for_review: row.is_marked_for_review,
            time_spent: row.time_spent_seconds,
        }
    }
}
