// src/models/analytics.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::question::{QuestionType, Section};

/// A submitted attempt joined with its test, newest first.
#[derive(Debug, Clone, FromRow)]
pub struct SubmittedAttemptRow {
    pub attempt_id: i64,
    pub test_title: String,
    pub obtained_marks: i64,
    pub total_marks: i64,
    pub time_spent_seconds: i64,
    pub question_count: i64,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One graded answer of a submitted attempt, with its question's category.
/// `is_correct` is `None` when the question was left unanswered.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerFactRow {
    #[sqlx(try_from = "String")]
    pub section: Section,
    #[sqlx(try_from = "String")]
    pub question_type: QuestionType,
    pub is_correct: Option<bool>,
    pub time_spent_seconds: i64,
}

impl AnswerFactRow {
    pub fn is_answered(&self) -> bool {
        self.is_correct.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_tests: i64,
    /// Mean percentage across submitted attempts.
    pub average_score: i64,
    pub best_score: i64,
    pub total_time_spent: i64,
    pub improvement_trend: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPerformance {
    pub section: Section,
    pub average_score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub average_time: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTest {
    pub attempt_id: i64,
    pub test_title: String,
    pub score: i64,
    pub percentage: i64,
    pub date: Option<DateTime<Utc>>,
    pub time_spent: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAnalysis {
    pub question_type: String,
    pub average_time: i64,
    pub accuracy: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthsWeaknesses {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Body of `GET /api/analytics/performance`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub overall_stats: OverallStats,
    pub section_wise_performance: Vec<SectionPerformance>,
    pub recent_tests: Vec<RecentTest>,
    pub time_analysis: Vec<TimeAnalysis>,
    pub strengths_weaknesses: StrengthsWeaknesses,
}
