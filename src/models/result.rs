// src/models/result.rs

use serde::Serialize;

use crate::models::{
    attempt::Attempt,
    question::{QuestionType, Section},
    test::TestInfo,
};

/// Per-section rollup of a graded attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResult {
    pub section: Section,
    pub total_questions: i64,
    pub attempted: i64,
    pub correct: i64,
    pub incorrect: i64,
    pub marks: i64,
    pub time_spent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: i64,
    pub section: Section,
    pub question_type: QuestionType,
    pub question_text: String,
    pub is_attempted: bool,
    pub is_correct: bool,
    pub is_marked_for_review: bool,
    pub marks_awarded: i64,
    pub time_spent: i64,
    pub selected_answers: Vec<String>,
    pub correct_answers: Vec<String>,
}

/// Body of `GET /api/attempts/{id}/result`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub attempt: Attempt,
    pub test: TestInfo,
    pub section_wise_results: Vec<SectionResult>,
    pub question_wise_results: Vec<QuestionResult>,
    pub percentile: i64,
    /// Mean obtained marks over all submitted attempts of the test.
    pub average_score: i64,
}
