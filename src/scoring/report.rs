// src/scoring/report.rs

use std::collections::HashMap;

use crate::{
    models::{
        answer::AnswerRow,
        attempt::Attempt,
        question::Question,
        result::{AttemptResult, QuestionResult},
        test::TestInfo,
    },
    scoring::{
        aggregate::{class_average, percentile, section_breakdown},
        answer::normalize_selection,
        order::arrange,
    },
};

/// Pairs each question with its stored answer, in snapshot order.
pub fn question_results(
    questions: Vec<Question>,
    answers: Vec<AnswerRow>,
    snapshot: &[i64],
) -> Vec<QuestionResult> {
    let mut by_question: HashMap<i64, AnswerRow> =
        answers.into_iter().map(|a| (a.question_id, a)).collect();

    arrange(questions, snapshot)
        .into_iter()
        .map(|q| {
            let row = by_question.remove(&q.id);
            let selected = row
                .as_ref()
                .map(|r| normalize_selection(&r.selected_answers))
                .unwrap_or_default();

            QuestionResult {
                question_id: q.id,
                section: q.section,
                question_type: q.question_type,
                question_text: q.question_text,
                is_attempted: !selected.is_empty(),
                is_correct: row.as_ref().and_then(|r| r.is_correct).unwrap_or(false),
                is_marked_for_review: row.as_ref().is_some_and(|r| r.is_marked_for_review),
                marks_awarded: row.as_ref().map_or(0, |r| r.marks_awarded),
                time_spent: row.as_ref().map_or(0, |r| r.time_spent_seconds),
                selected_answers: selected,
                correct_answers: q.correct_answers.0,
            }
        })
        .collect()
}

/// Assembles the full result view of a graded attempt.
///
/// `submitted_marks` holds `obtained_marks` of every submitted attempt
/// of the same test, this one included.
pub fn build_attempt_result(
    attempt: Attempt,
    test: TestInfo,
    questions: Vec<Question>,
    answers: Vec<AnswerRow>,
    submitted_marks: &[i64],
) -> AttemptResult {
    let question_wise_results = question_results(questions, answers, &attempt.question_order.0);
    let section_wise_results = section_breakdown(&question_wise_results);

    AttemptResult {
        percentile: percentile(attempt.obtained_marks, submitted_marks),
        average_score: class_average(submitted_marks),
        attempt,
        test,
        section_wise_results,
        question_wise_results,
    }
}
