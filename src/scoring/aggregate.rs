// src/scoring/aggregate.rs

use std::collections::HashMap;

use crate::{
    models::{
        answer::AnswerInput,
        question::{Question, QuestionType, Section},
        result::{QuestionResult, SectionResult},
    },
    scoring::answer::{Verdict, evaluate, normalize_selection},
};

/// Percentile reported while a test has fewer than two submissions.
pub const DEFAULT_PERCENTILE: i64 = 50;

/// One question after grading.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub section: Section,
    pub question_type: QuestionType,
    pub selected_answers: Vec<String>,
    pub verdict: Verdict,
    pub marks_awarded: i64,
    pub is_marked_for_review: bool,
    pub time_spent: i64,
}

/// Grading outcome for a whole attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub total_marks: i64,
    /// Sum of per-question marks, may be negative.
    pub raw_marks: i64,
    /// `raw_marks` floored at zero.
    pub obtained_marks: i64,
    pub percentage: i64,
    pub answers: Vec<GradedAnswer>,
}

/// Grades every question of a test against the given answers.
///
/// Questions without an answer are graded as unattempted. When an answer
/// appears more than once for the same question, the last one wins.
pub fn grade_attempt(questions: &[Question], answers: &[AnswerInput]) -> ScoreCard {
    let by_question: HashMap<i64, &AnswerInput> =
        answers.iter().map(|a| (a.question_id, a)).collect();

    let mut total_marks = 0;
    let mut raw_marks = 0;
    let mut graded = Vec::with_capacity(questions.len());

    for question in questions {
        total_marks += question.marks;

        let input = by_question.get(&question.id);
        let selected = input
            .map(|a| normalize_selection(&a.selected_answers))
            .unwrap_or_default();
        let verdict = evaluate(question, &selected);
        let marks_awarded = verdict.marks(question);
        raw_marks += marks_awarded;

        graded.push(GradedAnswer {
            question_id: question.id,
            section: question.section,
            question_type: question.question_type,
            selected_answers: selected,
            verdict,
            marks_awarded,
            is_marked_for_review: input.is_some_and(|a| a.is_marked_for_review),
            time_spent: input.map_or(0, |a| a.time_spent),
        });
    }

    let obtained_marks = raw_marks.max(0);

    ScoreCard {
        total_marks,
        raw_marks,
        obtained_marks,
        percentage: percentage(obtained_marks, total_marks),
        answers: graded,
    }
}

/// Overlays the answers sent with a submission on top of autosaved ones.
pub fn merge_answers(saved: Vec<AnswerInput>, submitted: &[AnswerInput]) -> Vec<AnswerInput> {
    let mut merged: HashMap<i64, AnswerInput> =
        saved.into_iter().map(|a| (a.question_id, a)).collect();
    for answer in submitted {
        merged.insert(answer.question_id, answer.clone());
    }

    let mut merged: Vec<AnswerInput> = merged.into_values().collect();
    merged.sort_by_key(|a| a.question_id);
    merged
}

/// Rounds halves toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `round(obtained / total * 100)`, or 0 for a test without marks.
pub fn percentage(obtained: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    round_half_up(obtained as f64 / total as f64 * 100.0)
}

/// Share of submitted attempts scoring strictly below `own`, in percent.
pub fn percentile(own: i64, submitted: &[i64]) -> i64 {
    if submitted.len() < 2 {
        return DEFAULT_PERCENTILE;
    }
    let lower = submitted.iter().filter(|&&m| m < own).count();
    round_half_up(lower as f64 / submitted.len() as f64 * 100.0)
}

/// Mean obtained marks over submitted attempts.
pub fn class_average(submitted: &[i64]) -> i64 {
    if submitted.is_empty() {
        return 0;
    }
    let sum: i64 = submitted.iter().sum();
    round_half_up(sum as f64 / submitted.len() as f64)
}

/// Rolls question results up into the three fixed sections.
pub fn section_breakdown(questions: &[QuestionResult]) -> Vec<SectionResult> {
    Section::ALL
        .into_iter()
        .map(|section| {
            let mut result = SectionResult {
                section,
                total_questions: 0,
                attempted: 0,
                correct: 0,
                incorrect: 0,
                marks: 0,
                time_spent: 0,
            };

            for q in questions.iter().filter(|q| q.section == section) {
                result.total_questions += 1;
                result.marks += q.marks_awarded;
                result.time_spent += q.time_spent;
                if q.is_attempted {
                    result.attempted += 1;
                    if q.is_correct {
                        result.correct += 1;
                    } else {
                        result.incorrect += 1;
                    }
                }
            }

            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn question(id: i64, section: Section, correct: &str) -> Question {
        Question {
            id,
            test_id: 1,
            section,
            question_type: QuestionType::SingleChoice,
            question_text: format!("Question {}", id),
            comprehension_passage: None,
            options: None,
            correct_answers: Json(vec![correct.to_string()]),
            marks: 4,
            negative_marks: 1,
            order_index: id,
        }
    }

    fn answer(question_id: i64, keys: &[&str]) -> AnswerInput {
        AnswerInput {
            question_id,
            selected_answers: keys.iter().map(|s| s.to_string()).collect(),
            is_marked_for_review: false,
            time_spent: 30,
        }
    }

    fn three_questions() -> Vec<Question> {
        vec![
            question(1, Section::Physics, "A"),
            question(2, Section::Chemistry, "B"),
            question(3, Section::Mathematics, "C"),
        ]
    }

    #[test]
    fn test_mixed_attempt_scores_three_of_twelve() {
        let card = grade_attempt(
            &three_questions(),
            &[answer(1, &["A"]), answer(2, &["D"])],
        );

        assert_eq!(card.raw_marks, 3);
        assert_eq!(card.obtained_marks, 3);
        assert_eq!(card.total_marks, 12);
        assert_eq!(card.percentage, 25);
        assert_eq!(card.answers.len(), 3);
        assert_eq!(card.answers[2].verdict, Verdict::Unattempted);
        assert_eq!(card.answers[2].time_spent, 0);
    }

    #[test]
    fn test_all_wrong_floors_at_zero() {
        let card = grade_attempt(
            &three_questions(),
            &[answer(1, &["D"]), answer(2, &["D"]), answer(3, &["D"])],
        );

        assert_eq!(card.raw_marks, -3);
        assert_eq!(card.obtained_marks, 0);
        assert_eq!(card.percentage, 0);
    }

    #[test]
    fn test_per_question_marks_sum_to_raw_total() {
        let card = grade_attempt(
            &three_questions(),
            &[answer(1, &["A"]), answer(2, &["D"]), answer(3, &["C"])],
        );
        let sum: i64 = card.answers.iter().map(|a| a.marks_awarded).sum();
        assert_eq!(sum, card.raw_marks);
        assert_eq!(card.obtained_marks, 7);
    }

    #[test]
    fn test_answers_for_unknown_questions_are_ignored() {
        let card = grade_attempt(&three_questions(), &[answer(99, &["A"])]);
        assert_eq!(card.obtained_marks, 0);
        assert!(card.answers.iter().all(|a| a.verdict == Verdict::Unattempted));
    }

    #[test]
    fn test_empty_test_has_zero_percentage() {
        let card = grade_attempt(&[], &[]);
        assert_eq!(card.total_marks, 0);
        assert_eq!(card.percentage, 0);
    }

    #[test]
    fn test_merge_prefers_submitted_answers() {
        let saved = vec![answer(1, &["B"]), answer(2, &["B"])];
        let merged = merge_answers(saved, &[answer(1, &["A"]), answer(3, &["C"])]);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].selected_answers, vec!["A"]);
        assert_eq!(merged[1].selected_answers, vec!["B"]);
        assert_eq!(merged[2].question_id, 3);
    }

    #[test]
    fn test_percentile_defaults_with_single_submission() {
        assert_eq!(percentile(10, &[10]), DEFAULT_PERCENTILE);
        assert_eq!(percentile(10, &[]), DEFAULT_PERCENTILE);
    }

    #[test]
    fn test_percentile_counts_strictly_lower() {
        // two lower, one tie (self), one higher
        assert_eq!(percentile(8, &[2, 5, 8, 12]), 50);
        assert_eq!(percentile(12, &[2, 5, 8, 12]), 75);
        assert_eq!(percentile(2, &[2, 2, 2]), 0);
        assert_eq!(percentile(3, &[1, 3, 5]), 33);
    }

    #[test]
    fn test_class_average_rounds() {
        assert_eq!(class_average(&[]), 0);
        assert_eq!(class_average(&[3, 4]), 4);
        assert_eq!(class_average(&[1, 2, 2]), 2);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(33.33), 33);
    }

    #[test]
    fn test_section_breakdown_counts_independently() {
        let results = vec![
            result(1, Section::Physics, true, true, 4),
            result(2, Section::Physics, true, false, -1),
            result(3, Section::Physics, false, false, 0),
            result(4, Section::Mathematics, true, true, 4),
        ];

        let sections = section_breakdown(&results);
        assert_eq!(sections.len(), 3);

        let physics = &sections[0];
        assert_eq!(physics.section, Section::Physics);
        assert_eq!(physics.total_questions, 3);
        assert_eq!(physics.attempted, 2);
        assert_eq!(physics.correct, 1);
        assert_eq!(physics.incorrect, 1);
        assert_eq!(physics.marks, 3);
        assert_eq!(physics.time_spent, 30);

        assert_eq!(sections[1].total_questions, 0);
        assert_eq!(sections[2].marks, 4);
    }

    fn result(id: i64, section: Section, attempted: bool, correct: bool, marks: i64) -> QuestionResult {
        QuestionResult {
            question_id: id,
            section,
            question_type: QuestionType::SingleChoice,
            question_text: String::new(),
            is_attempted: attempted,
            is_correct: correct,
            is_marked_for_review: false,
            marks_awarded: marks,
            time_spent: 10,
            selected_answers: vec![],
            correct_answers: vec![],
        }
    }
}
