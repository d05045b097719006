// src/scoring/answer.rs

use std::{collections::BTreeSet, str::FromStr};

use rust_decimal::Decimal;

use crate::models::question::{Question, QuestionType};

/// Absolute tolerance for numeric answers (0.01), compared in exact decimal.
pub const NUMERIC_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Outcome of checking one answer against its question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Unattempted,
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn is_attempted(self) -> bool {
        self != Verdict::Unattempted
    }

    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }

    /// Marks this verdict earns on `question`.
    pub fn marks(self, question: &Question) -> i64 {
        match self {
            Verdict::Correct => question.marks,
            Verdict::Incorrect => -question.negative_marks,
            Verdict::Unattempted => 0,
        }
    }
}

/// Trims selections and drops blank entries.
pub fn normalize_selection(selected: &[String]) -> Vec<String> {
    selected
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Checks a submitted selection against the question's answer key.
pub fn evaluate(question: &Question, selected: &[String]) -> Verdict {
    let selected = normalize_selection(selected);
    if selected.is_empty() {
        return Verdict::Unattempted;
    }

    let correct = &question.correct_answers.0;
    let is_correct = match question.question_type {
        QuestionType::SingleChoice => {
            selected.len() == 1 && correct.iter().any(|c| c.trim() == selected[0])
        }
        QuestionType::MultiChoice | QuestionType::Comprehension => {
            let keys = key_set(correct);
            // a repeated option must not pass as a distinct pick
            selected.len() == keys.len() && key_set(&selected) == keys
        }
        QuestionType::Numeric => {
            selected.len() == 1 && numeric_matches(&selected[0], correct.first().map(String::as_str))
        }
    };

    if is_correct {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

fn key_set(keys: &[String]) -> BTreeSet<&str> {
    keys.iter().map(|k| k.trim()).filter(|k| !k.is_empty()).collect()
}

fn numeric_matches(given: &str, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    match (parse_decimal(given), parse_decimal(expected)) {
        (Some(a), Some(b)) => a
            .checked_sub(b)
            .is_some_and(|diff| diff.abs() < NUMERIC_TOLERANCE),
        _ => false,
    }
}

/// Accepts plain ("9.81") and scientific ("9.81e0") notation.
fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}
