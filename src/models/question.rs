// src/models/question.rs

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

/// Returned when a TEXT column holds a value no enum variant maps to.
#[derive(Debug)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// The three fixed sections of a test, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Physics,
    Chemistry,
    Mathematics,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Physics, Section::Chemistry, Section::Mathematics];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Physics => "Physics",
            Section::Chemistry => "Chemistry",
            Section::Mathematics => "Mathematics",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Section {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Section::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or(UnknownVariant { kind: "section", value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "mcq_single")]
    SingleChoice,
    #[serde(rename = "mcq_multiple")]
    MultiChoice,
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "comprehension")]
    Comprehension,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::SingleChoice,
        QuestionType::MultiChoice,
        QuestionType::Numeric,
        QuestionType::Comprehension,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "mcq_single",
            QuestionType::MultiChoice => "mcq_multiple",
            QuestionType::Numeric => "numeric",
            QuestionType::Comprehension => "comprehension",
        }
    }

    /// Label used in analytics output, e.g. "MCQ SINGLE".
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

impl TryFrom<String> for QuestionType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or(UnknownVariant { kind: "question type", value })
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub test_id: i64,

    #[sqlx(try_from = "String")]
    pub section: Section,

    #[sqlx(try_from = "String")]
    pub question_type: QuestionType,

    pub question_text: String,

    pub comprehension_passage: Option<String>,

    /// Option key -> option text. Absent for numeric questions.
    pub options: Option<Json<BTreeMap<String, String>>>,

    /// Correct option keys, or a one-element list holding the numeric literal.
    pub correct_answers: Json<Vec<String>>,

    pub marks: i64,
    pub negative_marks: i64,
    pub order_index: i64,
}

/// Question as shown to a student during an attempt (no answer key).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: i64,
    pub section: Section,
    pub question_type: QuestionType,
    pub question_text: String,
    pub comprehension_passage: Option<String>,
    pub options: Option<BTreeMap<String, String>>,
    pub marks: i64,
    pub negative_marks: i64,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            section: q.section,
            question_type: q.question_type,
            question_text: q.question_text,
            comprehension_passage: q.comprehension_passage,
            options: q.options.map(|o| o.0),
            marks: q.marks,
            negative_marks: q.negative_marks,
        }
    }
}
