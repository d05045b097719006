// src/handlers/queries.rs

//! Lookups shared by several handlers.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{answer::AnswerRow, attempt::Attempt, question::Question, test::TestInfo},
};

pub(crate) async fn find_test(pool: &PgPool, test_id: i64) -> Result<TestInfo, AppError> {
    sqlx::query_as::<_, TestInfo>(
        r#"
        SELECT
            t.id,
            t.title,
            t.duration_minutes,
            COALESCE(SUM(q.marks), 0)::BIGINT AS total_marks,
            COUNT(q.id) AS question_count
        FROM tests t
        LEFT JOIN questions q ON q.test_id = t.id
        WHERE t.id = $1
        GROUP BY t.id
        "#,
    )
    .bind(test_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Test not found".to_string()))
}

/// All questions of a test, in authoring order.
pub(crate) async fn load_questions<'e, E: PgExecutor<'e>>(
    executor: E,
    test_id: i64,
) -> Result<Vec<Question>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT
            id, test_id, section, question_type, question_text,
            comprehension_passage, options, correct_answers,
            marks, negative_marks, order_index
        FROM questions
        WHERE test_id = $1
        ORDER BY order_index, id
        "#,
    )
    .bind(test_id)
    .fetch_all(executor)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load questions for test {}: {:?}", test_id, e);
        AppError::from(e)
    })?;

    Ok(questions)
}

pub(crate) async fn load_answers<'e, E: PgExecutor<'e>>(
    executor: E,
    attempt_id: i64,
) -> Result<Vec<AnswerRow>, AppError> {
    let answers = sqlx::query_as::<_, AnswerRow>(
        r#"
        SELECT
            attempt_id, question_id, selected_answers, is_correct, marks_awarded,
            is_marked_for_review, time_spent_seconds, answered_at
        FROM answers
        WHERE attempt_id = $1
        ORDER BY question_id
        "#,
    )
    .bind(attempt_id)
    .fetch_all(executor)
    .await?;

    Ok(answers)
}

/// Fetches an attempt only if it belongs to `student_id`.
pub(crate) async fn find_owned_attempt(
    pool: &PgPool,
    attempt_id: i64,
    student_id: Uuid,
) -> Result<Attempt, AppError> {
    sqlx::query_as::<_, Attempt>(
        r#"
        SELECT
            id, test_id, student_id, question_order, is_submitted, total_marks,
            obtained_marks, time_spent_seconds, version, started_at, updated_at, submitted_at
        FROM attempts
        WHERE id = $1 AND student_id = $2
        "#,
    )
    .bind(attempt_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))
}

/// Row-locks an attempt for the rest of the transaction.
/// Missing, foreign and other-test attempts all surface as 404.
pub(crate) async fn lock_attempt<'e, E: PgExecutor<'e>>(
    executor: E,
    attempt_id: i64,
    student_id: Uuid,
    test_id: i64,
) -> Result<Attempt, AppError> {
    sqlx::query_as::<_, Attempt>(
        r#"
        SELECT
            id, test_id, student_id, question_order, is_submitted, total_marks,
            obtained_marks, time_spent_seconds, version, started_at, updated_at, submitted_at
        FROM attempts
        WHERE id = $1 AND student_id = $2 AND test_id = $3
        FOR UPDATE
        "#,
    )
    .bind(attempt_id)
    .bind(student_id)
    .bind(test_id)
    .fetch_optional(executor)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))
}
