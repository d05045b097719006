// src/handlers/analytics.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::analytics::{AnswerFactRow, SubmittedAttemptRow},
    scoring::analytics::summarize,
    utils::jwt::Claims,
};

/// Aggregate history across the caller's submitted attempts.
pub async fn get_performance(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.student_id()?;

    let attempts = sqlx::query_as::<_, SubmittedAttemptRow>(
        r#"
        SELECT
            a.id AS attempt_id,
            t.title AS test_title,
            a.obtained_marks,
            a.total_marks,
            a.time_spent_seconds,
            jsonb_array_length(a.question_order)::BIGINT AS question_count,
            a.submitted_at
        FROM attempts a
        JOIN tests t ON t.id = a.test_id
        WHERE a.student_id = $1 AND a.is_submitted = TRUE
        ORDER BY a.submitted_at DESC NULLS LAST, a.id DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch attempt history: {:?}", e);
        AppError::from(e)
    })?;

    let facts = if attempts.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as::<_, AnswerFactRow>(
            r#"
            SELECT q.section, q.question_type, ans.is_correct, ans.time_spent_seconds
            FROM answers ans
            JOIN attempts a ON a.id = ans.attempt_id
            JOIN questions q ON q.id = ans.question_id
            WHERE a.student_id = $1 AND a.is_submitted = TRUE
              AND ans.is_correct IS NOT NULL
            "#,
        )
        .bind(student_id)
        .fetch_all(&pool)
        .await?
    };

    Ok(Json(summarize(&attempts, &facts)))
}
