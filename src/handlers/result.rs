// src/handlers/result.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::queries::{find_owned_attempt, find_test, load_answers, load_questions},
    scoring::report::build_attempt_result,
    utils::jwt::Claims,
};

/// Returns the graded attempt with section and question breakdowns,
/// percentile and class average.
/// 409 while the attempt is still in progress.
pub async fn get_attempt_result(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.student_id()?;

    let attempt = find_owned_attempt(&pool, attempt_id, student_id).await?;
    if !attempt.is_submitted {
        return Err(AppError::Conflict(
            "Attempt has not been submitted yet".to_string(),
        ));
    }

    let test = find_test(&pool, attempt.test_id).await?;
    let questions = load_questions(&pool, attempt.test_id).await?;
    let answers = load_answers(&pool, attempt.id).await?;

    let submitted_marks: Vec<i64> = sqlx::query_scalar(
        "SELECT obtained_marks FROM attempts WHERE test_id = $1 AND is_submitted = TRUE",
    )
    .bind(attempt.test_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch class marks: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(build_attempt_result(
        attempt,
        test,
        questions,
        answers,
        &submitted_marks,
    )))
}
