// src/handlers/attempt.rs

use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json as SqlJson};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AUTOSAVE_INTERVAL_SECONDS,
    error::AppError,
    handlers::queries::{find_test, load_answers, load_questions, lock_attempt},
    models::{
        answer::AnswerInput,
        attempt::{
            Attempt, AttemptStatus, SaveProgressRequest, SaveProgressResponse, StartTestResponse,
            SubmitResponse, SubmitTestRequest,
        },
        question::{PublicQuestion, Question},
    },
    scoring::{
        aggregate::{grade_attempt, merge_answers},
        answer::normalize_selection,
        order::{arrange, shuffle_within_sections},
    },
    utils::jwt::Claims,
};

/// Starts or resumes the caller's attempt at a test.
///
/// * First visit creates the attempt with a per-section shuffled question order.
/// * Later visits return the same order plus everything saved so far.
/// * A submitted attempt comes back with `status = "submitted"` and no questions.
pub async fn start_test(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.student_id()?;
    let test = find_test(&pool, test_id).await?;

    let questions = load_questions(&pool, test_id).await?;
    if questions.is_empty() {
        return Err(AppError::NotFound("Test has no questions".to_string()));
    }

    let existing = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT
            id, test_id, student_id, question_order, is_submitted, total_marks,
            obtained_marks, time_spent_seconds, version, started_at, updated_at, submitted_at
        FROM attempts
        WHERE test_id = $1 AND student_id = $2
        "#,
    )
    .bind(test_id)
    .bind(student_id)
    .fetch_optional(&pool)
    .await?;

    let attempt = match existing {
        Some(attempt) => attempt,
        None => create_attempt(&pool, test_id, student_id, &questions).await?,
    };

    if attempt.status() == AttemptStatus::Submitted {
        return Ok(Json(StartTestResponse {
            status: AttemptStatus::Submitted,
            attempt_id: attempt.id,
            version: attempt.version,
            test,
            questions: vec![],
            answers: vec![],
            remaining_seconds: 0,
            autosave_interval_seconds: AUTOSAVE_INTERVAL_SECONDS,
        }));
    }

    let answers: Vec<AnswerInput> = load_answers(&pool, attempt.id)
        .await?
        .into_iter()
        .map(AnswerInput::from)
        .collect();

    let questions: Vec<PublicQuestion> = arrange(questions, &attempt.question_order.0)
        .into_iter()
        .map(PublicQuestion::from)
        .collect();

    Ok(Json(StartTestResponse {
        status: AttemptStatus::InProgress,
        attempt_id: attempt.id,
        version: attempt.version,
        remaining_seconds: attempt.remaining_seconds(test.duration_minutes),
        test,
        questions,
        answers,
        autosave_interval_seconds: AUTOSAVE_INTERVAL_SECONDS,
    }))
}

/// Inserts the attempt row. If a concurrent request won the race,
/// its row is returned instead.
async fn create_attempt(
    pool: &PgPool,
    test_id: i64,
    student_id: Uuid,
    questions: &[Question],
) -> Result<Attempt, AppError> {
    let order = {
        let mut rng = rand::thread_rng();
        shuffle_within_sections(questions, &mut rng)
    };

    let inserted = sqlx::query_as::<_, Attempt>(
        r#"
        INSERT INTO attempts (test_id, student_id, question_order)
        VALUES ($1, $2, $3)
        ON CONFLICT (test_id, student_id) DO NOTHING
        RETURNING
            id, test_id, student_id, question_order, is_submitted, total_marks,
            obtained_marks, time_spent_seconds, version, started_at, updated_at, submitted_at
        "#,
    )
    .bind(test_id)
    .bind(student_id)
    .bind(SqlJson(&order))
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create attempt: {:?}", e);
        AppError::from(e)
    })?;

    if let Some(attempt) = inserted {
        tracing::info!(
            attempt_id = attempt.id,
            test_id,
            %student_id,
            questions = order.len(),
            "Attempt created"
        );
        return Ok(attempt);
    }

    let attempt = sqlx::query_as::<_, Attempt>(
        r#"
        SELECT
            id, test_id, student_id, question_order, is_submitted, total_marks,
            obtained_marks, time_spent_seconds, version, started_at, updated_at, submitted_at
        FROM attempts
        WHERE test_id = $1 AND student_id = $2
        "#,
    )
    .bind(test_id)
    .bind(student_id)
    .fetch_one(pool)
    .await?;

    Ok(attempt)
}

/// Autosave: upserts answers and adds to the attempt's time spent.
///
/// * 404 if the attempt is not the caller's or a question is not in the test.
/// * 409 if the attempt is submitted or `version` is stale.
pub async fn save_progress(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<i64>,
    payload: Result<Json<SaveProgressRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let student_id = claims.student_id()?;

    let mut tx = pool.begin().await?;

    let attempt = lock_attempt(&mut *tx, req.attempt_id, student_id, test_id).await?;
    attempt.ensure_in_progress()?;
    if let Err(e) = attempt.check_version(req.version) {
        tracing::warn!(attempt_id = attempt.id, "Rejected stale save");
        return Err(e);
    }

    let known: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT id FROM questions WHERE test_id = $1")
            .bind(test_id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

    if let Some(unknown) = req.answers.iter().find(|a| !known.contains(&a.question_id)) {
        return Err(AppError::NotFound(format!(
            "Question {} not found",
            unknown.question_id
        )));
    }

    for answer in &req.answers {
        let selected = normalize_selection(&answer.selected_answers);
        let answered_at = (!selected.is_empty()).then(Utc::now);

        sqlx::query(
            r#"
            INSERT INTO answers
                (attempt_id, question_id, selected_answers, is_marked_for_review,
                 time_spent_seconds, answered_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (attempt_id, question_id) DO UPDATE SET
                selected_answers = EXCLUDED.selected_answers,
                is_marked_for_review = EXCLUDED.is_marked_for_review,
                time_spent_seconds = EXCLUDED.time_spent_seconds,
                answered_at = EXCLUDED.answered_at
            "#,
        )
        .bind(attempt.id)
        .bind(answer.question_id)
        .bind(SqlJson(&selected))
        .bind(answer.is_marked_for_review)
        .bind(answer.time_spent)
        .bind(answered_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save answer: {:?}", e);
            AppError::from(e)
        })?;
    }

    let version: i64 = sqlx::query_scalar(
        r#"
        UPDATE attempts
        SET time_spent_seconds = time_spent_seconds + $1,
            version = version + 1,
            updated_at = NOW()
        WHERE id = $2
        RETURNING version
        "#,
    )
    .bind(req.time_spent)
    .bind(attempt.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update attempt: {:?}", e);
        AppError::from(e)
    })?;

    tx.commit().await?;

    tracing::debug!(
        attempt_id = attempt.id,
        answers = req.answers.len(),
        version,
        "Progress saved"
    );

    Ok(Json(SaveProgressResponse {
        success: true,
        version,
    }))
}

/// Grades the attempt and closes it.
///
/// * Every question of the test is graded, answered or not.
/// * Answers in the body override autosaved ones for the same question.
/// * Re-submitting a submitted attempt returns the stored marks untouched.
pub async fn submit_test(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<i64>,
    payload: Result<Json<SubmitTestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let student_id = claims.student_id()?;

    let mut tx = pool.begin().await?;

    let attempt = lock_attempt(&mut *tx, req.attempt_id, student_id, test_id).await?;
    if attempt.status() == AttemptStatus::Submitted {
        tracing::info!(attempt_id = attempt.id, "Repeat submission, returning stored marks");
        return Ok(Json(attempt.score_summary()));
    }

    let questions = load_questions(&mut *tx, test_id).await?;
    let saved: Vec<AnswerInput> = load_answers(&mut *tx, attempt.id)
        .await?
        .into_iter()
        .map(AnswerInput::from)
        .collect();

    let card = grade_attempt(&questions, &merge_answers(saved, &req.answers));

    if !card.answers.is_empty() {
        let now = Utc::now();
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO answers (attempt_id, question_id, selected_answers, is_correct, \
             marks_awarded, is_marked_for_review, time_spent_seconds, answered_at) ",
        );

        query_builder.push_values(card.answers.iter(), |mut row, graded| {
            row.push_bind(attempt.id)
                .push_bind(graded.question_id)
                .push_bind(SqlJson(graded.selected_answers.clone()))
                .push_bind(graded.verdict.is_attempted().then_some(graded.verdict.is_correct()))
                .push_bind(graded.marks_awarded)
                .push_bind(graded.is_marked_for_review)
                .push_bind(graded.time_spent)
                .push_bind(graded.verdict.is_attempted().then_some(now));
        });

        query_builder.push(
            " ON CONFLICT (attempt_id, question_id) DO UPDATE SET \
             selected_answers = EXCLUDED.selected_answers, \
             is_correct = EXCLUDED.is_correct, \
             marks_awarded = EXCLUDED.marks_awarded, \
             is_marked_for_review = EXCLUDED.is_marked_for_review, \
             time_spent_seconds = EXCLUDED.time_spent_seconds, \
             answered_at = COALESCE(answers.answered_at, EXCLUDED.answered_at)",
        );

        query_builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store graded answers: {:?}", e);
                AppError::from(e)
            })?;
    }

    sqlx::query(
        r#"
        UPDATE attempts
        SET is_submitted = TRUE,
            submitted_at = NOW(),
            updated_at = NOW(),
            total_marks = $1,
            obtained_marks = $2,
            time_spent_seconds = time_spent_seconds + $3,
            version = version + 1
        WHERE id = $4
        "#,
    )
    .bind(card.total_marks)
    .bind(card.obtained_marks)
    .bind(req.time_spent)
    .bind(attempt.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to close attempt: {:?}", e);
        AppError::from(e)
    })?;

    tx.commit().await?;

    tracing::info!(
        attempt_id = attempt.id,
        test_id,
        total_marks = card.total_marks,
        raw_marks = card.raw_marks,
        obtained_marks = card.obtained_marks,
        "Attempt submitted"
    );

    Ok(Json(SubmitResponse {
        success: true,
        total_marks: card.total_marks,
        obtained_marks: card.obtained_marks,
        percentage: card.percentage,
    }))
}
