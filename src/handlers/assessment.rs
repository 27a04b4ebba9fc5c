// src/handlers/assessment.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use sqlx::types::Json as SqlJson;

use crate::{
    ai::{GeminiClient, quiz::generate_fresh_quiz},
    catalog::Catalog,
    config::QUIZ_QUESTION_COUNT,
    error::AppError,
    grading::{Resolution, grade},
    models::{
        assessment::{
            Assessment, QuizResponse, SubjectSummary, SubmitAssessmentRequest,
            SubmitAssessmentResponse,
        },
        question::PublicQuestion,
    },
    registry::{QuizRegistry, exposed_question_id},
    utils::jwt::Claims,
};

/// Lists the subjects available for assessment.
pub async fn list_subjects(State(catalog): State<Arc<Catalog>>) -> impl IntoResponse {
    let subjects: Vec<SubjectSummary> = catalog
        .subjects()
        .iter()
        .map(|s| SubjectSummary {
            id: s.id,
            title: s.title,
            description: s.description,
            question_count: QUIZ_QUESTION_COUNT,
            time_limit: s.time_limit,
        })
        .collect();

    Json(subjects)
}

/// Issues a fresh quiz for a subject.
///
/// Questions come from the AI generator (static fallback on failure), the
/// answer key goes into the registry, and the client receives only
/// instance-scoped ids, text and options.
pub async fn get_quiz(
    State(catalog): State<Arc<Catalog>>,
    State(registry): State<Arc<QuizRegistry>>,
    State(ai): State<GeminiClient>,
    Path(subject): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let subject_quiz = catalog
        .subject(&subject)
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    tracing::info!(subject = %subject, "generating fresh quiz");
    let quiz = generate_fresh_quiz(&ai, subject_quiz, QUIZ_QUESTION_COUNT).await;

    let quiz_instance_id = registry.create(&subject, &quiz.questions);

    let questions: Vec<PublicQuestion> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, q)| PublicQuestion {
            id: exposed_question_id(&quiz_instance_id, index),
            question: q.question.clone(),
            options: q.options.clone(),
        })
        .collect();

    Ok(Json(QuizResponse {
        subject: quiz.subject,
        title: quiz.title,
        description: quiz.description,
        time_limit: quiz.time_limit,
        quiz_instance_id,
        is_ai_generated: quiz.ai_generated,
        questions,
    }))
}

/// Submits quiz answers, grades them and persists the result.
///
/// A missing, expired or already-consumed instance id degrades to grading
/// against the static catalog by raw question id; it is never an error.
pub async fn submit_assessment(
    State(pool): State<PgPool>,
    State(catalog): State<Arc<Catalog>>,
    State(registry): State<Arc<QuizRegistry>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let subject_quiz = catalog
        .subject(&req.subject)
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    let resolution = match req
        .quiz_instance_id
        .as_deref()
        .and_then(|id| registry.consume(id))
    {
        Some(instance) => Resolution::Instanced(instance.questions),
        None => {
            if req.quiz_instance_id.is_some() {
                tracing::debug!(
                    subject = %req.subject,
                    "quiz instance not found, grading against static catalog"
                );
            }
            Resolution::StaticFallback(subject_quiz.questions.clone())
        }
    };

    let graded = grade(&req.subject, &req.answers, resolution);
    let time_taken = req.time_taken.unwrap_or(0);
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    // The instance is already consumed at this point; if the insert
    // fails, the answer key is gone and the attempt cannot be regraded.
    let (assessment_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO assessments
            (user_id, subject, answers, score, total_questions, correct_answers, time_taken, skill_level)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&req.subject)
    .bind(SqlJson(&graded.answers))
    .bind(graded.score)
    .bind(graded.total_questions)
    .bind(graded.correct_answers)
    .bind(time_taken)
    .bind(graded.skill_level.as_str())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to persist assessment: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitAssessmentResponse {
            assessment_id,
            subject: graded.subject,
            score: graded.score,
            skill_level: graded.skill_level,
            correct_answers: graded.correct_answers,
            total_questions: graded.total_questions,
            time_taken,
            results: graded.results,
        }),
    ))
}

/// Returns the caller's assessment history, most recent first.
pub async fn get_history(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let assessments = sqlx::query_as::<_, Assessment>(
        r#"
        SELECT id, user_id, subject, answers, score, total_questions,
               correct_answers, time_taken, skill_level, completed_at
        FROM assessments
        WHERE user_id = $1
        ORDER BY completed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(assessments))
}

/// Returns one of the caller's assessments by id.
pub async fn get_assessment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let assessment = sqlx::query_as::<_, Assessment>(
        r#"
        SELECT id, user_id, subject, answers, score, total_questions,
               correct_answers, time_taken, skill_level, completed_at
        FROM assessments
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Assessment not found".to_string()))?;

    Ok(Json(assessment))
}
