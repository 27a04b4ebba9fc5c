// src/handlers/recommendation.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::Json as SqlJson;

use crate::{
    ai::{
        GeminiClient,
        path::{AssessmentSummary, generate_learning_path, next_recommendations},
    },
    error::AppError,
    grading::SkillLevel,
    models::learning_path::{
        LearningPath, OverallProgress, Resource, TopicProgress, TopicStatus, UpdateProgressRequest,
    },
    utils::jwt::Claims,
};

fn user_id(claims: &Claims) -> i64 {
    claims.sub.parse::<i64>().unwrap_or(0)
}

async fn fetch_path(pool: &PgPool, user_id: i64) -> Result<Option<LearningPath>, AppError> {
    let path = sqlx::query_as::<_, LearningPath>(
        r#"
        SELECT id, user_id, topics, total_topics, completed_topics,
               progress_percentage, ai_recommendations, generated_at, last_updated
        FROM learning_paths
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(path)
}

/// Generates (or regenerates) the caller's learning path from their
/// assessment history. Progress resets on regeneration.
pub async fn generate_path(
    State(pool): State<PgPool>,
    State(ai): State<GeminiClient>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = user_id(&claims);

    let rows: Vec<(String, i32, i32, i32)> = sqlx::query_as(
        r#"
        SELECT subject, score, correct_answers, total_questions
        FROM assessments
        WHERE user_id = $1
        ORDER BY completed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    if rows.is_empty() {
        return Err(AppError::BadRequest(
            "Please complete at least one assessment before generating a learning path"
                .to_string(),
        ));
    }

    let summaries: Vec<AssessmentSummary> = rows
        .into_iter()
        .map(|(subject, score, correct_answers, total_questions)| AssessmentSummary {
            subject,
            score,
            skill_level: SkillLevel::from_score(score),
            correct_answers,
            total_questions,
        })
        .collect();

    let generated = generate_learning_path(&ai, &summaries).await;

    let topics: Vec<TopicProgress> = generated
        .plan
        .topics
        .iter()
        .enumerate()
        .map(|(index, topic)| TopicProgress {
            title: topic.title.clone(),
            description: topic.description.clone(),
            difficulty: topic.difficulty.clone(),
            status: TopicStatus::NotStarted,
            order: if topic.order > 0 {
                topic.order
            } else {
                index as i32 + 1
            },
            completed_at: None,
            resources: topic
                .resources
                .iter()
                .map(|r| Resource {
                    title: r.title.clone(),
                    url: r.url.clone(),
                    resource_type: r.resource_type.clone(),
                    duration: r.duration.clone(),
                    is_free: r.is_free,
                })
                .collect(),
        })
        .collect();

    // Raw generator output is kept alongside the tracked topics.
    let raw_plan = serde_json::to_string(&generated.plan)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let learning_path = sqlx::query_as::<_, LearningPath>(
        r#"
        INSERT INTO learning_paths
            (user_id, topics, total_topics, completed_topics, progress_percentage,
             ai_recommendations, generated_at, last_updated)
        VALUES ($1, $2, $3, 0, 0, $4, NOW(), NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            topics = EXCLUDED.topics,
            total_topics = EXCLUDED.total_topics,
            completed_topics = 0,
            progress_percentage = 0,
            ai_recommendations = EXCLUDED.ai_recommendations,
            generated_at = NOW(),
            last_updated = NOW()
        RETURNING id, user_id, topics, total_topics, completed_topics,
                  progress_percentage, ai_recommendations, generated_at, last_updated
        "#,
    )
    .bind(user_id)
    .bind(SqlJson(&topics))
    .bind(topics.len() as i32)
    .bind(&raw_plan)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert learning path: {:?}", e);
        AppError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Learning path generated successfully",
            "overview": generated.plan.overview,
            "estimatedDuration": generated.plan.estimated_duration,
            "isAiGenerated": generated.ai_generated,
            "learningPath": learning_path,
        })),
    ))
}

/// Returns the caller's learning path.
pub async fn get_path(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let path = fetch_path(&pool, user_id(&claims)).await?.ok_or(AppError::NotFound(
        "No learning path found. Complete an assessment to generate one.".to_string(),
    ))?;

    Ok(Json(path))
}

/// Updates one topic's progress status and recomputes the aggregate.
pub async fn update_progress(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(topic_index): Path<usize>,
    Json(req): Json<UpdateProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut path = fetch_path(&pool, user_id(&claims))
        .await?
        .ok_or(AppError::NotFound("Learning path not found".to_string()))?;

    if topic_index >= path.topics.0.len() {
        return Err(AppError::BadRequest("Invalid topic index".to_string()));
    }

    {
        let topic = &mut path.topics.0[topic_index];
        topic.status = req.status;
        topic.completed_at = match req.status {
            TopicStatus::Completed => Some(chrono::Utc::now()),
            _ => None,
        };
    }

    path.recompute_progress();

    sqlx::query(
        r#"
        UPDATE learning_paths
        SET topics = $1, total_topics = $2, completed_topics = $3,
            progress_percentage = $4, last_updated = NOW()
        WHERE id = $5
        "#,
    )
    .bind(SqlJson(&path.topics.0))
    .bind(path.total_topics)
    .bind(path.completed_topics)
    .bind(path.progress_percentage)
    .bind(path.id)
    .execute(&pool)
    .await?;

    Ok(Json(json!({
        "message": "Progress updated successfully",
        "topic": path.topics.0[topic_index],
        "overallProgress": OverallProgress {
            completed: path.completed_topics,
            total: path.total_topics,
            percentage: path.progress_percentage,
        },
    })))
}

/// Suggests next steps based on the caller's progress.
pub async fn next_steps(
    State(pool): State<PgPool>,
    State(ai): State<GeminiClient>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let path = fetch_path(&pool, user_id(&claims))
        .await?
        .ok_or(AppError::NotFound("No learning path found".to_string()))?;

    let completed: Vec<String> = path
        .topics
        .0
        .iter()
        .filter(|t| t.status == TopicStatus::Completed)
        .map(|t| t.title.clone())
        .collect();

    let remaining: Vec<String> = path
        .topics
        .0
        .iter()
        .filter(|t| t.status != TopicStatus::Completed)
        .map(|t| t.title.clone())
        .collect();

    let recommendation = next_recommendations(&ai, &completed, &remaining).await;

    Ok(Json(json!({
        "progress": path.progress_percentage,
        "completedCount": path.completed_topics,
        "totalCount": path.total_topics,
        "message": recommendation.message,
        "nextSteps": recommendation.next_steps,
        "focusTopic": recommendation.focus_topic,
    })))
}

/// Deletes the caller's learning path.
pub async fn reset_path(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM learning_paths WHERE user_id = $1")
        .bind(user_id(&claims))
        .execute(&pool)
        .await?;

    Ok(Json(json!({ "message": "Learning path reset successfully" })))
}
