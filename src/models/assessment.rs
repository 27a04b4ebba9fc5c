// src/models/assessment.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

use crate::grading::{AnswerReview, GradedAnswer, SkillLevel, SubmittedAnswer};
use crate::models::question::PublicQuestion;

/// Represents the 'assessments' table: one finalized graded attempt.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: i64,

    #[serde(skip)]
    pub user_id: i64,

    pub subject: String,

    /// Per-answer grading detail, stored as JSONB.
    pub answers: Json<Vec<GradedAnswer>>,

    /// Aggregate score in [0, 100].
    pub score: i32,

    pub total_questions: i32,

    pub correct_answers: i32,

    /// Seconds the client reported spending on the quiz.
    pub time_taken: i32,

    pub skill_level: String,

    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// One entry of GET /api/assessments/subjects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub question_count: usize,
    pub time_limit: i64,
}

/// DTO for an issued quiz: questions stripped of answer keys, plus the
/// instance id the client must echo back on submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub subject: String,
    pub title: String,
    pub description: String,
    pub time_limit: i64,
    pub quiz_instance_id: String,
    pub is_ai_generated: bool,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentRequest {
    pub subject: String,

    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,

    #[serde(default)]
    pub time_taken: Option<i32>,

    /// Absent for legacy clients; grading then falls back to raw
    /// question-id matching against the static catalog.
    #[serde(default)]
    pub quiz_instance_id: Option<String>,
}

/// DTO for the grading result returned on submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentResponse {
    pub assessment_id: i64,
    pub subject: String,
    pub score: i32,
    pub skill_level: SkillLevel,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub time_taken: i32,
    pub results: Vec<AnswerReview>,
}
