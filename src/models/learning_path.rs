// src/models/learning_path.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Progress status of a roadmap topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// A learning resource attached to a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub is_free: Option<bool>,
}

/// One roadmap topic with its tracked progress. Stored inside the
/// `learning_paths.topics` JSONB column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub status: TopicStatus,
    pub order: i32,
    #[serde(default)]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Represents the 'learning_paths' table: one roadmap per user.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: i64,

    #[serde(skip)]
    pub user_id: i64,

    pub topics: Json<Vec<TopicProgress>>,

    pub total_topics: i32,
    pub completed_topics: i32,
    pub progress_percentage: i32,

    /// Raw generator output, kept for reference/export.
    pub ai_recommendations: String,

    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl LearningPath {
    /// Recomputes the aggregate counters from the topic list.
    /// percentage = round(100 * completed / total), 0 when empty.
    pub fn recompute_progress(&mut self) {
        let total = self.topics.0.len();
        let completed = self
            .topics
            .0
            .iter()
            .filter(|t| t.status == TopicStatus::Completed)
            .count();

        self.total_topics = total as i32;
        self.completed_topics = completed as i32;
        self.progress_percentage = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as i32
        } else {
            0
        };
    }
}

/// DTO for PUT /api/recommendations/progress/{topicIndex}.
#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub status: TopicStatus,
}

/// Aggregate progress block returned after a progress update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallProgress {
    pub completed: i32,
    pub total: i32,
    pub percentage: i32,
}
