// src/models/question.rs

use serde::{Deserialize, Serialize};

/// A fully-keyed multiple-choice question as held server-side, either from
/// the static catalog or parsed out of an AI generation response.
///
/// Deliberately does NOT implement `Serialize`: the answer key must never
/// travel to the client. Outbound payloads go through [`PublicQuestion`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,

    pub question: String,

    /// Exactly four options; enforced by sanitization for AI output.
    pub options: Vec<String>,

    /// Index (0-3) of the correct option.
    pub correct_answer: i64,

    #[serde(default)]
    pub explanation: String,

    #[serde(default)]
    pub difficulty: Option<String>,
}

impl Question {
    pub fn new(
        id: &str,
        question: &str,
        options: [&str; 4],
        correct_answer: i64,
        explanation: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
            explanation: explanation.to_string(),
            difficulty: None,
        }
    }
}

/// Client-facing question: instance-scoped id, text and options only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
}
