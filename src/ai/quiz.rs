// src/ai/quiz.rs

//! AI quiz generation with a static-catalog fallback.

use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::ai::{GeminiClient, GenerationError};
use crate::catalog::SubjectQuiz;
use crate::models::question::Question;

/// A freshly assembled quiz, ready to be registered and issued.
#[derive(Debug)]
pub struct GeneratedQuiz {
    pub subject: String,
    pub title: String,
    pub description: String,
    pub time_limit: i64,
    pub ai_generated: bool,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct RawQuiz {
    questions: Vec<Question>,
}

/// Builds a quiz for `subject`: AI-generated when possible, otherwise a
/// shuffled copy of the static bank. Never fails.
pub async fn generate_fresh_quiz(
    client: &GeminiClient,
    subject: &SubjectQuiz,
    num_questions: usize,
) -> GeneratedQuiz {
    match try_generate(client, subject, num_questions).await {
        Ok(questions) => GeneratedQuiz {
            subject: subject.id.to_string(),
            title: format!("{} Assessment", subject.title),
            description: format!(
                "AI-generated assessment to test your {} knowledge",
                subject.title
            ),
            time_limit: subject.time_limit,
            ai_generated: true,
            questions,
        },
        Err(err) => {
            tracing::warn!(
                subject = subject.id,
                "quiz generation failed ({}), using static fallback",
                err
            );
            fallback_quiz(subject)
        }
    }
}

async fn try_generate(
    client: &GeminiClient,
    subject: &SubjectQuiz,
    num_questions: usize,
) -> Result<Vec<Question>, GenerationError> {
    let prompt = build_prompt(subject, num_questions);
    let text = client.generate(&prompt).await?;

    let raw: RawQuiz = serde_json::from_str(&text)?;
    let questions = sanitize_questions(subject.id, raw.questions);

    if questions.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(questions)
}

fn build_prompt(subject: &SubjectQuiz, num_questions: usize) -> String {
    format!(
        r#"You are an expert quiz generator. Create {num_questions} unique multiple-choice questions for a {title} skill assessment.

Topics to cover: {topics}

Requirements:
1. Questions should vary in difficulty (some easy, some medium, some hard)
2. Each question must have exactly 4 options
3. Questions should test practical knowledge, not just definitions
4. Include some code-based questions where appropriate

Return ONLY valid JSON in this exact format (no markdown, no extra text):
{{
  "questions": [
    {{
      "id": "q1",
      "question": "The question text goes here?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctAnswer": 0,
      "explanation": "Brief explanation of why this answer is correct",
      "difficulty": "easy|medium|hard"
    }}
  ]
}}

Important:
- correctAnswer is the index (0-3) of the correct option
- Test real understanding, not memorization
- Include practical scenarios when possible"#,
        num_questions = num_questions,
        title = subject.title,
        topics = subject.topics,
    )
}

/// Drops malformed questions (wrong option count, out-of-range key) and
/// restamps ids so they are stable for this service.
fn sanitize_questions(subject_id: &str, questions: Vec<Question>) -> Vec<Question> {
    questions
        .into_iter()
        .filter(|q| q.options.len() == 4 && (0..4).contains(&q.correct_answer))
        .enumerate()
        .map(|(index, mut q)| {
            q.id = format!("{}-ai-{}", subject_id, index);
            if q.explanation.is_empty() {
                q.explanation = "Review the topic for more details.".to_string();
            }
            q
        })
        .collect()
}

/// Shuffled copy of the static bank. Ids are kept stable so a lost
/// instance can still be graded by raw question id.
fn fallback_quiz(subject: &SubjectQuiz) -> GeneratedQuiz {
    let mut questions = subject.questions.clone();
    questions.shuffle(&mut rand::thread_rng());

    GeneratedQuiz {
        subject: subject.id.to_string(),
        title: subject.title.to_string(),
        description: subject.description.to_string(),
        time_limit: subject.time_limit,
        ai_generated: false,
        questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn sanitize_drops_malformed_questions() {
        let questions = vec![
            Question::new("a", "Fine?", ["A", "B", "C", "D"], 3, "yes"),
            Question {
                id: "b".to_string(),
                question: "Too few options".to_string(),
                options: vec!["A".to_string(), "B".to_string()],
                correct_answer: 0,
                explanation: String::new(),
                difficulty: None,
            },
            Question::new("c", "Bad key?", ["A", "B", "C", "D"], 9, ""),
        ];

        let clean = sanitize_questions("javascript", questions);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].id, "javascript-ai-0");
    }

    #[test]
    fn sanitize_fills_missing_explanations() {
        let questions = vec![Question::new("a", "Q?", ["A", "B", "C", "D"], 0, "")];
        let clean = sanitize_questions("react", questions);
        assert_eq!(clean[0].explanation, "Review the topic for more details.");
    }

    #[test]
    fn ai_response_parses_with_camel_case_keys() {
        let text = r#"{"questions": [{"id": "q1", "question": "Q?",
            "options": ["A","B","C","D"], "correctAnswer": 2,
            "explanation": "because", "difficulty": "easy"}]}"#;

        let raw: RawQuiz = serde_json::from_str(text).unwrap();
        assert_eq!(raw.questions[0].correct_answer, 2);
        assert_eq!(raw.questions[0].difficulty.as_deref(), Some("easy"));
    }

    #[tokio::test]
    async fn disabled_client_falls_back_to_static_bank() {
        let catalog = Catalog::new();
        let subject = catalog.subject("javascript").unwrap();
        let client = GeminiClient::new(None, "gemini-1.5-flash".to_string());

        let quiz = generate_fresh_quiz(&client, subject, 10).await;

        assert!(!quiz.ai_generated);
        assert_eq!(quiz.questions.len(), subject.questions.len());

        // Fallback keeps catalog ids so raw-id grading still works.
        let mut ids: Vec<&str> = quiz.questions.iter().map(|q| q.id.as_str()).collect();
        ids.sort();
        let mut expected: Vec<&str> = subject.questions.iter().map(|q| q.id.as_str()).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }
}
