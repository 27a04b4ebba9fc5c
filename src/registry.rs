// src/registry.rs

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config::INSTANCE_TTL;
use crate::models::question::Question;

/// One question of an issued quiz instance, answer key included.
/// The `exposed_id -> correct_index` mapping lives only here; clients
/// only ever see the exposed id, text and options.
#[derive(Debug, Clone)]
pub struct QuestionEntry {
    /// Instance-scoped id handed to the client (`{instance_id}-q{index}`).
    pub exposed_id: String,
    /// Id of the question as produced by the generator or catalog.
    pub original_id: String,
    pub correct_index: i64,
    pub question: String,
    pub options: Vec<String>,
    pub explanation: String,
}

/// A single issued quiz attempt. Read-only after creation; removed on
/// consumption or expiry, whichever comes first.
#[derive(Debug, Clone)]
pub struct QuizInstance {
    pub subject: String,
    pub questions: Vec<QuestionEntry>,
    created_at: Instant,
}

/// Brokers the one-time answer key between quiz issuance and grading.
///
/// Explicitly-owned keyed store, constructed once at server start and
/// shared through `AppState`. All operations take the lock for the whole
/// check-and-mutate step, so two concurrent submissions against the same
/// instance cannot both consume it.
#[derive(Debug)]
pub struct QuizRegistry {
    instances: Mutex<HashMap<String, QuizInstance>>,
    ttl: Duration,
}

/// Derives the client-visible id of the question at `index`.
pub fn exposed_question_id(instance_id: &str, index: usize) -> String {
    format!("{}-q{}", instance_id, index)
}

impl QuizRegistry {
    pub fn new() -> Self {
        Self::with_ttl(INSTANCE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Mints a fresh instance for `questions` and stores its answer key.
    /// Returns the opaque instance id (`{subject}-{uuid_v4}`).
    pub fn create(&self, subject: &str, questions: &[Question]) -> String {
        let instance_id = format!("{}-{}", subject, Uuid::new_v4());

        let entries = questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionEntry {
                exposed_id: exposed_question_id(&instance_id, index),
                original_id: q.id.clone(),
                correct_index: q.correct_answer,
                question: q.question.clone(),
                options: q.options.clone(),
                explanation: q.explanation.clone(),
            })
            .collect();

        let instance = QuizInstance {
            subject: subject.to_string(),
            questions: entries,
            created_at: Instant::now(),
        };

        let mut instances = self.lock();
        instances.insert(instance_id.clone(), instance);

        instance_id
    }

    /// Looks up and removes the instance in one step (one-shot semantics).
    ///
    /// Returns `None` for unknown, already-consumed or expired ids; callers
    /// degrade to static-fallback grading in that case. Entries past TTL
    /// are treated as absent even if the sweeper has not run yet.
    pub fn consume(&self, instance_id: &str) -> Option<QuizInstance> {
        let mut instances = self.lock();
        let instance = instances.remove(instance_id)?;

        if instance.created_at.elapsed() > self.ttl {
            return None;
        }

        Some(instance)
    }

    /// Removes every instance older than the TTL. Returns the number of
    /// removed entries. Driven by a periodic background task.
    pub fn sweep_expired(&self) -> usize {
        let mut instances = self.lock();
        let before = instances.len();
        instances.retain(|_, instance| instance.created_at.elapsed() <= self.ttl);
        before - instances.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, QuizInstance>> {
        self.instances
            .lock()
            .expect("quiz registry mutex poisoned")
    }
}

impl Default for QuizRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    &format!("js-{}", i + 1),
                    &format!("Question {}?", i + 1),
                    ["A", "B", "C", "D"],
                    (i % 4) as i64,
                    "Because.",
                )
            })
            .collect()
    }

    #[test]
    fn create_then_consume_returns_key_exactly_once() {
        let registry = QuizRegistry::new();
        let id = registry.create("javascript", &sample_questions(3));

        let instance = registry.consume(&id).expect("first consume should hit");
        assert_eq!(instance.subject, "javascript");
        assert_eq!(instance.questions.len(), 3);
        assert_eq!(instance.questions[0].exposed_id, format!("{}-q0", id));
        assert_eq!(instance.questions[0].original_id, "js-1");

        // One-shot: second consume must miss.
        assert!(registry.consume(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn consume_unknown_id_is_none() {
        let registry = QuizRegistry::new();
        assert!(registry.consume("javascript-does-not-exist").is_none());
    }

    #[test]
    fn instance_ids_are_unique_and_subject_prefixed() {
        let registry = QuizRegistry::new();
        let a = registry.create("react", &sample_questions(1));
        let b = registry.create("react", &sample_questions(1));

        assert_ne!(a, b);
        assert!(a.starts_with("react-"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn expired_instance_is_not_consumable() {
        let registry = QuizRegistry::with_ttl(Duration::ZERO);
        let id = registry.create("nodejs", &sample_questions(2));

        std::thread::sleep(Duration::from_millis(5));
        assert!(registry.consume(&id).is_none());
    }

    #[test]
    fn sweep_removes_only_expired_instances() {
        let expiring = QuizRegistry::with_ttl(Duration::ZERO);
        let id = expiring.create("databases", &sample_questions(1));
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(expiring.sweep_expired(), 1);
        assert!(expiring.consume(&id).is_none());

        let fresh = QuizRegistry::new();
        fresh.create("databases", &sample_questions(1));
        assert_eq!(fresh.sweep_expired(), 0);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn concurrent_consume_yields_exactly_one_winner() {
        let registry = Arc::new(QuizRegistry::new());
        let id = registry.create("javascript", &sample_questions(5));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let id = id.clone();
                std::thread::spawn(move || registry.consume(&id).is_some())
            })
            .collect();

        let wins = handles
            .into_iter()
            .filter(|h| h.join().unwrap())
            .count();

        assert_eq!(wins, 1);
    }
}
