// src/grading.rs

//! Pure grading engine: no I/O, no clock, no store access. The caller
//! resolves the question set (consumed registry instance or static
//! catalog) and persists the result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::question::Question;
use crate::registry::QuestionEntry;

/// Derived skill tier. The thresholds live in exactly one place
/// ([`SkillLevel::from_score`]) so grading and persistence cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// score < 40 -> beginner, 40..75 -> intermediate, >= 75 -> advanced.
    pub fn from_score(score: i32) -> Self {
        if score >= 75 {
            SkillLevel::Advanced
        } else if score >= 40 {
            SkillLevel::Intermediate
        } else {
            SkillLevel::Beginner
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

/// One client-supplied answer. Unvalidated input: `selected_option` may be
/// any integer and `question_id` may be unknown; both grade as incorrect,
/// never as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub selected_option: i64,
}

/// Persisted per-answer grading outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub question_id: String,
    pub selected_option: i64,
    pub is_correct: bool,
}

/// One row of the post-submission review, in the order the questions were
/// issued. `selected_answer` is `None` for unanswered questions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReview {
    pub question_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i64,
    pub selected_answer: Option<i64>,
    pub is_correct: bool,
    pub explanation: String,
}

/// Where the answer key came from: a consumed registry instance (matched
/// by exposed id) or the static catalog (matched by raw question id).
#[derive(Debug)]
pub enum Resolution {
    Instanced(Vec<QuestionEntry>),
    StaticFallback(Vec<Question>),
}

/// Output of the grading engine.
#[derive(Debug)]
pub struct GradedResult {
    pub subject: String,
    pub score: i32,
    pub correct_answers: i32,
    pub total_questions: i32,
    pub skill_level: SkillLevel,
    /// One entry per submitted answer, for persistence.
    pub answers: Vec<GradedAnswer>,
    /// One entry per issued question, for the client review.
    pub results: Vec<AnswerReview>,
}

const DEFAULT_EXPLANATION: &str = "Review the topic for more details.";

/// A question in uniform shape regardless of resolution source.
struct ResolvedQuestion {
    /// Id answers are matched against: exposed id (instanced) or raw id.
    match_id: String,
    /// Id recorded in the persisted answer list.
    original_id: String,
    question: String,
    options: Vec<String>,
    correct_index: i64,
    explanation: String,
}

fn resolve(resolution: Resolution) -> Vec<ResolvedQuestion> {
    match resolution {
        Resolution::Instanced(entries) => entries
            .into_iter()
            .map(|e| ResolvedQuestion {
                match_id: e.exposed_id,
                original_id: e.original_id,
                question: e.question,
                options: e.options,
                correct_index: e.correct_index,
                explanation: e.explanation,
            })
            .collect(),
        Resolution::StaticFallback(questions) => questions
            .into_iter()
            .map(|q| ResolvedQuestion {
                match_id: q.id.clone(),
                original_id: q.id,
                question: q.question,
                options: q.options,
                correct_index: q.correct_answer,
                explanation: q.explanation,
            })
            .collect(),
    }
}

/// Grades a submission against the resolved question set.
///
/// Scored out of the full question count, not the number of submitted
/// answers; score = round(100 * correct / total), half-up.
pub fn grade(subject: &str, submitted: &[SubmittedAnswer], resolution: Resolution) -> GradedResult {
    let questions = resolve(resolution);

    let by_match_id: HashMap<&str, &ResolvedQuestion> = questions
        .iter()
        .map(|q| (q.match_id.as_str(), q))
        .collect();

    let mut correct_count = 0;
    let mut answers = Vec::with_capacity(submitted.len());

    for answer in submitted {
        let (is_correct, recorded_id) = match by_match_id.get(answer.question_id.as_str()) {
            Some(q) => (
                q.correct_index == answer.selected_option,
                q.original_id.clone(),
            ),
            // Stale or unknown id: incorrect, recorded under the
            // submitted id.
            None => (false, answer.question_id.clone()),
        };

        if is_correct {
            correct_count += 1;
        }

        answers.push(GradedAnswer {
            question_id: recorded_id,
            selected_option: answer.selected_option,
            is_correct,
        });
    }

    let total_questions = questions.len() as i32;
    let score = if total_questions > 0 {
        ((correct_count as f64 / total_questions as f64) * 100.0).round() as i32
    } else {
        0
    };

    let results = questions
        .iter()
        .map(|q| {
            let selected = submitted
                .iter()
                .find(|a| a.question_id == q.match_id)
                .map(|a| a.selected_option);

            let explanation = if q.explanation.is_empty() {
                DEFAULT_EXPLANATION.to_string()
            } else {
                q.explanation.clone()
            };

            AnswerReview {
                question_id: q.match_id.clone(),
                question: q.question.clone(),
                options: q.options.clone(),
                correct_answer: q.correct_index,
                selected_answer: selected,
                is_correct: selected == Some(q.correct_index),
                explanation,
            }
        })
        .collect();

    GradedResult {
        subject: subject.to_string(),
        score,
        correct_answers: correct_count,
        total_questions,
        skill_level: SkillLevel::from_score(score),
        answers,
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::QuizRegistry;

    fn static_questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::new(
                    &format!("js-{}", i + 1),
                    &format!("Question {}?", i + 1),
                    ["A", "B", "C", "D"],
                    0,
                    "Because A.",
                )
            })
            .collect()
    }

    fn answers_for(ids: &[String], selected: i64) -> Vec<SubmittedAnswer> {
        ids.iter()
            .map(|id| SubmittedAnswer {
                question_id: id.clone(),
                selected_option: selected,
            })
            .collect()
    }

    #[test]
    fn skill_level_boundaries() {
        assert_eq!(SkillLevel::from_score(0), SkillLevel::Beginner);
        assert_eq!(SkillLevel::from_score(39), SkillLevel::Beginner);
        assert_eq!(SkillLevel::from_score(40), SkillLevel::Intermediate);
        assert_eq!(SkillLevel::from_score(74), SkillLevel::Intermediate);
        assert_eq!(SkillLevel::from_score(75), SkillLevel::Advanced);
        assert_eq!(SkillLevel::from_score(100), SkillLevel::Advanced);
    }

    #[test]
    fn perfect_static_submission_scores_100() {
        let questions = static_questions(4);
        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();

        let result = grade(
            "javascript",
            &answers_for(&ids, 0),
            Resolution::StaticFallback(questions),
        );

        assert_eq!(result.score, 100);
        assert_eq!(result.correct_answers, 4);
        assert_eq!(result.total_questions, 4);
        assert_eq!(result.skill_level, SkillLevel::Advanced);
        assert!(result.results.iter().all(|r| r.is_correct));
    }

    #[test]
    fn score_rounds_half_up() {
        // 1 of 8 correct -> 12.5 -> 13
        let questions = static_questions(8);
        let answers = vec![SubmittedAnswer {
            question_id: "js-1".to_string(),
            selected_option: 0,
        }];

        let result = grade("javascript", &answers, Resolution::StaticFallback(questions));
        assert_eq!(result.score, 13);

        // 1 of 3 correct -> 33.33 -> 33
        let questions = static_questions(3);
        let answers = vec![SubmittedAnswer {
            question_id: "js-1".to_string(),
            selected_option: 0,
        }];
        let result = grade("javascript", &answers, Resolution::StaticFallback(questions));
        assert_eq!(result.score, 33);
    }

    #[test]
    fn short_submission_is_scored_out_of_full_question_count() {
        let questions = static_questions(10);
        let answers = answers_for(
            &questions.iter().take(4).map(|q| q.id.clone()).collect::<Vec<_>>(),
            0,
        );

        let result = grade("javascript", &answers, Resolution::StaticFallback(questions));

        assert_eq!(result.total_questions, 10);
        assert_eq!(result.correct_answers, 4);
        assert_eq!(result.score, 40);

        // Unanswered questions appear in the review as incorrect with no
        // selection.
        let unanswered: Vec<_> = result
            .results
            .iter()
            .filter(|r| r.selected_answer.is_none())
            .collect();
        assert_eq!(unanswered.len(), 6);
        assert!(unanswered.iter().all(|r| !r.is_correct));
    }

    #[test]
    fn out_of_range_selection_is_incorrect_not_an_error() {
        let questions = static_questions(2);
        let answers = vec![
            SubmittedAnswer {
                question_id: "js-1".to_string(),
                selected_option: 17,
            },
            SubmittedAnswer {
                question_id: "js-2".to_string(),
                selected_option: -3,
            },
        ];

        let result = grade("javascript", &answers, Resolution::StaticFallback(questions));
        assert_eq!(result.correct_answers, 0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn unknown_question_id_is_recorded_under_submitted_id() {
        let questions = static_questions(2);
        let answers = vec![SubmittedAnswer {
            question_id: "nope".to_string(),
            selected_option: 0,
        }];

        let result = grade("javascript", &answers, Resolution::StaticFallback(questions));
        assert_eq!(result.correct_answers, 0);
        assert_eq!(result.answers[0].question_id, "nope");
        assert!(!result.answers[0].is_correct);
    }

    #[test]
    fn empty_submission_grades_as_zero() {
        let result = grade(
            "javascript",
            &[],
            Resolution::StaticFallback(static_questions(5)),
        );
        assert_eq!(result.score, 0);
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.skill_level, SkillLevel::Beginner);
        assert!(result.results.iter().all(|r| r.selected_answer.is_none()));
    }

    #[test]
    fn review_preserves_issue_order_and_fills_default_explanation() {
        let mut questions = static_questions(3);
        questions[1].explanation = String::new();

        let result = grade("javascript", &[], Resolution::StaticFallback(questions));

        let ids: Vec<&str> = result.results.iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, vec!["js-1", "js-2", "js-3"]);
        assert_eq!(result.results[1].explanation, "Review the topic for more details.");
        assert_eq!(result.results[0].explanation, "Because A.");
    }

    #[test]
    fn end_to_end_instanced_grading_eight_of_ten() {
        let registry = QuizRegistry::new();
        let questions = static_questions(10);
        let instance_id = registry.create("javascript", &questions);
        let instance = registry.consume(&instance_id).unwrap();

        // Answer all ten via exposed ids, first eight correctly.
        let answers: Vec<SubmittedAnswer> = instance
            .questions
            .iter()
            .enumerate()
            .map(|(i, entry)| SubmittedAnswer {
                question_id: entry.exposed_id.clone(),
                selected_option: if i < 8 { entry.correct_index } else { entry.correct_index + 1 },
            })
            .collect();

        let result = grade(
            "javascript",
            &answers,
            Resolution::Instanced(instance.questions),
        );

        assert_eq!(result.score, 80);
        assert_eq!(result.correct_answers, 8);
        assert_eq!(result.total_questions, 10);
        assert_eq!(result.skill_level, SkillLevel::Advanced);

        // Persisted answers carry original ids, not exposed ids.
        assert!(result.answers.iter().all(|a| a.question_id.starts_with("js-")));
    }

    #[test]
    fn lost_instance_falls_back_to_raw_id_grading() {
        let registry = QuizRegistry::new();
        let questions = static_questions(4);
        let instance_id = registry.create("javascript", &questions);

        // First consumption wins; a replayed submission sees NotFound...
        assert!(registry.consume(&instance_id).is_some());
        assert!(registry.consume(&instance_id).is_none());

        // ...and is graded against the static set by raw id.
        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let result = grade(
            "javascript",
            &answers_for(&ids, 0),
            Resolution::StaticFallback(questions),
        );
        assert_eq!(result.score, 100);
    }
}
