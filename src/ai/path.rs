// src/ai/path.rs

//! Learning-path generation. The AI path consumes assessment summaries
//! and returns a topic roadmap; on any failure a deterministic fallback
//! table is substituted, so roadmap generation never errors out.

use serde::{Deserialize, Serialize};

use crate::ai::{GeminiClient, GenerationError};
use crate::grading::SkillLevel;

/// Compact view of one historical assessment, fed into the prompt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub subject: String,
    pub score: i32,
    pub skill_level: SkillLevel,
    pub correct_answers: i32,
    pub total_questions: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub is_free: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTopic {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub subject: String,
    pub difficulty: String,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub resources: Vec<PlannedResource>,
}

/// The roadmap as produced by the generator (AI or fallback).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPlan {
    pub overview: String,
    pub estimated_duration: String,
    pub topics: Vec<PlannedTopic>,
}

#[derive(Debug)]
pub struct GeneratedPath {
    pub plan: PathPlan,
    pub ai_generated: bool,
}

/// Maximum number of topics in a fallback roadmap.
const FALLBACK_TOPIC_CAP: usize = 12;

/// Builds a roadmap from assessment history. Falls back to the static
/// tables on any generation failure; `summaries` must be non-empty
/// (enforced by the handler).
pub async fn generate_learning_path(
    client: &GeminiClient,
    summaries: &[AssessmentSummary],
) -> GeneratedPath {
    match try_generate(client, summaries).await {
        Ok(plan) => GeneratedPath {
            plan,
            ai_generated: true,
        },
        Err(err) => {
            tracing::warn!("learning path generation failed ({}), using fallback", err);
            GeneratedPath {
                plan: fallback_path(summaries),
                ai_generated: false,
            }
        }
    }
}

async fn try_generate(
    client: &GeminiClient,
    summaries: &[AssessmentSummary],
) -> Result<PathPlan, GenerationError> {
    let prompt = build_prompt(summaries)?;
    let text = client.generate(&prompt).await?;

    let plan: PathPlan = serde_json::from_str(&text)?;
    if plan.topics.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(plan)
}

fn build_prompt(summaries: &[AssessmentSummary]) -> Result<String, GenerationError> {
    let summary_json = serde_json::to_string_pretty(summaries)?;

    Ok(format!(
        r#"You are an expert learning path generator. Based on the following assessment results, create a personalized learning roadmap.

Assessment Results:
{summary_json}

Generate a learning path with 8-12 topics that the user should learn. For each topic, consider:
1. The user's weak areas (low scores) should have more foundational topics
2. The user's strong areas (high scores) should have advanced topics
3. Include prerequisites relationships between topics
4. Provide real learning resources (free online resources preferred)

Return ONLY valid JSON in this exact format (no markdown, no extra text):
{{
  "overview": "Brief personalized message about the learning path",
  "estimatedDuration": "Total estimated time to complete",
  "topics": [
    {{
      "id": "topic-1",
      "title": "Topic Title",
      "description": "What this topic covers and why it's important",
      "subject": "javascript|databases|react|nodejs|general",
      "difficulty": "beginner|intermediate|advanced",
      "estimatedTime": "Time to complete this topic",
      "order": 1,
      "prerequisites": [],
      "resources": [
        {{
          "title": "Resource Title",
          "url": "https://actual-url.com",
          "type": "video|article|course|documentation|practice",
          "duration": "Duration or read time",
          "isFree": true
        }}
      ]
    }}
  ]
}}

Important:
- Use real URLs from MDN, freeCodeCamp, YouTube (specific videos), official docs, etc.
- Order topics from foundational to advanced
- Include prerequisites array with IDs of topics that should be completed first
- Make the path achievable but comprehensive"#,
    ))
}

/// Deterministic fallback: subjects ordered weakest score first, three
/// fixed topics per subject, chained prerequisites, capped at
/// [`FALLBACK_TOPIC_CAP`] topics. Requires no external call.
pub fn fallback_path(summaries: &[AssessmentSummary]) -> PathPlan {
    let mut sorted: Vec<&AssessmentSummary> = summaries.iter().collect();
    sorted.sort_by_key(|s| s.score);

    let mut topics = Vec::new();
    let mut order = 1;
    let mut seen_subjects = Vec::new();

    for summary in sorted {
        // A subject assessed twice contributes its topics once.
        if seen_subjects.contains(&summary.subject) {
            continue;
        }
        seen_subjects.push(summary.subject.clone());

        let is_weak = summary.score < 50;
        let subject_topics = fallback_topics(&summary.subject, is_weak, order);
        order += subject_topics.len() as i32;
        topics.extend(subject_topics);
    }

    topics.truncate(FALLBACK_TOPIC_CAP);

    PathPlan {
        overview: "Based on your assessment results, we've created a personalized learning path to help you improve your skills.".to_string(),
        estimated_duration: "4-6 weeks".to_string(),
        topics,
    }
}

struct FallbackTopic {
    title: &'static str,
    description: &'static str,
    difficulty: &'static str,
    resources: &'static [(&'static str, &'static str, &'static str)],
}

fn fallback_table(subject: &str) -> &'static [FallbackTopic] {
    match subject {
        "javascript" => &[
            FallbackTopic {
                title: "JavaScript Fundamentals",
                description: "Core JavaScript concepts including variables, functions, and control flow",
                difficulty: "beginner",
                resources: &[
                    (
                        "JavaScript Basics - MDN",
                        "https://developer.mozilla.org/en-US/docs/Learn/JavaScript/First_steps",
                        "documentation",
                    ),
                    (
                        "JavaScript Course - freeCodeCamp",
                        "https://www.freecodecamp.org/learn/javascript-algorithms-and-data-structures/",
                        "course",
                    ),
                ],
            },
            FallbackTopic {
                title: "ES6+ Features",
                description: "Modern JavaScript features including arrow functions, destructuring, and modules",
                difficulty: "intermediate",
                resources: &[(
                    "ES6 Features Overview",
                    "https://www.freecodecamp.org/news/write-less-do-more-with-javascript-es6-5fd4a8e50ee2/",
                    "article",
                )],
            },
            FallbackTopic {
                title: "Asynchronous JavaScript",
                description: "Promises, async/await, and handling asynchronous operations",
                difficulty: "advanced",
                resources: &[(
                    "Async JavaScript - MDN",
                    "https://developer.mozilla.org/en-US/docs/Learn/JavaScript/Asynchronous",
                    "documentation",
                )],
            },
        ],
        "databases" => &[
            FallbackTopic {
                title: "Database Fundamentals",
                description: "Understanding relational and non-relational databases",
                difficulty: "beginner",
                resources: &[(
                    "Database Design Course",
                    "https://www.freecodecamp.org/news/database-design-course/",
                    "course",
                )],
            },
            FallbackTopic {
                title: "SQL Querying",
                description: "SELECT, JOINs, aggregation and indexes in practice",
                difficulty: "intermediate",
                resources: &[(
                    "SQLBolt Interactive Lessons",
                    "https://sqlbolt.com/",
                    "practice",
                )],
            },
            FallbackTopic {
                title: "MongoDB Essentials",
                description: "Working with MongoDB, documents, and queries",
                difficulty: "intermediate",
                resources: &[(
                    "MongoDB University",
                    "https://university.mongodb.com/",
                    "course",
                )],
            },
        ],
        "react" => &[
            FallbackTopic {
                title: "React Basics",
                description: "Components, JSX, and React fundamentals",
                difficulty: "beginner",
                resources: &[(
                    "React Documentation",
                    "https://react.dev/learn",
                    "documentation",
                )],
            },
            FallbackTopic {
                title: "React Hooks",
                description: "useState, useEffect, and custom hooks",
                difficulty: "intermediate",
                resources: &[(
                    "React Hooks Guide",
                    "https://react.dev/reference/react/hooks",
                    "documentation",
                )],
            },
            FallbackTopic {
                title: "State Management Patterns",
                description: "Lifting state, context, and an introduction to Redux",
                difficulty: "advanced",
                resources: &[(
                    "Managing State - React Docs",
                    "https://react.dev/learn/managing-state",
                    "documentation",
                )],
            },
        ],
        "nodejs" => &[
            FallbackTopic {
                title: "Node.js Basics",
                description: "Understanding Node.js runtime and core modules",
                difficulty: "beginner",
                resources: &[(
                    "Node.js Tutorial",
                    "https://nodejs.org/en/learn/getting-started/introduction-to-nodejs",
                    "documentation",
                )],
            },
            FallbackTopic {
                title: "Express.js Framework",
                description: "Building REST APIs with Express",
                difficulty: "intermediate",
                resources: &[(
                    "Express.js Guide",
                    "https://expressjs.com/en/starter/installing.html",
                    "documentation",
                )],
            },
            FallbackTopic {
                title: "Authentication and Security",
                description: "Sessions, JWTs and securing Node.js APIs",
                difficulty: "advanced",
                resources: &[(
                    "Node.js Security Best Practices",
                    "https://nodejs.org/en/learn/getting-started/security-best-practices",
                    "documentation",
                )],
            },
        ],
        _ => &[],
    }
}

fn fallback_topics(subject: &str, is_weak: bool, start_order: i32) -> Vec<PlannedTopic> {
    let estimated_time = if is_weak { "1-2 weeks" } else { "3-5 days" };

    fallback_table(subject)
        .iter()
        .enumerate()
        .map(|(index, topic)| PlannedTopic {
            id: format!("{}-{}", subject, index + 1),
            title: topic.title.to_string(),
            description: topic.description.to_string(),
            subject: subject.to_string(),
            difficulty: topic.difficulty.to_string(),
            estimated_time: Some(estimated_time.to_string()),
            order: start_order + index as i32,
            prerequisites: if index > 0 {
                vec![format!("{}-{}", subject, index)]
            } else {
                vec![]
            },
            resources: topic
                .resources
                .iter()
                .map(|(title, url, resource_type)| PlannedResource {
                    title: title.to_string(),
                    url: url.to_string(),
                    resource_type: resource_type.to_string(),
                    duration: Some("Self-paced".to_string()),
                    is_free: Some(true),
                })
                .collect(),
        })
        .collect()
}

/// Next-step recommendation block for GET /api/recommendations/next.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSteps {
    pub message: String,
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub focus_topic: Option<String>,
}

/// Suggests what to focus on next; static encouragement on failure.
pub async fn next_recommendations(
    client: &GeminiClient,
    completed: &[String],
    remaining: &[String],
) -> NextSteps {
    let prompt = format!(
        r#"Based on the user's progress, suggest what they should focus on next.

Completed Topics: {}
Remaining Topics: {}

Provide a brief motivational message and 2-3 specific next steps. Return as JSON:
{{
  "message": "Encouraging message about progress",
  "nextSteps": ["Step 1", "Step 2", "Step 3"],
  "focusTopic": "The most important topic to focus on next"
}}"#,
        completed.join(", "),
        remaining.join(", "),
    );

    let attempt = async {
        let text = client.generate(&prompt).await?;
        let steps: NextSteps = serde_json::from_str(&text)?;
        Ok::<_, GenerationError>(steps)
    };

    match attempt.await {
        Ok(steps) => steps,
        Err(err) => {
            tracing::warn!("next-step generation failed ({}), using fallback", err);
            NextSteps {
                message: "Great progress! Keep going!".to_string(),
                next_steps: vec!["Continue with the next topic in your path".to_string()],
                focus_topic: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(subject: &str, score: i32) -> AssessmentSummary {
        AssessmentSummary {
            subject: subject.to_string(),
            score,
            skill_level: SkillLevel::from_score(score),
            correct_answers: score / 10,
            total_questions: 10,
        }
    }

    #[test]
    fn fallback_orders_weakest_subject_first() {
        let plan = fallback_path(&[summary("javascript", 90), summary("databases", 20)]);

        assert!(plan.topics[0].subject == "databases");
        assert_eq!(plan.topics[0].order, 1);

        // Orders are contiguous across the whole plan.
        let orders: Vec<i32> = plan.topics.iter().map(|t| t.order).collect();
        assert_eq!(orders, (1..=plan.topics.len() as i32).collect::<Vec<_>>());
    }

    #[test]
    fn fallback_is_deterministic() {
        let summaries = [summary("react", 55), summary("nodejs", 30)];
        let a = serde_json::to_string(&fallback_path(&summaries)).unwrap();
        let b = serde_json::to_string(&fallback_path(&summaries)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fallback_caps_at_twelve_topics() {
        let summaries = [
            summary("javascript", 10),
            summary("databases", 20),
            summary("react", 30),
            summary("nodejs", 40),
            summary("javascript", 50), // repeat ignored
        ];
        let plan = fallback_path(&summaries);
        assert_eq!(plan.topics.len(), 12);
    }

    #[test]
    fn fallback_chains_prerequisites_within_a_subject() {
        let plan = fallback_path(&[summary("react", 45)]);

        assert!(plan.topics[0].prerequisites.is_empty());
        assert_eq!(plan.topics[1].prerequisites, vec!["react-1".to_string()]);
        assert_eq!(plan.topics[2].prerequisites, vec!["react-2".to_string()]);
    }

    #[test]
    fn weak_subjects_get_longer_estimates() {
        let weak = fallback_path(&[summary("nodejs", 10)]);
        let strong = fallback_path(&[summary("nodejs", 80)]);

        assert_eq!(weak.topics[0].estimated_time.as_deref(), Some("1-2 weeks"));
        assert_eq!(strong.topics[0].estimated_time.as_deref(), Some("3-5 days"));
    }

    #[test]
    fn unknown_subject_contributes_no_topics() {
        let plan = fallback_path(&[summary("fortran", 10)]);
        assert!(plan.topics.is_empty());
    }

    #[test]
    fn plan_round_trips_with_camel_case_keys() {
        let plan = fallback_path(&[summary("javascript", 42)]);
        let json = serde_json::to_value(&plan).unwrap();

        assert!(json.get("estimatedDuration").is_some());
        assert!(json["topics"][0].get("estimatedTime").is_some());
        assert!(json["topics"][0]["resources"][0].get("isFree").is_some());

        let back: PathPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back.topics.len(), plan.topics.len());
    }

    #[tokio::test]
    async fn disabled_client_yields_fallback_plan() {
        let client = GeminiClient::new(None, "gemini-1.5-flash".to_string());
        let generated = generate_learning_path(&client, &[summary("javascript", 35)]).await;

        assert!(!generated.ai_generated);
        assert_eq!(generated.plan.topics.len(), 3);
    }

    #[tokio::test]
    async fn disabled_client_yields_fallback_next_steps() {
        let client = GeminiClient::new(None, "gemini-1.5-flash".to_string());
        let steps =
            next_recommendations(&client, &["React Basics".to_string()], &["Hooks".to_string()])
                .await;

        assert_eq!(steps.message, "Great progress! Keep going!");
        assert!(steps.focus_topic.is_none());
    }
}
