// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

/// Number of questions the AI generator is asked for per quiz.
pub const QUIZ_QUESTION_COUNT: usize = 10;

/// How long an issued quiz instance stays gradable.
pub const INSTANCE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Interval of the background expiry sweep.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Gemini API key. Absent means quiz and roadmap generation always
    /// take the static fallback path.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24 * 60 * 60);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            gemini_api_key,
            gemini_model,
            port,
        }
    }
}
