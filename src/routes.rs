// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{assessment, auth, recommendation},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, assessments, recommendations).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, registry, catalog, AI client).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:3000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let assessment_routes = Router::new()
        .route("/subjects", get(assessment::list_subjects))
        // Protected assessment routes
        .merge(
            Router::new()
                .route("/quiz/{subject}", get(assessment::get_quiz))
                .route("/submit", post(assessment::submit_assessment))
                .route("/history", get(assessment::get_history))
                .route("/{id}", get(assessment::get_assessment))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let recommendation_routes = Router::new()
        .route("/generate", post(recommendation::generate_path))
        .route("/path", get(recommendation::get_path))
        .route("/progress/{topic_index}", put(recommendation::update_progress))
        .route("/next", get(recommendation::next_steps))
        .route("/reset", delete(recommendation::reset_path))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(health))
        .route("/api", get(api_index))
        .nest("/api/auth", auth_routes)
        .nest("/api/assessments", assessment_routes)
        .nest("/api/recommendations", recommendation_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Learning Path API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn api_index() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Personalized Learning Path API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": {
                "POST /api/auth/register": "Register new user",
                "POST /api/auth/login": "Login user",
                "GET /api/auth/me": "Get current user profile",
            },
            "assessments": {
                "GET /api/assessments/subjects": "Get available subjects",
                "GET /api/assessments/quiz/{subject}": "Get quiz questions",
                "POST /api/assessments/submit": "Submit quiz answers",
                "GET /api/assessments/history": "Get assessment history",
                "GET /api/assessments/{id}": "Get one assessment",
            },
            "recommendations": {
                "POST /api/recommendations/generate": "Generate learning path",
                "GET /api/recommendations/path": "Get current learning path",
                "PUT /api/recommendations/progress/{topicIndex}": "Update topic progress",
                "GET /api/recommendations/next": "Get next recommendations",
                "DELETE /api/recommendations/reset": "Reset learning path",
            },
        },
    }))
}
