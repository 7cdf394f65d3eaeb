//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the HTTP API under a single Axum router. Handlers stay
//! thin: they translate requests into service calls and map typed service
//! errors onto status codes.

pub mod activities;
pub mod children;
pub mod parents;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/parents", post(parents::register))
        .route("/api/parents/email-free", get(parents::email_free))
        .route("/api/parents/names-and-roles", get(parents::names_and_roles))
        .route(
            "/api/parents/by-username/{username}",
            get(parents::get_parent_by_username),
        )
        .route(
            "/api/parents/by-username/{username}/picture",
            get(parents::parent_picture),
        )
        .route(
            "/api/parents/{id}",
            get(parents::get_parent).delete(parents::delete_parent),
        )
        .route("/api/parents/{id}/picture", post(parents::upload_picture))
        .route(
            "/api/parents/{id}/children",
            get(children::list_children).post(children::add_child),
        )
        .route(
            "/api/children/{id}",
            get(children::get_child).delete(children::remove_child),
        )
        .route(
            "/api/children/{id}/activities",
            get(activities::activities_of_child),
        )
        .route(
            "/api/children/{id}/activities/{activity_id}",
            post(activities::enroll_child).delete(activities::withdraw_child),
        )
        .route(
            "/api/activities",
            get(activities::list_activities).post(activities::create_activity),
        )
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
