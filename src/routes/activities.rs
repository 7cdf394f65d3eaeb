//! Activity and enrollment routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use crate::services::activity::{self, ActivityError};
use crate::state::AppState;

pub(crate) fn activity_status(err: &ActivityError) -> StatusCode {
    match err {
        ActivityError::NotFound(_) | ActivityError::ChildNotFound(_) | ActivityError::NotEnrolled { .. } => {
            StatusCode::NOT_FOUND
        }
        ActivityError::NameTaken(_) | ActivityError::ActivityFull(_) => StatusCode::CONFLICT,
        ActivityError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_and_map(err: &ActivityError, op: &'static str) -> StatusCode {
    let status = activity_status(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, %op, "activity route failed");
    }
    status
}

#[derive(Deserialize)]
pub struct NewActivity {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub capacity: Option<i32>,
}

/// `POST /api/activities` — create an activity.
pub async fn create_activity(
    State(state): State<AppState>,
    Json(new): Json<NewActivity>,
) -> Result<impl IntoResponse, StatusCode> {
    let row = activity::create_activity(&state.pool, &state.events, &new.name, &new.description, new.capacity)
        .await
        .map_err(|e| log_and_map(&e, "create_activity"))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/activities` — list all activities.
pub async fn list_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<activity::ActivityRow>>, StatusCode> {
    let rows = activity::list_activities(&state.pool)
        .await
        .map_err(|e| log_and_map(&e, "list_activities"))?;
    Ok(Json(rows))
}

/// `POST /api/children/{id}/activities/{activity_id}` — enroll a child.
pub async fn enroll_child(
    State(state): State<AppState>,
    Path((child_id, activity_id)): Path<(i64, i64)>,
) -> Result<StatusCode, StatusCode> {
    activity::enroll_child(&state.pool, &state.events, child_id, activity_id)
        .await
        .map_err(|e| log_and_map(&e, "enroll_child"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/children/{id}/activities/{activity_id}` — withdraw a child.
pub async fn withdraw_child(
    State(state): State<AppState>,
    Path((child_id, activity_id)): Path<(i64, i64)>,
) -> Result<StatusCode, StatusCode> {
    activity::withdraw_child(&state.pool, child_id, activity_id)
        .await
        .map_err(|e| log_and_map(&e, "withdraw_child"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/children/{id}/activities` — activities a child is enrolled in.
pub async fn activities_of_child(
    State(state): State<AppState>,
    Path(child_id): Path<i64>,
) -> Result<Json<Vec<activity::ActivityRow>>, StatusCode> {
    let rows = activity::activities_of_child(&state.pool, child_id)
        .await
        .map_err(|e| log_and_map(&e, "activities_of_child"))?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_status_maps_conflicts_to_409() {
        assert_eq!(activity_status(&ActivityError::ActivityFull(1)), StatusCode::CONFLICT);
        assert_eq!(activity_status(&ActivityError::NameTaken("x".into())), StatusCode::CONFLICT);
    }

    #[test]
    fn activity_status_maps_missing_records_to_404() {
        assert_eq!(activity_status(&ActivityError::NotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(activity_status(&ActivityError::ChildNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            activity_status(&ActivityError::NotEnrolled { child_id: 1, activity_id: 2 }),
            StatusCode::NOT_FOUND
        );
    }
}
