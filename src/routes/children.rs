//! Child routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use crate::services::child::{self, ChildError};
use crate::state::AppState;

pub(crate) fn child_status(err: &ChildError) -> StatusCode {
    match err {
        ChildError::NotFound(_) | ChildError::ParentNotFound(_) => StatusCode::NOT_FOUND,
        ChildError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_and_map(err: &ChildError, op: &'static str) -> StatusCode {
    let status = child_status(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, %op, "child route failed");
    }
    status
}

#[derive(Deserialize)]
pub struct NewChild {
    pub full_name: String,
    pub age: i32,
}

/// `POST /api/parents/{id}/children` — register a child under a parent.
pub async fn add_child(
    State(state): State<AppState>,
    Path(parent_id): Path<i64>,
    Json(new): Json<NewChild>,
) -> Result<impl IntoResponse, StatusCode> {
    let row = child::add_child(&state.pool, &state.events, parent_id, &new.full_name, new.age)
        .await
        .map_err(|e| log_and_map(&e, "add_child"))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/parents/{id}/children` — list a parent's children.
pub async fn list_children(
    State(state): State<AppState>,
    Path(parent_id): Path<i64>,
) -> Result<Json<Vec<child::ChildRow>>, StatusCode> {
    let rows = child::children_of_parent(&state.pool, parent_id)
        .await
        .map_err(|e| log_and_map(&e, "list_children"))?;
    Ok(Json(rows))
}

/// `GET /api/children/{id}` — look up a child.
pub async fn get_child(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<child::ChildRow>, StatusCode> {
    let row = child::find_child_by_id(&state.pool, id)
        .await
        .map_err(|e| log_and_map(&e, "get_child"))?;
    Ok(Json(row))
}

/// `DELETE /api/children/{id}` — remove a child record.
pub async fn remove_child(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    child::remove_child(&state.pool, id)
        .await
        .map_err(|e| log_and_map(&e, "remove_child"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_status_maps_missing_records_to_404() {
        assert_eq!(child_status(&ChildError::NotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(child_status(&ChildError::ParentNotFound(1)), StatusCode::NOT_FOUND);
    }
}
