//! Parent account routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::services::parent::{self, NewParent, ParentError, ParentRecord};
use crate::services::picture;
use crate::state::AppState;

/// Public view of a parent account. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct ParentResponse {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture_url: Option<String>,
    pub roles: Vec<String>,
}

impl From<ParentRecord> for ParentResponse {
    fn from(record: ParentRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            picture_url: record.picture_url,
            roles: record.roles.iter().map(|r| r.display_name().to_owned()).collect(),
        }
    }
}

pub(crate) fn parent_status(err: &ParentError) -> StatusCode {
    match err {
        ParentError::NotFound => StatusCode::NOT_FOUND,
        ParentError::EmailTaken | ParentError::UsernameTaken => StatusCode::CONFLICT,
        ParentError::Password(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ParentError::Role(_) | ParentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_and_map(err: &ParentError, op: &'static str) -> StatusCode {
    let status = parent_status(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, %op, "parent route failed");
    }
    status
}

/// `POST /api/parents` — register a new parent account.
pub async fn register(
    State(state): State<AppState>,
    Json(new): Json<NewParent>,
) -> Result<impl IntoResponse, StatusCode> {
    let record = parent::register_parent(&state.pool, &state.events, &new)
        .await
        .map_err(|e| log_and_map(&e, "register"))?;
    Ok((StatusCode::CREATED, Json(ParentResponse::from(record))))
}

/// `GET /api/parents/{id}` — look up a parent by id.
pub async fn get_parent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ParentResponse>, StatusCode> {
    let record = parent::find_parent_by_id(&state.pool, id)
        .await
        .map_err(|e| log_and_map(&e, "get_parent"))?;
    Ok(Json(ParentResponse::from(record)))
}

/// `GET /api/parents/by-username/{username}` — look up a parent by username.
pub async fn get_parent_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ParentResponse>, StatusCode> {
    let record = parent::find_parent_by_username(&state.pool, &username)
        .await
        .map_err(|e| log_and_map(&e, "get_parent_by_username"))?;
    Ok(Json(ParentResponse::from(record)))
}

/// `GET /api/parents/by-username/{username}/picture` — profile picture URL.
/// Unknown usernames still answer 200 with the placeholder image.
pub async fn parent_picture(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let url = parent::find_parent_pic_by_username(&state.pool, &username)
        .await
        .map_err(|e| log_and_map(&e, "parent_picture"))?;
    Ok(Json(serde_json::json!({ "url": url })))
}

#[derive(Deserialize)]
pub struct EmailQuery {
    email: String,
}

/// `GET /api/parents/email-free?email=…` — registration pre-check.
pub async fn email_free(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let free = parent::is_email_free(&state.pool, &query.email)
        .await
        .map_err(|e| log_and_map(&e, "email_free"))?;
    Ok(Json(serde_json::json!({ "free": free })))
}

/// `GET /api/parents/names-and-roles` — admin listing projection.
pub async fn names_and_roles(
    State(state): State<AppState>,
) -> Result<Json<Vec<parent::ParentNamesAndRoles>>, StatusCode> {
    let listing = parent::parents_names_and_roles(&state.pool)
        .await
        .map_err(|e| log_and_map(&e, "names_and_roles"))?;
    Ok(Json(listing))
}

/// `DELETE /api/parents/{id}` — remove a parent and everything it owns.
pub async fn delete_parent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    parent::delete_parent(&state.pool, &state.events, id)
        .await
        .map_err(|e| log_and_map(&e, "delete_parent"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct UploadQuery {
    filename: Option<String>,
}

/// `POST /api/parents/{id}/picture` — upload a new profile picture.
/// Answers 503 when the media uploader is not configured.
pub async fn upload_picture(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<UploadQuery>,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, StatusCode> {
    let Some(uploader) = &state.uploader else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };
    if body.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let filename = query.filename.unwrap_or_else(|| "avatar.jpg".to_owned());
    let uploaded = uploader.upload(body.to_vec(), &filename).await.map_err(|e| {
        tracing::error!(error = %e, parent_id = %id, "image upload failed");
        StatusCode::BAD_GATEWAY
    })?;

    let row = picture::set_parent_picture(
        &state.pool,
        &state.events,
        id,
        &uploaded.url,
        Some(&uploaded.public_id),
    )
    .await
    .map_err(|e| match e {
        picture::PictureError::ParentNotFound(_) => StatusCode::NOT_FOUND,
        picture::PictureError::Database(_) => {
            tracing::error!(error = %e, parent_id = %id, "picture persist failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    })?;

    Ok((StatusCode::CREATED, Json(row)))
}

#[cfg(test)]
#[path = "parents_test.rs"]
mod tests;
