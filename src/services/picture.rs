//! Picture service — profile picture ownership.
//!
//! A picture row is owned by at most one parent. Replacing a parent's
//! picture inserts the new row, repoints the parent, and removes the old row
//! so orphaned pictures never accumulate.

use sqlx::PgPool;
use tracing::info;

use crate::services::events::{DomainEvent, EventBus};

#[derive(Debug, thiserror::Error)]
pub enum PictureError {
    #[error("parent not found: {0}")]
    ParentNotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row from the `pictures` table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PictureRow {
    pub id: i64,
    pub url: String,
    pub public_id: Option<String>,
}

/// Attach a picture to a parent, replacing and deleting any previous one.
///
/// # Errors
///
/// Returns `ParentNotFound` when the parent does not exist, or a database
/// error.
pub async fn set_parent_picture(
    pool: &PgPool,
    events: &EventBus,
    parent_id: i64,
    url: &str,
    public_id: Option<&str>,
) -> Result<PictureRow, PictureError> {
    let mut tx = pool.begin().await?;

    let previous: Option<Option<i64>> =
        sqlx::query_scalar("SELECT picture_id FROM parents WHERE id = $1 FOR UPDATE")
            .bind(parent_id)
            .fetch_optional(tx.as_mut())
            .await?;
    let Some(previous) = previous else {
        return Err(PictureError::ParentNotFound(parent_id));
    };

    let picture_id: i64 = sqlx::query_scalar(
        "INSERT INTO pictures (url, public_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(url)
    .bind(public_id)
    .fetch_one(tx.as_mut())
    .await?;

    sqlx::query("UPDATE parents SET picture_id = $1 WHERE id = $2")
        .bind(picture_id)
        .bind(parent_id)
        .execute(tx.as_mut())
        .await?;

    if let Some(previous) = previous {
        sqlx::query("DELETE FROM pictures WHERE id = $1")
            .bind(previous)
            .execute(tx.as_mut())
            .await?;
    }

    tx.commit().await?;

    events.publish(DomainEvent::PictureChanged { parent_id, url: url.to_owned() });
    info!(%parent_id, picture_id = %picture_id, "profile picture set");

    Ok(PictureRow { id: picture_id, url: url.to_owned(), public_id: public_id.map(str::to_owned) })
}

/// The picture currently attached to a parent, if any.
///
/// # Errors
///
/// Returns `ParentNotFound` when the parent does not exist, or a database
/// error.
pub async fn picture_of_parent(pool: &PgPool, parent_id: i64) -> Result<Option<PictureRow>, PictureError> {
    let parent_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parents WHERE id = $1)")
        .bind(parent_id)
        .fetch_one(pool)
        .await?;
    if !parent_exists {
        return Err(PictureError::ParentNotFound(parent_id));
    }

    let row = sqlx::query_as::<_, (i64, String, Option<String>)>(
        "SELECT pic.id, pic.url, pic.public_id
         FROM parents p
         JOIN pictures pic ON pic.id = p.picture_id
         WHERE p.id = $1",
    )
    .bind(parent_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, url, public_id)| PictureRow { id, url, public_id }))
}

/// Detach and delete a parent's picture. A parent without a picture is a
/// no-op, not an error.
///
/// # Errors
///
/// Returns `ParentNotFound` when the parent does not exist, or a database
/// error.
pub async fn clear_parent_picture(pool: &PgPool, parent_id: i64) -> Result<(), PictureError> {
    let mut tx = pool.begin().await?;

    let previous: Option<Option<i64>> =
        sqlx::query_scalar("SELECT picture_id FROM parents WHERE id = $1 FOR UPDATE")
            .bind(parent_id)
            .fetch_optional(tx.as_mut())
            .await?;
    let Some(previous) = previous else {
        return Err(PictureError::ParentNotFound(parent_id));
    };

    if let Some(previous) = previous {
        sqlx::query("UPDATE parents SET picture_id = NULL WHERE id = $1")
            .bind(parent_id)
            .execute(tx.as_mut())
            .await?;
        sqlx::query("DELETE FROM pictures WHERE id = $1")
            .bind(previous)
            .execute(tx.as_mut())
            .await?;
        info!(%parent_id, picture_id = %previous, "profile picture cleared");
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
#[path = "picture_test.rs"]
mod tests;
