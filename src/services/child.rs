//! Child service — children registered under a parent account.

use sqlx::PgPool;
use tracing::info;

use crate::services::events::{DomainEvent, EventBus};

#[derive(Debug, thiserror::Error)]
pub enum ChildError {
    #[error("child not found: {0}")]
    NotFound(i64),
    #[error("parent not found: {0}")]
    ParentNotFound(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row from the `children` table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChildRow {
    pub id: i64,
    pub parent_id: i64,
    pub full_name: String,
    pub age: i32,
}

/// Register a child under an existing parent.
///
/// # Errors
///
/// Returns `ParentNotFound` when the owning parent does not exist, or a
/// database error.
pub async fn add_child(
    pool: &PgPool,
    events: &EventBus,
    parent_id: i64,
    full_name: &str,
    age: i32,
) -> Result<ChildRow, ChildError> {
    let parent_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parents WHERE id = $1)")
        .bind(parent_id)
        .fetch_one(pool)
        .await?;
    if !parent_exists {
        return Err(ChildError::ParentNotFound(parent_id));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO children (parent_id, full_name, age) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(parent_id)
    .bind(full_name)
    .bind(age)
    .fetch_one(pool)
    .await?;

    events.publish(DomainEvent::ChildAdded { parent_id, child_id: id });
    info!(child_id = %id, %parent_id, "child added");

    Ok(ChildRow { id, parent_id, full_name: full_name.to_owned(), age })
}

/// Find a child by id.
///
/// # Errors
///
/// Returns `NotFound` when absent, or a database error.
pub async fn find_child_by_id(pool: &PgPool, id: i64) -> Result<ChildRow, ChildError> {
    let row = sqlx::query_as::<_, (i64, i64, String, i32)>(
        "SELECT id, parent_id, full_name, age FROM children WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(ChildError::NotFound(id))?;

    let (id, parent_id, full_name, age) = row;
    Ok(ChildRow { id, parent_id, full_name, age })
}

/// List the children of a parent, oldest registration first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn children_of_parent(pool: &PgPool, parent_id: i64) -> Result<Vec<ChildRow>, ChildError> {
    let rows = sqlx::query_as::<_, (i64, i64, String, i32)>(
        "SELECT id, parent_id, full_name, age FROM children WHERE parent_id = $1 ORDER BY id",
    )
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, parent_id, full_name, age)| ChildRow { id, parent_id, full_name, age })
        .collect())
}

/// Remove a child record. Enrollments cascade in the database.
///
/// # Errors
///
/// Returns `NotFound` when absent, or a database error.
pub async fn remove_child(pool: &PgPool, id: i64) -> Result<(), ChildError> {
    let result = sqlx::query("DELETE FROM children WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ChildError::NotFound(id));
    }
    info!(child_id = %id, "child removed");
    Ok(())
}

#[cfg(test)]
#[path = "child_test.rs"]
mod tests;
