//! Activity service — the club's activities and child enrollment.
//!
//! ERROR HANDLING
//! ==============
//! Enrollment into a full activity is a domain conflict (`ActivityFull`),
//! not a database error; the capacity check and the insert run in one
//! transaction so two concurrent enrollments cannot both take the last slot.

use sqlx::PgPool;
use tracing::info;

use crate::services::events::{DomainEvent, EventBus};

#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("activity not found: {0}")]
    NotFound(i64),
    #[error("child not found: {0}")]
    ChildNotFound(i64),
    #[error("activity name already exists: {0}")]
    NameTaken(String),
    #[error("activity is full: {0}")]
    ActivityFull(i64),
    #[error("child {child_id} is not enrolled in activity {activity_id}")]
    NotEnrolled { child_id: i64, activity_id: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row from the `activities` table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivityRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub capacity: Option<i32>,
}

type ActivityTuple = (i64, String, String, Option<i32>);

fn row_from_tuple((id, name, description, capacity): ActivityTuple) -> ActivityRow {
    ActivityRow { id, name, description, capacity }
}

/// Create an activity. `capacity = None` means unlimited.
///
/// # Errors
///
/// Returns `NameTaken` when the name is already used, or a database error.
pub async fn create_activity(
    pool: &PgPool,
    events: &EventBus,
    name: &str,
    description: &str,
    capacity: Option<i32>,
) -> Result<ActivityRow, ActivityError> {
    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM activities WHERE name = $1)")
        .bind(name)
        .fetch_one(pool)
        .await?;
    if taken {
        return Err(ActivityError::NameTaken(name.to_owned()));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO activities (name, description, capacity) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(description)
    .bind(capacity)
    .fetch_one(pool)
    .await?;

    events.publish(DomainEvent::ActivityCreated { activity_id: id, name: name.to_owned() });
    info!(activity_id = %id, %name, "activity created");

    Ok(ActivityRow { id, name: name.to_owned(), description: description.to_owned(), capacity })
}

/// List all activities ordered by name.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_activities(pool: &PgPool) -> Result<Vec<ActivityRow>, ActivityError> {
    let rows = sqlx::query_as::<_, ActivityTuple>(
        "SELECT id, name, description, capacity FROM activities ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// Enroll a child into an activity, respecting capacity.
///
/// # Errors
///
/// Returns `ChildNotFound`/`NotFound` for missing records, `ActivityFull`
/// when no slot is left, or a database error.
pub async fn enroll_child(
    pool: &PgPool,
    events: &EventBus,
    child_id: i64,
    activity_id: i64,
) -> Result<(), ActivityError> {
    let child_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM children WHERE id = $1)")
        .bind(child_id)
        .fetch_one(pool)
        .await?;
    if !child_exists {
        return Err(ActivityError::ChildNotFound(child_id));
    }

    let mut tx = pool.begin().await?;

    // Lock the activity row so the capacity check and insert are atomic.
    let capacity: Option<Option<i32>> =
        sqlx::query_scalar("SELECT capacity FROM activities WHERE id = $1 FOR UPDATE")
            .bind(activity_id)
            .fetch_optional(tx.as_mut())
            .await?;
    let Some(capacity) = capacity else {
        return Err(ActivityError::NotFound(activity_id));
    };

    if let Some(capacity) = capacity {
        let enrolled: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE activity_id = $1")
            .bind(activity_id)
            .fetch_one(tx.as_mut())
            .await?;
        if enrolled >= i64::from(capacity) {
            return Err(ActivityError::ActivityFull(activity_id));
        }
    }

    sqlx::query(
        "INSERT INTO enrollments (child_id, activity_id) VALUES ($1, $2)
         ON CONFLICT (child_id, activity_id) DO NOTHING",
    )
    .bind(child_id)
    .bind(activity_id)
    .execute(tx.as_mut())
    .await?;

    tx.commit().await?;

    events.publish(DomainEvent::ChildEnrolled { child_id, activity_id });
    info!(%child_id, %activity_id, "child enrolled");
    Ok(())
}

/// Withdraw a child from an activity.
///
/// # Errors
///
/// Returns `NotEnrolled` when no enrollment exists, or a database error.
pub async fn withdraw_child(pool: &PgPool, child_id: i64, activity_id: i64) -> Result<(), ActivityError> {
    let result = sqlx::query("DELETE FROM enrollments WHERE child_id = $1 AND activity_id = $2")
        .bind(child_id)
        .bind(activity_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ActivityError::NotEnrolled { child_id, activity_id });
    }
    info!(%child_id, %activity_id, "child withdrawn");
    Ok(())
}

/// Activities a child is enrolled in, ordered by name.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn activities_of_child(pool: &PgPool, child_id: i64) -> Result<Vec<ActivityRow>, ActivityError> {
    let rows = sqlx::query_as::<_, ActivityTuple>(
        "SELECT a.id, a.name, a.description, a.capacity
         FROM activities a
         JOIN enrollments e ON e.activity_id = a.id
         WHERE e.child_id = $1
         ORDER BY a.name",
    )
    .bind(child_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

#[cfg(test)]
#[path = "activity_test.rs"]
mod tests;
