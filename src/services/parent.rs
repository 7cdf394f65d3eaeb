//! Parent service — account lookups, admin predicate, and the admin
//! names-and-roles projection.
//!
//! DESIGN
//! ======
//! Parents are the guardian accounts of the system. This module owns every
//! read over the `parents` table plus registration and deletion; sibling
//! aggregates (children, activities, pictures) live in their own services.
//!
//! ERROR HANDLING
//! ==============
//! Lookups by id/username surface `NotFound`. The picture-URL lookup is the
//! one deliberate exception: an unknown username (or a parent without a
//! picture) resolves to a fixed placeholder image so profile views are never
//! blank.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use crate::services::events::{DomainEvent, EventBus};
use crate::services::password::{self, PasswordError};
use crate::services::role::{self, RoleError, RoleTag};

/// Fallback avatar shown for parents with no picture on record.
pub const PLACEHOLDER_AVATAR_URL: &str = "https://4xucy2kyby51ggkud2tadg3d-wpengine.netdna-ssl.com/wp-content/uploads/sites/37/2017/02/IAFOR-Blank-Avatar-Image.jpg";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ParentError {
    #[error("parent not found")]
    NotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("role error: {0}")]
    Role(#[from] RoleError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Hydrated parent read model: account fields plus picture URL and roles.
#[derive(Debug, Clone)]
pub struct ParentRecord {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub picture_url: Option<String>,
    /// Held roles, ordered by role name.
    pub roles: Vec<RoleTag>,
}

/// Registration input. The password arrives in plaintext and is hashed here.
#[derive(Debug, serde::Deserialize)]
pub struct NewParent {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Read-only projection for the admin listing: names plus role tags.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParentNamesAndRoles {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub is_admin: bool,
}

// =============================================================================
// LOOKUPS
// =============================================================================

type ParentRow = (i64, String, String, String, String, String, Option<String>);

const PARENT_SELECT: &str = "SELECT p.id, p.username, p.first_name, p.last_name, p.email, p.password_hash, pic.url
     FROM parents p
     LEFT JOIN pictures pic ON pic.id = p.picture_id";

fn record_from_row(row: ParentRow, roles: Vec<RoleTag>) -> ParentRecord {
    let (id, username, first_name, last_name, email, password_hash, picture_url) = row;
    ParentRecord { id, username, first_name, last_name, email, password_hash, picture_url, roles }
}

/// Find a parent by numeric id.
///
/// # Errors
///
/// Returns `NotFound` when no parent matches, or a database error.
pub async fn find_parent_by_id(pool: &PgPool, id: i64) -> Result<ParentRecord, ParentError> {
    let row = sqlx::query_as::<_, ParentRow>(&format!("{PARENT_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ParentError::NotFound)?;

    let roles = role::roles_of_parent(pool, row.0).await?;
    Ok(record_from_row(row, roles))
}

/// Find a parent by username.
///
/// # Errors
///
/// Returns `NotFound` when no parent matches, or a database error.
pub async fn find_parent_by_username(pool: &PgPool, username: &str) -> Result<ParentRecord, ParentError> {
    let row = sqlx::query_as::<_, ParentRow>(&format!("{PARENT_SELECT} WHERE p.username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or(ParentError::NotFound)?;

    let roles = role::roles_of_parent(pool, row.0).await?;
    Ok(record_from_row(row, roles))
}

/// Profile picture URL for a username. Unknown usernames and parents without
/// a picture both resolve to [`PLACEHOLDER_AVATAR_URL`]; only database
/// failures propagate.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn find_parent_pic_by_username(pool: &PgPool, username: &str) -> Result<String, ParentError> {
    let row = sqlx::query_as::<_, (Option<String>,)>(
        "SELECT pic.url
         FROM parents p
         LEFT JOIN pictures pic ON pic.id = p.picture_id
         WHERE p.username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(resolve_picture_url(row.map(|(url,)| url)))
}

/// Collapse the two-level picture lookup result (parent missing vs. parent
/// present without a picture) into a concrete URL.
pub(crate) fn resolve_picture_url(lookup: Option<Option<String>>) -> String {
    lookup
        .flatten()
        .unwrap_or_else(|| PLACEHOLDER_AVATAR_URL.to_owned())
}

/// Whether an email address is still free for registration. Comparison is
/// byte-exact: no trimming or case folding.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn is_email_free(pool: &PgPool, email: &str) -> Result<bool, ParentError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parents WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(!exists)
}

// =============================================================================
// ADMIN PREDICATE + PROJECTION
// =============================================================================

/// True iff the parent holds the admin role. Value comparison on the closed
/// role set.
#[must_use]
pub fn is_admin(parent: &ParentRecord) -> bool {
    parent.roles.contains(&RoleTag::Admin)
}

/// Project hydrated records into the admin names-and-roles listing. Role
/// order follows each record's stored role order.
#[must_use]
pub fn project_names_and_roles(parents: &[ParentRecord]) -> Vec<ParentNamesAndRoles> {
    parents
        .iter()
        .map(|p| ParentNamesAndRoles {
            id: p.id,
            username: p.username.clone(),
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            roles: p.roles.iter().map(|r| r.display_name().to_owned()).collect(),
            is_admin: is_admin(p),
        })
        .collect()
}

/// Load every parent with roles and project the admin listing.
///
/// # Errors
///
/// Returns a database error if either query fails, or `Role` if a stored
/// role tag does not decode.
pub async fn parents_names_and_roles(pool: &PgPool) -> Result<Vec<ParentNamesAndRoles>, ParentError> {
    let parents = load_all_parents(pool).await?;
    Ok(project_names_and_roles(&parents))
}

/// Hydrate all parents ordered by id, with their role sets attached.
async fn load_all_parents(pool: &PgPool) -> Result<Vec<ParentRecord>, ParentError> {
    let rows = sqlx::query_as::<_, ParentRow>(&format!("{PARENT_SELECT} ORDER BY p.id"))
        .fetch_all(pool)
        .await?;

    // One pass over parent_roles instead of a query per parent.
    let role_rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT parent_id, role FROM parent_roles ORDER BY parent_id, role",
    )
    .fetch_all(pool)
    .await?;

    let mut roles_by_parent: HashMap<i64, Vec<RoleTag>> = HashMap::new();
    for (parent_id, tag) in role_rows {
        let decoded = RoleTag::from_str(&tag).ok_or(RoleError::UnknownTag(tag))?;
        roles_by_parent.entry(parent_id).or_default().push(decoded);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let roles = roles_by_parent.remove(&row.0).unwrap_or_default();
            record_from_row(row, roles)
        })
        .collect())
}

// =============================================================================
// REGISTRATION / DELETION
// =============================================================================

/// Advisory lock key serializing the first-admin grant across registrations.
const ADMIN_BOOTSTRAP_LOCK: i64 = 0x6d6b_6964_7331;

/// Register a new parent account: free-ness checks, Argon2id hash, default
/// role grant, and a fire-and-forget `ParentRegistered` event. The insert
/// and both role grants commit atomically: a registered parent always holds
/// the user role.
///
/// The first account in a fresh database also receives the admin role.
/// Competing registrations serialize on an advisory lock before counting,
/// so exactly one account can take the grant.
///
/// # Errors
///
/// Returns `EmailTaken`/`UsernameTaken` on conflicts, `Password` when the
/// password is too weak, or a database error.
pub async fn register_parent(pool: &PgPool, events: &EventBus, new: &NewParent) -> Result<ParentRecord, ParentError> {
    password::validate_password_strength(&new.password)?;
    let password_hash = password::hash_password(&new.password)?;

    let mut tx = pool.begin().await?;

    let email_taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parents WHERE email = $1)")
        .bind(&new.email)
        .fetch_one(tx.as_mut())
        .await?;
    if email_taken {
        return Err(ParentError::EmailTaken);
    }
    let username_taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parents WHERE username = $1)")
        .bind(&new.username)
        .fetch_one(tx.as_mut())
        .await?;
    if username_taken {
        return Err(ParentError::UsernameTaken);
    }

    let parent_id: i64 = sqlx::query_scalar(
        "INSERT INTO parents (username, first_name, last_name, email, password_hash)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(&new.username)
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.email)
    .bind(&password_hash)
    .fetch_one(tx.as_mut())
    .await?;

    role::assign_role(tx.as_mut(), parent_id, RoleTag::User).await?;

    // Held until commit; a competing registration blocks here and then
    // counts a snapshot that already includes this row.
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(ADMIN_BOOTSTRAP_LOCK)
        .execute(tx.as_mut())
        .await?;
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parents")
        .fetch_one(tx.as_mut())
        .await?;
    let first_account = total == 1;
    if first_account {
        role::assign_role(tx.as_mut(), parent_id, RoleTag::Admin).await?;
    }

    tx.commit().await?;

    if first_account {
        info!(%parent_id, "first account registered; granted admin role");
    }
    events.publish(DomainEvent::ParentRegistered { parent_id, username: new.username.clone() });
    info!(%parent_id, username = %new.username, "parent registered");

    find_parent_by_id(pool, parent_id).await
}

/// Delete a parent. Children, role grants, and enrollments cascade in the
/// database; an owned picture row is removed here since it has no owner left.
///
/// # Errors
///
/// Returns `NotFound` when no parent matches, or a database error.
pub async fn delete_parent(pool: &PgPool, events: &EventBus, id: i64) -> Result<(), ParentError> {
    let mut tx = pool.begin().await?;

    let picture_id: Option<Option<i64>> =
        sqlx::query_scalar("DELETE FROM parents WHERE id = $1 RETURNING picture_id")
            .bind(id)
            .fetch_optional(tx.as_mut())
            .await?;

    let Some(picture_id) = picture_id else {
        return Err(ParentError::NotFound);
    };
    if let Some(picture_id) = picture_id {
        sqlx::query("DELETE FROM pictures WHERE id = $1")
            .bind(picture_id)
            .execute(tx.as_mut())
            .await?;
    }

    tx.commit().await?;

    events.publish(DomainEvent::ParentDeleted { parent_id: id });
    info!(parent_id = %id, "parent deleted");
    Ok(())
}

#[cfg(test)]
#[path = "parent_test.rs"]
mod tests;
