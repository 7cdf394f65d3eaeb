//! Role gateway: closed role tags and per-parent role assignment.
//!
//! DESIGN
//! ======
//! Roles are a closed tagged set compared by value, never by name string.
//! The database stores the lowercase tag text; decoding goes through
//! [`RoleTag::from_str`] so an unknown tag surfaces as an error at the
//! boundary instead of silently passing through.

use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    #[error("unknown role tag: {0}")]
    UnknownTag(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Permission tag attached to a parent account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RoleTag {
    User,
    Admin,
}

impl RoleTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Uppercase role name as exposed in the admin projection.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Grant a role to a parent. Granting an already-held role is a no-op.
/// Takes any executor so callers can grant inside their own transaction.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn assign_role<'e, E>(executor: E, parent_id: i64, role: RoleTag) -> Result<(), RoleError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO parent_roles (parent_id, role) VALUES ($1, $2)
         ON CONFLICT (parent_id, role) DO NOTHING",
    )
    .bind(parent_id)
    .bind(role.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

/// Revoke a role from a parent. Revoking an unheld role is a no-op.
///
/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn revoke_role(pool: &PgPool, parent_id: i64, role: RoleTag) -> Result<(), RoleError> {
    sqlx::query("DELETE FROM parent_roles WHERE parent_id = $1 AND role = $2")
        .bind(parent_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

/// List the roles held by a parent, ordered by role name.
///
/// # Errors
///
/// Returns `UnknownTag` if a stored tag does not decode, or a database error.
pub async fn roles_of_parent(pool: &PgPool, parent_id: i64) -> Result<Vec<RoleTag>, RoleError> {
    let rows = sqlx::query_as::<_, (String,)>(
        "SELECT role FROM parent_roles WHERE parent_id = $1 ORDER BY role",
    )
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    decode_tags(rows.into_iter().map(|(tag,)| tag))
}

/// Decode stored tag strings into [`RoleTag`] values, rejecting unknown tags.
pub(crate) fn decode_tags<I>(tags: I) -> Result<Vec<RoleTag>, RoleError>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .map(|tag| RoleTag::from_str(&tag).ok_or(RoleError::UnknownTag(tag)))
        .collect()
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
