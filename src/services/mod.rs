//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation and status mapping.

pub mod activity;
pub mod child;
pub mod events;
pub mod parent;
pub mod password;
pub mod picture;
pub mod role;
pub mod upload;

#[cfg(all(test, feature = "live-db-tests"))]
pub(crate) mod test_support;
