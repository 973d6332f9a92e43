//! Identity-management service seams.
//!
//! The console never evaluates RBAC rules itself: it asks a review service
//! which users hold a role or permission and renders the answer. Two
//! implementations ship with the crate:
//!
//! - [`MemoryDirectory`] for tests and local development
//! - [`PgDirectory`] over the entity/property/relation graph in PostgreSQL
//!
//! Every call carries the bound [`AdminSession`]; implementations check the
//! session's permission codes (see [`crate::auth::session::codes`]).

pub mod memory;
pub mod postgres;

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use chrono::Duration;

use crate::auth::session::AdminSession;
use crate::models::{BindFilter, BindRecord, OrgUnitType, Permission, UserSummary, UserTemplate};

pub use memory::MemoryDirectory;
pub use postgres::PgDirectory;

#[derive(Debug)]
pub enum DirectoryError {
    /// Session lacks rights for the call, or is expired/unknown.
    Unauthorized(String),
    /// A single looked-up record does not exist.
    NotFound(String),
    /// Transport or backend failure.
    Service(String),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::Unauthorized(e) => write!(f, "Unauthorized: {e}"),
            DirectoryError::NotFound(e) => write!(f, "Not found: {e}"),
            DirectoryError::Service(e) => write!(f, "Directory service error: {e}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

impl From<sqlx::Error> for DirectoryError {
    fn from(e: sqlx::Error) -> Self {
        DirectoryError::Service(e.to_string())
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Check that a session is live and holds `code`.
pub fn authorize(session: &AdminSession, code: &str) -> DirectoryResult<()> {
    if session.is_expired() {
        return Err(DirectoryError::Unauthorized(format!(
            "session for {} expired",
            session.user_id
        )));
    }
    if !session.has(code) {
        return Err(DirectoryError::Unauthorized(format!(
            "{} lacks {code}",
            session.user_id
        )));
    }
    Ok(())
}

/// Read-only review queries against the identity directory.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Validate a session before it is bound to a review component.
    async fn bind_admin_session(&self, session: &AdminSession) -> DirectoryResult<()>;

    /// Generic find: user-id prefix match from the template.
    async fn find_users(
        &self,
        session: &AdminSession,
        template: &UserTemplate,
    ) -> DirectoryResult<Vec<UserSummary>>;

    async fn find_users_by_org_unit(
        &self,
        session: &AdminSession,
        ou: &str,
        ou_type: OrgUnitType,
    ) -> DirectoryResult<Vec<UserSummary>>;

    async fn find_users_by_assigned_role(
        &self,
        session: &AdminSession,
        role: &str,
    ) -> DirectoryResult<Vec<UserSummary>>;

    async fn find_users_by_assigned_admin_role(
        &self,
        session: &AdminSession,
        admin_role: &str,
    ) -> DirectoryResult<Vec<UserSummary>>;

    /// Ids of every user authorized for the permission through role assignment.
    async fn authorized_permission_users(
        &self,
        session: &AdminSession,
        permission: &Permission,
    ) -> DirectoryResult<BTreeSet<String>>;

    async fn read_user(&self, session: &AdminSession, user_id: &str)
    -> DirectoryResult<UserSummary>;
}

/// Credential check producing admin sessions.
#[async_trait]
pub trait AccessService: Send + Sync {
    /// Verify the password and collect the permission codes granted through
    /// the user's roles and admin roles.
    async fn create_session(
        &self,
        user_id: &str,
        password: &str,
        ttl: Duration,
    ) -> DirectoryResult<AdminSession>;
}

/// Bind audit trail queries.
#[async_trait]
pub trait AuditService: Send + Sync {
    /// Matching bind records, newest first.
    async fn find_binds(
        &self,
        session: &AdminSession,
        filter: &BindFilter,
    ) -> DirectoryResult<Vec<BindRecord>>;

    async fn read_bind(&self, session: &AdminSession, id: &str) -> DirectoryResult<BindRecord>;
}
