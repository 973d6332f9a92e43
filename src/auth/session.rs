use actix_session::Session;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Permission codes the console checks against an admin session.
pub mod codes {
    pub const USERS_SEARCH: &str = "users.search";
    pub const USERS_READ: &str = "users.read";
    pub const PERMS_REVIEW: &str = "perms.review";
    pub const AUDIT_READ: &str = "audit.read";
}

const SESSION_KEY: &str = "admin_session";

/// Wrapper around permission codes with a `has()` check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions(pub Vec<String>);

impl Permissions {
    pub fn has(&self, code: &str) -> bool {
        self.0.iter().any(|p| p == code)
    }
}

/// Authenticated administrator session. Bound once to each review component;
/// every directory call is checked against its permission codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub user_id: String,
    pub permissions: Permissions,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn new(user_id: &str, mut codes: Vec<String>, ttl: Duration) -> Self {
        codes.sort();
        codes.dedup();
        AdminSession {
            user_id: user_id.to_string(),
            permissions: Permissions(codes),
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    pub fn has(&self, code: &str) -> bool {
        self.permissions.has(code)
    }
}

/// Store the admin session in the cookie session after a successful login.
pub fn store(session: &Session, admin: &AdminSession) -> Result<(), AppError> {
    session.renew();
    session
        .insert(SESSION_KEY, admin)
        .map_err(|e| AppError::Session(format!("Failed to store session: {e}")))
}

pub fn get_admin_session(session: &Session) -> Option<AdminSession> {
    session.get::<AdminSession>(SESSION_KEY).unwrap_or(None)
}

/// Load the admin session or fail with 401.
pub fn require_admin_session(session: &Session) -> Result<AdminSession, AppError> {
    match get_admin_session(session) {
        Some(admin) if !admin.is_expired() => Ok(admin),
        Some(_) => {
            session.purge();
            Err(AppError::Session("Session expired".to_string()))
        }
        None => Err(AppError::Session("Not authenticated".to_string())),
    }
}

/// Check permission; returns Err(AppError) if denied.
pub fn require_permission(admin: &AdminSession, code: &str) -> Result<(), AppError> {
    if admin.has(code) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(code.to_string()))
    }
}
