//! Shared test infrastructure.
//!
//! - `SpyDirectory` - scripted review service that records every call
//! - `admin_session()` / `session_with()` - admin sessions with chosen codes
//! - `demo_directory()` - in-memory directory seeded with demo data
#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;

use fortress_console::auth::password;
use fortress_console::auth::session::{AdminSession, codes};
use fortress_console::directory::{DirectoryError, DirectoryResult, MemoryDirectory, ReviewService};
use fortress_console::models::{OrgUnitType, Permission, UserSummary, UserTemplate};
use fortress_console::search::FacetedUserResolver;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin123";

pub const ALL_CODES: &[&str] = &[
    codes::USERS_SEARCH,
    codes::USERS_READ,
    codes::PERMS_REVIEW,
    codes::AUDIT_READ,
];

// ============================================================================
// SESSIONS
// ============================================================================

pub fn session_with(user_id: &str, granted: &[&str]) -> AdminSession {
    AdminSession::new(
        user_id,
        granted.iter().map(|c| c.to_string()).collect(),
        Duration::minutes(30),
    )
}

pub fn admin_session() -> AdminSession {
    session_with(ADMIN_USER, ALL_CODES)
}

// ============================================================================
// SPY DIRECTORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Bind(String),
    FindUsers(UserTemplate),
    ByOrgUnit(String, OrgUnitType),
    ByRole(String),
    ByAdminRole(String),
    PermissionUsers(Permission),
    ReadUser(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Unauthorized,
    Service,
}

impl Failure {
    fn error(self, what: &str) -> DirectoryError {
        match self {
            Failure::Unauthorized => DirectoryError::Unauthorized(what.to_string()),
            Failure::Service => DirectoryError::Service(what.to_string()),
        }
    }
}

/// Scripted review service. Every bulk search returns `users` in insertion
/// order (unsorted on purpose), `read_user` looks ids up in `users`.
#[derive(Default)]
pub struct SpyDirectory {
    users: Vec<UserSummary>,
    permission_users: BTreeSet<String>,
    denied_reads: HashSet<String>,
    failing_reads: HashSet<String>,
    bulk_failure: Option<Failure>,
    bind_failure: Option<Failure>,
    calls: Mutex<Vec<Call>>,
}

impl SpyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(mut self, ids: &[&str]) -> Self {
        self.users.extend(ids.iter().map(|id| UserSummary::new(id)));
        self
    }

    pub fn with_user(mut self, user: UserSummary) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_permission_users(mut self, ids: &[&str]) -> Self {
        self.permission_users = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    /// `read_user(id)` fails with Unauthorized.
    pub fn deny_read(mut self, id: &str) -> Self {
        self.denied_reads.insert(id.to_string());
        self
    }

    /// `read_user(id)` fails with a service error.
    pub fn fail_read(mut self, id: &str) -> Self {
        self.failing_reads.insert(id.to_string());
        self
    }

    /// Every bulk call (find*, authorized_permission_users) fails.
    pub fn fail_bulk(mut self, failure: Failure) -> Self {
        self.bulk_failure = Some(failure);
        self
    }

    pub fn fail_bind(mut self, failure: Failure) -> Self {
        self.bind_failure = Some(failure);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the initial session bind.
    pub fn search_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Bind(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn bulk(&self, call: Call) -> DirectoryResult<Vec<UserSummary>> {
        self.record(call);
        match self.bulk_failure {
            Some(f) => Err(f.error("bulk search")),
            None => Ok(self.users.clone()),
        }
    }
}

#[async_trait]
impl ReviewService for SpyDirectory {
    async fn bind_admin_session(&self, session: &AdminSession) -> DirectoryResult<()> {
        self.record(Call::Bind(session.user_id.clone()));
        match self.bind_failure {
            Some(f) => Err(f.error("bind")),
            None => Ok(()),
        }
    }

    async fn find_users(
        &self,
        _session: &AdminSession,
        template: &UserTemplate,
    ) -> DirectoryResult<Vec<UserSummary>> {
        self.bulk(Call::FindUsers(template.clone()))
    }

    async fn find_users_by_org_unit(
        &self,
        _session: &AdminSession,
        ou: &str,
        ou_type: OrgUnitType,
    ) -> DirectoryResult<Vec<UserSummary>> {
        self.bulk(Call::ByOrgUnit(ou.to_string(), ou_type))
    }

    async fn find_users_by_assigned_role(
        &self,
        _session: &AdminSession,
        role: &str,
    ) -> DirectoryResult<Vec<UserSummary>> {
        self.bulk(Call::ByRole(role.to_string()))
    }

    async fn find_users_by_assigned_admin_role(
        &self,
        _session: &AdminSession,
        admin_role: &str,
    ) -> DirectoryResult<Vec<UserSummary>> {
        self.bulk(Call::ByAdminRole(admin_role.to_string()))
    }

    async fn authorized_permission_users(
        &self,
        _session: &AdminSession,
        permission: &Permission,
    ) -> DirectoryResult<BTreeSet<String>> {
        self.record(Call::PermissionUsers(permission.clone()));
        match self.bulk_failure {
            Some(f) => Err(f.error("permission users")),
            None => Ok(self.permission_users.clone()),
        }
    }

    async fn read_user(
        &self,
        _session: &AdminSession,
        user_id: &str,
    ) -> DirectoryResult<UserSummary> {
        self.record(Call::ReadUser(user_id.to_string()));
        if self.denied_reads.contains(user_id) {
            return Err(DirectoryError::Unauthorized(user_id.to_string()));
        }
        if self.failing_reads.contains(user_id) {
            return Err(DirectoryError::Service(user_id.to_string()));
        }
        self.users
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(user_id.to_string()))
    }
}

pub async fn bind_spy(spy: &Arc<SpyDirectory>) -> FacetedUserResolver {
    FacetedUserResolver::bind(spy.clone(), admin_session())
        .await
        .expect("spy bind failed")
}

pub fn ids(users: &[UserSummary]) -> Vec<&str> {
    users.iter().map(|u| u.user_id.as_str()).collect()
}

// ============================================================================
// DEMO DIRECTORY
// ============================================================================

/// In-memory directory with the demo data; every account's password is `ADMIN_PASS`.
pub fn demo_directory() -> Arc<MemoryDirectory> {
    let hash = password::hash_password(ADMIN_PASS).expect("Failed to hash password");
    Arc::new(MemoryDirectory::with_demo_data(&hash))
}

pub async fn bind_demo(dir: &Arc<MemoryDirectory>) -> FacetedUserResolver {
    FacetedUserResolver::bind(dir.clone(), admin_session())
        .await
        .expect("demo bind failed")
}
