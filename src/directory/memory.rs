//! In-memory directory for tests and local development.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Duration;

use super::{
    AccessService, AuditService, DirectoryError, DirectoryResult, ReviewService, authorize,
};
use crate::auth::password;
use crate::auth::session::{AdminSession, codes};
use crate::models::{BindFilter, BindRecord, OrgUnitType, Permission, UserSummary, UserTemplate};

#[derive(Debug)]
struct StoredUser {
    summary: UserSummary,
    password_hash: Option<String>,
}

#[derive(Debug, Default)]
struct DirectoryData {
    /// Keyed by lowercased user id.
    users: BTreeMap<String, StoredUser>,
    role_grants: HashMap<String, Vec<Permission>>,
    admin_role_grants: HashMap<String, Vec<Permission>>,
    binds: Vec<BindRecord>,
}

/// Directory held in process memory behind a `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    data: RwLock<DirectoryData>,
}

fn same_permission(granted: &Permission, wanted: &Permission) -> bool {
    granted.obj_name == wanted.obj_name
        && granted.op_name == wanted.op_name
        && match (&granted.obj_id, &wanted.obj_id) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> RwLockReadGuard<'_, DirectoryData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace a user.
    pub fn add_user(&self, user: UserSummary) {
        let key = user.user_id.to_lowercase();
        let mut data = self.write();
        let password_hash = data.users.remove(&key).and_then(|u| u.password_hash);
        data.users.insert(
            key,
            StoredUser {
                summary: user,
                password_hash,
            },
        );
    }

    pub fn set_password_hash(&self, user_id: &str, hash: &str) -> DirectoryResult<()> {
        let mut data = self.write();
        match data.users.get_mut(&user_id.to_lowercase()) {
            Some(u) => {
                u.password_hash = Some(hash.to_string());
                Ok(())
            }
            None => Err(DirectoryError::NotFound(user_id.to_string())),
        }
    }

    /// Remove a user; returns whether it existed.
    pub fn remove_user(&self, user_id: &str) -> bool {
        self.write().users.remove(&user_id.to_lowercase()).is_some()
    }

    pub fn grant(&self, role: &str, permission: Permission) {
        self.write()
            .role_grants
            .entry(role.to_string())
            .or_default()
            .push(permission);
    }

    pub fn grant_admin(&self, admin_role: &str, permission: Permission) {
        self.write()
            .admin_role_grants
            .entry(admin_role.to_string())
            .or_default()
            .push(permission);
    }

    pub fn add_bind(&self, bind: BindRecord) {
        self.write().binds.push(bind);
    }

    fn collect<F>(&self, pred: F) -> Vec<UserSummary>
    where
        F: Fn(&UserSummary) -> bool,
    {
        self.read()
            .users
            .values()
            .map(|u| &u.summary)
            .filter(|u| pred(u))
            .cloned()
            .collect()
    }

    /// Demo data for running the console without a database.
    /// Every demo account shares `password_hash`.
    pub fn with_demo_data(password_hash: &str) -> Self {
        let dir = Self::new();

        for code in [
            codes::USERS_SEARCH,
            codes::USERS_READ,
            codes::PERMS_REVIEW,
            codes::AUDIT_READ,
        ] {
            if let Some(p) = Permission::from_code(code) {
                dir.grant_admin("console-admin", p);
            }
        }
        dir.grant("teller", Permission::new("account", "debit"));
        dir.grant("teller", Permission::new("account", "credit"));
        dir.grant("auditor", Permission::new("account", "inspect"));

        let users = [
            UserSummary::new("admin")
                .with_ou("it")
                .with_admin_roles(&["console-admin"]),
            UserSummary::new("Alice").with_ou("finance").with_roles(&["teller"]),
            UserSummary::new("bob").with_ou("finance").with_roles(&["teller", "auditor"]),
            UserSummary::new("carol").with_ou("audit").with_roles(&["auditor"]),
            UserSummary::new("Dave").with_ou("it").with_admin_roles(&["helpdesk"]),
        ];
        for mut u in users {
            u.display_name = u.user_id.clone();
            let id = u.user_id.clone();
            dir.add_user(u);
            let _ = dir.set_password_hash(&id, password_hash);
        }

        let binds = [
            ("1", "uid=admin,ou=People,dc=example,dc=com", "0", "20240105093000Z"),
            ("2", "uid=Alice,ou=People,dc=example,dc=com", "49", "20240105094500Z"),
            ("3", "uid=bob,ou=People,dc=example,dc=com", "0", "20240105101500Z"),
            ("4", "cn=Manager,dc=example,dc=com", "0", "20240105110000Z"),
        ];
        for (id, dn, result, start) in binds {
            dir.add_bind(BindRecord {
                id: id.to_string(),
                req_dn: dn.to_string(),
                req_result: result.to_string(),
                req_start: start.to_string(),
            });
        }
        dir
    }
}

#[async_trait]
impl ReviewService for MemoryDirectory {
    async fn bind_admin_session(&self, session: &AdminSession) -> DirectoryResult<()> {
        if session.is_expired() {
            return Err(DirectoryError::Unauthorized(format!(
                "session for {} expired",
                session.user_id
            )));
        }
        if !self.read().users.contains_key(&session.user_id.to_lowercase()) {
            return Err(DirectoryError::Unauthorized(format!(
                "unknown session user {}",
                session.user_id
            )));
        }
        Ok(())
    }

    async fn find_users(
        &self,
        session: &AdminSession,
        template: &UserTemplate,
    ) -> DirectoryResult<Vec<UserSummary>> {
        authorize(session, codes::USERS_SEARCH)?;
        Ok(self.collect(|u| template.matches(u)))
    }

    async fn find_users_by_org_unit(
        &self,
        session: &AdminSession,
        ou: &str,
        ou_type: OrgUnitType,
    ) -> DirectoryResult<Vec<UserSummary>> {
        authorize(session, codes::USERS_SEARCH)?;
        // perm org units hold no users
        if ou_type == OrgUnitType::Perm {
            return Ok(Vec::new());
        }
        Ok(self.collect(|u| u.ou.eq_ignore_ascii_case(ou)))
    }

    async fn find_users_by_assigned_role(
        &self,
        session: &AdminSession,
        role: &str,
    ) -> DirectoryResult<Vec<UserSummary>> {
        authorize(session, codes::USERS_SEARCH)?;
        Ok(self.collect(|u| u.roles.iter().any(|r| r == role)))
    }

    async fn find_users_by_assigned_admin_role(
        &self,
        session: &AdminSession,
        admin_role: &str,
    ) -> DirectoryResult<Vec<UserSummary>> {
        authorize(session, codes::USERS_SEARCH)?;
        Ok(self.collect(|u| u.admin_roles.iter().any(|r| r == admin_role)))
    }

    async fn authorized_permission_users(
        &self,
        session: &AdminSession,
        permission: &Permission,
    ) -> DirectoryResult<BTreeSet<String>> {
        authorize(session, codes::PERMS_REVIEW)?;
        let data = self.read();
        let granting_roles: Vec<&String> = data
            .role_grants
            .iter()
            .filter(|(_, perms)| perms.iter().any(|p| same_permission(p, permission)))
            .map(|(role, _)| role)
            .collect();
        Ok(data
            .users
            .values()
            .filter(|u| u.summary.roles.iter().any(|r| granting_roles.contains(&r)))
            .map(|u| u.summary.user_id.clone())
            .collect())
    }

    async fn read_user(
        &self,
        session: &AdminSession,
        user_id: &str,
    ) -> DirectoryResult<UserSummary> {
        authorize(session, codes::USERS_READ)?;
        self.read()
            .users
            .get(&user_id.to_lowercase())
            .map(|u| u.summary.clone())
            .ok_or_else(|| DirectoryError::NotFound(user_id.to_string()))
    }
}

#[async_trait]
impl AccessService for MemoryDirectory {
    async fn create_session(
        &self,
        user_id: &str,
        password: &str,
        ttl: Duration,
    ) -> DirectoryResult<AdminSession> {
        let data = self.read();
        let invalid = || DirectoryError::Unauthorized("invalid credentials".to_string());
        let user = data.users.get(&user_id.to_lowercase()).ok_or_else(invalid)?;
        let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
        if !password::verify_password(password, hash).map_err(DirectoryError::Service)? {
            return Err(invalid());
        }

        let role_codes = user
            .summary
            .roles
            .iter()
            .filter_map(|r| data.role_grants.get(r));
        let admin_codes = user
            .summary
            .admin_roles
            .iter()
            .filter_map(|r| data.admin_role_grants.get(r));
        let codes = role_codes
            .chain(admin_codes)
            .flatten()
            .map(Permission::code)
            .collect();
        Ok(AdminSession::new(&user.summary.user_id, codes, ttl))
    }
}

#[async_trait]
impl AuditService for MemoryDirectory {
    async fn find_binds(
        &self,
        session: &AdminSession,
        filter: &BindFilter,
    ) -> DirectoryResult<Vec<BindRecord>> {
        authorize(session, codes::AUDIT_READ)?;
        let mut binds: Vec<BindRecord> = self
            .read()
            .binds
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        binds.sort_by(|a, b| b.req_start.cmp(&a.req_start));
        Ok(binds)
    }

    async fn read_bind(&self, session: &AdminSession, id: &str) -> DirectoryResult<BindRecord> {
        authorize(session, codes::AUDIT_READ)?;
        self.read()
            .binds
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("bind {id}")))
    }
}
