//! PostgreSQL directory over the entity/property/relation graph.
//!
//! ```text
//! user --(has_role)--------> role --------(has_permission)--> permission
//! user --(has_admin_role)--> admin_role --(has_permission)--> permission
//! user entity_properties: ou, description, title, password
//! audit_bind entity_properties: req_dn, req_result, req_start
//! ```
//!
//! Users are `entities.name` (user id) with `entities.label` as display name.
//! Permission entities are named by their code (`obj.op`).

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;

use super::{
    AccessService, AuditService, DirectoryError, DirectoryResult, ReviewService, authorize,
};
use crate::auth::password;
use crate::auth::session::{AdminSession, codes};
use crate::models::{BindFilter, BindRecord, OrgUnitType, Permission, UserSummary, UserTemplate};

/// User summary: entity + properties + role names via has_role / has_admin_role.
const SELECT_USER_SUMMARY: &str = "\
    SELECT e.name AS user_id, e.label AS display_name, \
           COALESCE(p_ou.value, '') AS ou, \
           COALESCE(p_desc.value, '') AS description, \
           COALESCE(p_title.value, '') AS title, \
           ARRAY(SELECT r.name FROM relations rel JOIN entities r ON rel.target_id = r.id \
                 WHERE rel.source_id = e.id \
                   AND rel.relation_type_id = (SELECT id FROM entities WHERE entity_type = 'relation_type' AND name = 'has_role') \
                 ORDER BY rel.id) AS roles, \
           ARRAY(SELECT r.name FROM relations rel JOIN entities r ON rel.target_id = r.id \
                 WHERE rel.source_id = e.id \
                   AND rel.relation_type_id = (SELECT id FROM entities WHERE entity_type = 'relation_type' AND name = 'has_admin_role') \
                 ORDER BY rel.id) AS admin_roles \
    FROM entities e \
    LEFT JOIN entity_properties p_ou ON e.id = p_ou.entity_id AND p_ou.key = 'ou' \
    LEFT JOIN entity_properties p_desc ON e.id = p_desc.entity_id AND p_desc.key = 'description' \
    LEFT JOIN entity_properties p_title ON e.id = p_title.entity_id AND p_title.key = 'title' \
    WHERE e.entity_type = 'user' AND e.is_active";

const SELECT_BIND: &str = "\
    SELECT e.name AS id, \
           COALESCE(p_dn.value, '') AS req_dn, \
           COALESCE(p_res.value, '') AS req_result, \
           COALESCE(p_start.value, '') AS req_start \
    FROM entities e \
    LEFT JOIN entity_properties p_dn ON e.id = p_dn.entity_id AND p_dn.key = 'req_dn' \
    LEFT JOIN entity_properties p_res ON e.id = p_res.entity_id AND p_res.key = 'req_result' \
    LEFT JOIN entity_properties p_start ON e.id = p_start.entity_id AND p_start.key = 'req_start' \
    WHERE e.entity_type = 'audit_bind'";

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    display_name: String,
    ou: String,
    description: String,
    title: String,
    roles: Vec<String>,
    admin_roles: Vec<String>,
}

impl From<UserRow> for UserSummary {
    fn from(r: UserRow) -> Self {
        UserSummary {
            user_id: r.user_id,
            display_name: r.display_name,
            ou: r.ou,
            description: r.description,
            title: r.title,
            roles: r.roles,
            admin_roles: r.admin_roles,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BindRow {
    id: String,
    req_dn: String,
    req_result: String,
    req_start: String,
}

impl From<BindRow> for BindRecord {
    fn from(r: BindRow) -> Self {
        BindRecord {
            id: r.id,
            req_dn: r.req_dn,
            req_result: r.req_result,
            req_start: r.req_start,
        }
    }
}

/// Escape LIKE wildcards so user input only matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        PgDirectory { pool }
    }

    async fn users_where(&self, clause: &str, arg: &str) -> DirectoryResult<Vec<UserSummary>> {
        let sql = format!("{SELECT_USER_SUMMARY} AND {clause} ORDER BY e.name");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(arg)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(UserSummary::from).collect())
    }

    async fn users_with_relation(
        &self,
        relation_type: &str,
        target_type: &str,
        target_name: &str,
    ) -> DirectoryResult<Vec<UserSummary>> {
        let sql = format!(
            "{SELECT_USER_SUMMARY} AND EXISTS ( \
                 SELECT 1 FROM relations rel JOIN entities t ON rel.target_id = t.id \
                 WHERE rel.source_id = e.id \
                   AND rel.relation_type_id = (SELECT id FROM entities WHERE entity_type = 'relation_type' AND name = $1) \
                   AND t.entity_type = $2 AND t.name = $3) \
             ORDER BY e.name"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(relation_type)
            .bind(target_type)
            .bind(target_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(UserSummary::from).collect())
    }
}

#[async_trait]
impl ReviewService for PgDirectory {
    async fn bind_admin_session(&self, session: &AdminSession) -> DirectoryResult<()> {
        if session.is_expired() {
            return Err(DirectoryError::Unauthorized(format!(
                "session for {} expired",
                session.user_id
            )));
        }
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM entities \
             WHERE entity_type = 'user' AND LOWER(name) = LOWER($1) AND is_active)",
        )
        .bind(&session.user_id)
        .fetch_one(&self.pool)
        .await?;
        if !exists {
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
        let pattern = format!("{}%", escape_like(template.user_id.trim()));
        self.users_where("e.name ILIKE $1", &pattern).await
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
        self.users_where("LOWER(p_ou.value) = LOWER($1)", ou).await
    }

    async fn find_users_by_assigned_role(
        &self,
        session: &AdminSession,
        role: &str,
    ) -> DirectoryResult<Vec<UserSummary>> {
        authorize(session, codes::USERS_SEARCH)?;
        self.users_with_relation("has_role", "role", role).await
    }

    async fn find_users_by_assigned_admin_role(
        &self,
        session: &AdminSession,
        admin_role: &str,
    ) -> DirectoryResult<Vec<UserSummary>> {
        authorize(session, codes::USERS_SEARCH)?;
        self.users_with_relation("has_admin_role", "admin_role", admin_role)
            .await
    }

    async fn authorized_permission_users(
        &self,
        session: &AdminSession,
        permission: &Permission,
    ) -> DirectoryResult<BTreeSet<String>> {
        authorize(session, codes::PERMS_REVIEW)?;
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT u.name \
             FROM entities u \
             JOIN relations ur ON ur.source_id = u.id \
                AND ur.relation_type_id = (SELECT id FROM entities WHERE entity_type = 'relation_type' AND name = 'has_role') \
             JOIN relations rp ON rp.source_id = ur.target_id \
                AND rp.relation_type_id = (SELECT id FROM entities WHERE entity_type = 'relation_type' AND name = 'has_permission') \
             JOIN entities p ON p.id = rp.target_id \
             WHERE u.entity_type = 'user' AND u.is_active \
               AND p.entity_type = 'permission' AND p.name = $1",
        )
        .bind(permission.code())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn read_user(
        &self,
        session: &AdminSession,
        user_id: &str,
    ) -> DirectoryResult<UserSummary> {
        authorize(session, codes::USERS_READ)?;
        let sql = format!("{SELECT_USER_SUMMARY} AND LOWER(e.name) = LOWER($1)");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(UserSummary::from)
            .ok_or_else(|| DirectoryError::NotFound(user_id.to_string()))
    }
}

#[async_trait]
impl AccessService for PgDirectory {
    async fn create_session(
        &self,
        user_id: &str,
        password: &str,
        ttl: Duration,
    ) -> DirectoryResult<AdminSession> {
        let invalid = || DirectoryError::Unauthorized("invalid credentials".to_string());

        let found: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT e.id, e.name, COALESCE(p_pw.value, '') \
             FROM entities e \
             LEFT JOIN entity_properties p_pw ON e.id = p_pw.entity_id AND p_pw.key = 'password' \
             WHERE e.entity_type = 'user' AND LOWER(e.name) = LOWER($1) AND e.is_active",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let (id, name, hash) = found.ok_or_else(invalid)?;
        if hash.is_empty() {
            return Err(invalid());
        }
        if !password::verify_password(password, &hash).map_err(DirectoryError::Service)? {
            return Err(invalid());
        }

        // Permission codes across all assigned roles and admin roles.
        let codes: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT p.name \
             FROM relations ur \
             JOIN relations rp ON rp.source_id = ur.target_id \
                AND rp.relation_type_id = (SELECT id FROM entities WHERE entity_type = 'relation_type' AND name = 'has_permission') \
             JOIN entities p ON p.id = rp.target_id AND p.entity_type = 'permission' \
             WHERE ur.source_id = $1 \
               AND ur.relation_type_id IN (SELECT id FROM entities \
                   WHERE entity_type = 'relation_type' AND name IN ('has_role', 'has_admin_role')) \
             ORDER BY p.name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(AdminSession::new(
            &name,
            codes.into_iter().map(|c| c.0).collect(),
            ttl,
        ))
    }
}

#[async_trait]
impl AuditService for PgDirectory {
    async fn find_binds(
        &self,
        session: &AdminSession,
        filter: &BindFilter,
    ) -> DirectoryResult<Vec<BindRecord>> {
        authorize(session, codes::AUDIT_READ)?;
        let user = filter.user.as_deref().map(str::trim).unwrap_or("");
        let pattern = format!("%{}%", escape_like(user));
        let sql = format!(
            "{SELECT_BIND} AND COALESCE(p_dn.value, '') ILIKE $1 \
             AND ($2 = FALSE OR COALESCE(p_res.value, '') <> '0') \
             ORDER BY req_start DESC, e.id DESC"
        );
        let rows = sqlx::query_as::<_, BindRow>(&sql)
            .bind(pattern)
            .bind(filter.failed_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BindRecord::from).collect())
    }

    async fn read_bind(&self, session: &AdminSession, id: &str) -> DirectoryResult<BindRecord> {
        authorize(session, codes::AUDIT_READ)?;
        let sql = format!("{SELECT_BIND} AND e.name = $1");
        sqlx::query_as::<_, BindRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(BindRecord::from)
            .ok_or_else(|| DirectoryError::NotFound(format!("bind {id}")))
    }
}
