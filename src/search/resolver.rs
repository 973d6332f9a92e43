use std::sync::Arc;

use super::criterion::SearchCriterion;
use super::error::SearchError;
use crate::auth::session::AdminSession;
use crate::directory::ReviewService;
use crate::models::user::cmp_user_id;
use crate::models::{OrgUnitType, Permission, UserSummary};

/// Users ordered ascending by user id, case-insensitive. Empty, never absent.
pub type ResolvedList = Vec<UserSummary>;

/// Sort by user id ignoring case. Stable, so duplicate ids keep their order.
pub fn sort_by_user_id(users: &mut [UserSummary]) {
    users.sort_by(|a, b| cmp_user_id(&a.user_id, &b.user_id));
}

/// Picks one lookup strategy per criterion, runs it against the review
/// service under a bound admin session, and orders the result.
#[derive(Clone)]
pub struct FacetedUserResolver {
    service: Arc<dyn ReviewService>,
    session: AdminSession,
}

impl FacetedUserResolver {
    /// Bind `session` once; every later query runs under it.
    pub async fn bind(
        service: Arc<dyn ReviewService>,
        session: AdminSession,
    ) -> Result<Self, SearchError> {
        service.bind_admin_session(&session).await?;
        log::debug!("review session bound for {}", session.user_id);
        Ok(FacetedUserResolver { service, session })
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    pub async fn resolve(&self, criterion: &SearchCriterion) -> Result<ResolvedList, SearchError> {
        log::debug!("resolve criterion={}", criterion.kind());
        let svc = &self.service;
        let session = &self.session;

        let result = match criterion {
            SearchCriterion::Unconstrained => return Ok(Vec::new()),
            SearchCriterion::PermissionFilter(perm) => self.permission_users(perm).await,
            SearchCriterion::OrgUnitFilter(ou) => {
                svc.find_users_by_org_unit(session, ou, OrgUnitType::User).await
            }
            SearchCriterion::RoleFilter(role) => {
                svc.find_users_by_assigned_role(session, role).await
            }
            SearchCriterion::AdminRoleFilter(admin_role) => {
                svc.find_users_by_assigned_admin_role(session, admin_role).await
            }
            SearchCriterion::RawUserTemplate(template) => svc.find_users(session, template).await,
        };

        let mut users = result.map_err(|e| {
            log::warn!("resolve {} caught {e}", criterion.kind());
            SearchError::from(e)
        })?;
        sort_by_user_id(&mut users);
        Ok(users)
    }

    /// Look up a single user by id under the bound session.
    pub async fn lookup(&self, user_id: &str) -> Result<UserSummary, SearchError> {
        Ok(self.service.read_user(&self.session, user_id).await?)
    }

    /// Permission users, fetched one by one. A failed fetch skips that id only.
    async fn permission_users(
        &self,
        perm: &Permission,
    ) -> crate::directory::DirectoryResult<Vec<UserSummary>> {
        let ids = self
            .service
            .authorized_permission_users(&self.session, perm)
            .await?;

        let mut users = Vec::with_capacity(ids.len());
        for user_id in &ids {
            match self.service.read_user(&self.session, user_id).await {
                Ok(user) => users.push(user),
                Err(e) => log::warn!("permission {perm}: skipping {user_id}: {e}"),
            }
        }
        Ok(users)
    }
}
