use serde::Deserialize;

use crate::models::{Permission, UserTemplate};

/// Exactly one way of selecting users. Built once at the request boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriterion {
    /// Nothing to search for; resolves to an empty list without a remote call.
    Unconstrained,
    PermissionFilter(Permission),
    OrgUnitFilter(String),
    RoleFilter(String),
    AdminRoleFilter(String),
    RawUserTemplate(UserTemplate),
}

impl SearchCriterion {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchCriterion::Unconstrained => "unconstrained",
            SearchCriterion::PermissionFilter(_) => "permission",
            SearchCriterion::OrgUnitFilter(_) => "org_unit",
            SearchCriterion::RoleFilter(_) => "role",
            SearchCriterion::AdminRoleFilter(_) => "admin_role",
            SearchCriterion::RawUserTemplate(_) => "template",
        }
    }
}

/// Raw search input: an optional permission and an optional partially filled
/// user record, as submitted by a search form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub permission: Option<Permission>,
    pub template: Option<UserTemplate>,
}

impl SearchRequest {
    pub fn for_permission(permission: Permission) -> Self {
        SearchRequest {
            permission: Some(permission),
            template: None,
        }
    }

    pub fn for_template(template: UserTemplate) -> Self {
        SearchRequest {
            permission: None,
            template: Some(template),
        }
    }

    /// Pick the single criterion to search by.
    ///
    /// Precedence, first match wins: permission, org unit, role, admin role,
    /// raw template. Only the first role (or admin role) of a multi-role
    /// template is used; blank entries are skipped.
    pub fn classify(&self) -> SearchCriterion {
        if let Some(perm) = &self.permission {
            return SearchCriterion::PermissionFilter(perm.clone());
        }
        let template = match &self.template {
            Some(t) if !t.is_blank() => t,
            _ => return SearchCriterion::Unconstrained,
        };
        if !template.ou.trim().is_empty() {
            SearchCriterion::OrgUnitFilter(template.ou.trim().to_string())
        } else if let Some(role) = first_non_blank(&template.roles) {
            SearchCriterion::RoleFilter(role)
        } else if let Some(admin_role) = first_non_blank(&template.admin_roles) {
            SearchCriterion::AdminRoleFilter(admin_role)
        } else {
            SearchCriterion::RawUserTemplate(template.clone())
        }
    }
}

/// Query-string form of a search: `?perm_obj=&perm_op=&ou=&role=&admin_role=&user_id=`.
/// `role` and `admin_role` accept comma-separated lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub perm_obj: Option<String>,
    pub perm_op: Option<String>,
    pub ou: Option<String>,
    pub role: Option<String>,
    pub admin_role: Option<String>,
    pub user_id: Option<String>,
}

/// First entry that is not blank, trimmed.
fn first_non_blank(names: &[String]) -> Option<String> {
    names
        .iter()
        .map(|n| n.trim())
        .find(|n| !n.is_empty())
        .map(String::from)
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn split_list(v: &Option<String>) -> Vec<String> {
    non_blank(v)
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl From<&SearchQuery> for SearchRequest {
    fn from(q: &SearchQuery) -> Self {
        let permission = match (non_blank(&q.perm_obj), non_blank(&q.perm_op)) {
            (Some(obj), Some(op)) => Some(Permission::new(obj, op)),
            _ => None,
        };
        let template = UserTemplate {
            user_id: non_blank(&q.user_id).unwrap_or("").to_string(),
            ou: non_blank(&q.ou).unwrap_or("").to_string(),
            roles: split_list(&q.role),
            admin_roles: split_list(&q.admin_role),
        };
        SearchRequest {
            permission,
            template: (!template.is_blank()).then_some(template),
        }
    }
}
