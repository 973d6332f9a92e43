use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Directory user as returned by the review service. Safe for display, carries
/// no credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    pub display_name: String,
    pub ou: String,
    pub description: String,
    pub title: String,
    pub roles: Vec<String>,
    pub admin_roles: Vec<String>,
}

impl UserSummary {
    pub fn new(user_id: &str) -> Self {
        UserSummary {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ou(mut self, ou: &str) -> Self {
        self.ou = ou.to_string();
        self
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_admin_roles(mut self, admin_roles: &[&str]) -> Self {
        self.admin_roles = admin_roles.iter().map(|r| r.to_string()).collect();
        self
    }

    /// The empty record shown by detail views when nothing resolves.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_empty()
    }
}

/// Partially filled user record used as search input.
/// Blank fields are treated as "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTemplate {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub ou: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub admin_roles: Vec<String>,
}

impl UserTemplate {
    /// Template matching every user whose id starts with `prefix`.
    pub fn with_user_id(prefix: &str) -> Self {
        UserTemplate {
            user_id: prefix.to_string(),
            ..Default::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.user_id.trim().is_empty()
            && self.ou.trim().is_empty()
            && self.roles.iter().all(|r| r.trim().is_empty())
            && self.admin_roles.iter().all(|r| r.trim().is_empty())
    }

    /// Prefix match on user id, case-insensitive. Used by in-memory directories.
    pub fn matches(&self, user: &UserSummary) -> bool {
        let prefix = self.user_id.trim().to_lowercase();
        user.user_id.to_lowercase().starts_with(&prefix)
    }
}

/// Case-insensitive ordinal comparison of user ids.
pub fn cmp_user_id(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Extract the user id from a directory DN such as `uid=jdoe,ou=People,dc=example,dc=com`.
/// A value without any `=` is taken as a bare user id.
pub fn user_id_from_dn(dn: &str) -> Option<String> {
    let dn = dn.trim();
    if dn.is_empty() {
        return None;
    }
    if !dn.contains('=') {
        return Some(dn.to_string());
    }
    dn.split(',')
        .filter_map(|rdn| rdn.split_once('='))
        .find(|(attr, _)| attr.trim().eq_ignore_ascii_case("uid"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
}
