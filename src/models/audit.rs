use serde::{Deserialize, Serialize};

/// Audit record of a directory bind (authentication) attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindRecord {
    pub id: String,
    /// DN the client bound as, e.g. `uid=jdoe,ou=People,dc=example,dc=com`.
    pub req_dn: String,
    /// LDAP result code as text; `"0"` means success.
    pub req_result: String,
    /// Start timestamp as stored by the directory (generalized time or RFC 3339).
    pub req_start: String,
}

impl BindRecord {
    pub fn succeeded(&self) -> bool {
        self.req_result.trim() == "0"
    }
}

/// Filter for listing bind records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindFilter {
    /// Case-insensitive substring of the bind DN.
    #[serde(default)]
    pub user: Option<String>,
    /// Only failed binds when true.
    #[serde(default)]
    pub failed_only: bool,
}

impl BindFilter {
    pub fn matches(&self, bind: &BindRecord) -> bool {
        if self.failed_only && bind.succeeded() {
            return false;
        }
        match self.user.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => bind.req_dn.to_lowercase().contains(&u.to_lowercase()),
            _ => true,
        }
    }
}
