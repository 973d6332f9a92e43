use std::fmt;

use serde::{Deserialize, Serialize};

/// An RBAC permission: an operation on a protected object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub obj_name: String,
    pub op_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj_id: Option<String>,
}

impl Permission {
    pub fn new(obj_name: &str, op_name: &str) -> Self {
        Permission {
            obj_name: obj_name.to_string(),
            op_name: op_name.to_string(),
            obj_id: None,
        }
    }

    /// Code form used in session permission lists, e.g. `users.search`.
    pub fn code(&self) -> String {
        format!("{}.{}", self.obj_name, self.op_name)
    }

    /// Parse a `obj.op` code. The operation is everything after the last dot.
    pub fn from_code(code: &str) -> Option<Self> {
        let (obj, op) = code.rsplit_once('.')?;
        if obj.is_empty() || op.is_empty() {
            return None;
        }
        Some(Permission::new(obj, op))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.obj_id {
            Some(id) => write!(f, "{}:{}#{}", self.obj_name, self.op_name, id),
            None => write!(f, "{}:{}", self.obj_name, self.op_name),
        }
    }
}

/// Kind of members an organizational unit holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgUnitType {
    User,
    Perm,
}
