use serde::{Deserialize, Serialize};

use crate::models::{BindRecord, UserSummary};

/// Generic paginated response wrapper for API endpoints.
#[derive(Serialize, Debug, Clone)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Result of a user search. Failed searches return no items and a warning
/// for the client to show next to the (empty) list.
#[derive(Serialize, Debug, Clone)]
pub struct ApiSearchResponse {
    pub criterion: String,
    pub items: Vec<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Bind record with the user it was made as.
#[derive(Serialize, Debug, Clone)]
pub struct ApiBindDetailResponse {
    pub bind: BindRecord,
    pub user: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ApiLoginRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct ApiLoginResponse {
    pub user_id: String,
    pub permissions: Vec<String>,
    pub expires_at: String,
}

/// API error response.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
