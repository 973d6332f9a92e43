use std::fmt;

use crate::directory::DirectoryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The bound session lacks rights for the query.
    Unauthorized(String),
    /// Transport or remote failure unrelated to authorization.
    ServiceFailure(String),
    /// A single-record lookup found nothing.
    NotFound(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Unauthorized(e) => write!(f, "Not authorized: {e}"),
            SearchError::ServiceFailure(e) => write!(f, "Search failed: {e}"),
            SearchError::NotFound(e) => write!(f, "Not found: {e}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<DirectoryError> for SearchError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Unauthorized(msg) => SearchError::Unauthorized(msg),
            DirectoryError::NotFound(msg) => SearchError::NotFound(msg),
            DirectoryError::Service(msg) => SearchError::ServiceFailure(msg),
        }
    }
}
