use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::api_structs::ApiErrorResponse;
use crate::directory::DirectoryError;
use crate::search::SearchError;

#[derive(Debug)]
pub enum AppError {
    Directory(DirectoryError),
    Search(SearchError),
    Session(String),
    PermissionDenied(String),
    BadRequest(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Directory(e) => write!(f, "{e}"),
            AppError::Search(e) => write!(f, "{e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::PermissionDenied(code) => write!(f, "Permission denied: {code}"),
            AppError::BadRequest(e) => write!(f, "Bad request: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound
            | AppError::Directory(DirectoryError::NotFound(_))
            | AppError::Search(SearchError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Session(_) | AppError::Directory(DirectoryError::Unauthorized(_)) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::PermissionDenied(_) | AppError::Search(SearchError::Unauthorized(_)) => {
                StatusCode::FORBIDDEN
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("{self}");
            ApiErrorResponse {
                error: "Internal Server Error".to_string(),
                details: None,
            }
        } else {
            ApiErrorResponse {
                error: status.canonical_reason().unwrap_or("Error").to_string(),
                details: Some(self.to_string()),
            }
        };
        HttpResponse::build(status).json(body)
    }
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        AppError::Directory(e)
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        AppError::Search(e)
    }
}
