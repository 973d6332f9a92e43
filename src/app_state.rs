use std::sync::Arc;

use chrono::Duration;

use crate::directory::{AccessService, AuditService, ReviewService};

/// Shared handler state: the directory behind its three service seams.
#[derive(Clone)]
pub struct AppState {
    pub review: Arc<dyn ReviewService>,
    pub access: Arc<dyn AccessService>,
    pub audit: Arc<dyn AuditService>,
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new<D>(directory: Arc<D>, session_ttl: Duration) -> Self
    where
        D: ReviewService + AccessService + AuditService + 'static,
    {
        AppState {
            review: directory.clone(),
            access: directory.clone(),
            audit: directory,
            session_ttl,
        }
    }
}
