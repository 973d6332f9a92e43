use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::api_structs::ApiBindDetailResponse;
use crate::app_state::AppState;
use crate::auth::session::{codes, require_admin_session, require_permission};
use crate::errors::AppError;
use crate::models::BindFilter;
use crate::search::SearchError;
use crate::views::{BindDetailView, selection_channel};

use super::bound_resolver;

/// GET /api/v1/audit/binds - Bind audit records, newest first
/// Query params: user (DN substring), failed_only
pub async fn list(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<BindFilter>,
) -> Result<HttpResponse, AppError> {
    let admin = require_admin_session(&session)?;
    require_permission(&admin, codes::AUDIT_READ)?;
    let binds = state
        .audit
        .find_binds(&admin, &query)
        .await
        .map_err(SearchError::from)?;
    Ok(HttpResponse::Ok().json(binds))
}

/// GET /api/v1/audit/binds/{id} - Bind record with the user it was made as
pub async fn detail(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let admin = require_admin_session(&session)?;
    require_permission(&admin, codes::AUDIT_READ)?;
    let resolver = bound_resolver(&state, &session).await?;
    let id = path.into_inner();

    let (_publisher, subscriber) = selection_channel();
    let mut view = BindDetailView::new(state.audit.clone(), resolver, subscriber);
    view.show_id(&id).await;

    match view.load_error() {
        Some(SearchError::NotFound(_)) => return Err(AppError::NotFound),
        Some(e) => return Err(AppError::Search(e.clone())),
        None => {}
    }

    Ok(HttpResponse::Ok().json(ApiBindDetailResponse {
        bind: view.bind().clone(),
        user: view.user().clone(),
        message: view.message().map(String::from),
    }))
}
