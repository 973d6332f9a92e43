use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::api_structs::{ApiSearchResponse, PaginatedResponse};
use crate::app_state::AppState;
use crate::errors::AppError;
use crate::search::{SearchQuery, SearchRequest};
use crate::views::user_picker::{PAGE_SIZE, UserPicker};
use crate::views::{UserDetailView, selection_channel};

use super::bound_resolver;

/// GET /api/v1/users/search - Faceted user search
/// Query params: perm_obj + perm_op, ou, role, admin_role, user_id.
/// Only the highest-precedence populated criterion is used.
pub async fn search(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let resolver = bound_resolver(&state, &session).await?;
    let criterion = SearchRequest::from(&*query).classify();

    let response = match resolver.resolve(&criterion).await {
        Ok(items) => ApiSearchResponse {
            criterion: criterion.kind().to_string(),
            items,
            warning: None,
        },
        Err(e) => {
            log::warn!("user search by {} failed: {e}", criterion.kind());
            ApiSearchResponse {
                criterion: criterion.kind().to_string(),
                items: Vec::new(),
                warning: Some(e.to_string()),
            }
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

#[derive(Deserialize)]
pub struct PickerQuery {
    q: Option<String>,
    page: Option<i64>,
}

/// GET /api/v1/users/picker - User id prefix search, 10 per page
/// Query params: q (prefix, default all users), page (default 1)
pub async fn picker(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<PickerQuery>,
) -> Result<HttpResponse, AppError> {
    let resolver = bound_resolver(&state, &session).await?;
    let page = query.page.unwrap_or(1).max(1);

    let mut picker = UserPicker::new(resolver);
    if let Some(q) = &query.q {
        picker.set_search_value(q.trim());
    }
    picker.load().await;

    let items = picker.page((page - 1) as usize).to_vec();
    Ok(HttpResponse::Ok().json(PaginatedResponse {
        items,
        page,
        per_page: PAGE_SIZE as i64,
        total: picker.total() as i64,
    }))
}

/// GET /api/v1/users/{user_id} - User detail
/// An id that does not resolve returns the empty record.
pub async fn detail(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let resolver = bound_resolver(&state, &session).await?;
    let user_id = path.into_inner();

    let (publisher, subscriber) = selection_channel();
    let mut view = UserDetailView::new(resolver, subscriber);
    publisher.publish(&user_id);
    let user = view.refresh().await;

    Ok(HttpResponse::Ok().json(user))
}
