pub mod audit_handlers;
pub mod auth_handlers;
pub mod user_handlers;

use actix_session::Session;
use actix_web::{middleware::from_fn, web};

use crate::app_state::AppState;
use crate::auth::middleware::{require_auth, require_json_content_type};
use crate::auth::session::require_admin_session;
use crate::errors::AppError;
use crate::search::{FacetedUserResolver, SearchError};

/// Resolver bound to the request's admin session. A session the directory
/// no longer accepts is purged and reported as 401.
pub(crate) async fn bound_resolver(
    state: &AppState,
    session: &Session,
) -> Result<FacetedUserResolver, AppError> {
    let admin = require_admin_session(session)?;
    FacetedUserResolver::bind(state.review.clone(), admin)
        .await
        .map_err(|e| match e {
            SearchError::Unauthorized(msg) => {
                session.purge();
                AppError::Session(msg)
            }
            other => AppError::Search(other),
        })
}

/// Configure API v1 routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .wrap(from_fn(require_json_content_type))
            .route("/login", web::post().to(auth_handlers::login))
            .service(
                web::scope("")
                    .wrap(from_fn(require_auth))
                    .route("/logout", web::post().to(auth_handlers::logout))
                    .route("/users/search", web::get().to(user_handlers::search))
                    .route("/users/picker", web::get().to(user_handlers::picker))
                    .route("/users/{user_id}", web::get().to(user_handlers::detail))
                    .route("/audit/binds", web::get().to(audit_handlers::list))
                    .route("/audit/binds/{id}", web::get().to(audit_handlers::detail)),
            ),
    );
}
