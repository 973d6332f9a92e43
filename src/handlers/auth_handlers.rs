use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::api_structs::{ApiLoginRequest, ApiLoginResponse};
use crate::app_state::AppState;
use crate::auth::session;
use crate::errors::AppError;

/// POST /api/v1/login - Create an admin session from directory credentials
pub async fn login(
    state: web::Data<AppState>,
    session: Session,
    body: web::Json<ApiLoginRequest>,
) -> Result<HttpResponse, AppError> {
    if body.user_id.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest("user_id and password are required".to_string()));
    }

    let admin = match state
        .access
        .create_session(body.user_id.trim(), &body.password, state.session_ttl)
        .await
    {
        Ok(admin) => admin,
        Err(e) => {
            log::info!("login failed for {}: {e}", body.user_id.trim());
            return Err(e.into());
        }
    };

    session::store(&session, &admin)?;
    log::info!("{} logged in", admin.user_id);

    Ok(HttpResponse::Ok().json(ApiLoginResponse {
        user_id: admin.user_id,
        permissions: admin.permissions.0,
        expires_at: admin.expires_at.to_rfc3339(),
    }))
}

/// POST /api/v1/logout
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}
