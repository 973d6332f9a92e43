use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use fortress_console::app_state::AppState;
use fortress_console::auth::password;
use fortress_console::config::AppConfig;
use fortress_console::directory::{MemoryDirectory, PgDirectory};
use fortress_console::{db, handlers};

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env().map_err(io_error)?;
    let admin_hash = password::hash_password(DEFAULT_ADMIN_PASSWORD).map_err(io_error)?;

    let state = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.max_connections)
                .await
                .map_err(io_error)?;
            db::run_migrations(&pool).await.map_err(io_error)?;
            db::seed_admin(&pool, &admin_hash).await.map_err(io_error)?;
            log::info!("Using PostgreSQL directory");
            AppState::new(Arc::new(PgDirectory::new(pool)), config.session_ttl)
        }
        None => {
            log::warn!("No DATABASE_URL set, using in-memory demo directory");
            AppState::new(
                Arc::new(MemoryDirectory::with_demo_data(&admin_hash)),
                config.session_ttl,
            )
        }
    };

    let secret_key = match &config.session_key {
        Some(key) => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(key.as_bytes())
        }
        None => {
            log::warn!("No usable SESSION_KEY, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    log::info!("Starting server at http://{}", config.bind_addr);

    let state = web::Data::new(state);
    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
