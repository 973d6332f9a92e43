use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::session::codes;

pub async fn init_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

async fn insert_entity(
    pool: &PgPool,
    entity_type: &str,
    name: &str,
    label: &str,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO entities (entity_type, name, label) VALUES ($1, $2, $3) \
         ON CONFLICT (entity_type, name) DO UPDATE SET label = EXCLUDED.label \
         RETURNING id",
    )
    .bind(entity_type)
    .bind(name)
    .bind(label)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn set_property(
    pool: &PgPool,
    entity_id: i64,
    key: &str,
    value: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO entity_properties (entity_id, key, value) VALUES ($1, $2, $3) \
         ON CONFLICT (entity_id, key) DO UPDATE SET value = EXCLUDED.value",
    )
    .bind(entity_id)
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

async fn relate(
    pool: &PgPool,
    relation_type: &str,
    source_id: i64,
    target_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO relations (relation_type_id, source_id, target_id) \
         VALUES ((SELECT id FROM entities WHERE entity_type = 'relation_type' AND name = $1), $2, $3) \
         ON CONFLICT DO NOTHING",
    )
    .bind(relation_type)
    .bind(source_id)
    .bind(target_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Seed a console administrator if the directory has no users yet.
pub async fn seed_admin(pool: &PgPool, admin_password_hash: &str) -> Result<(), sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM entities WHERE entity_type = 'user'")
            .fetch_one(pool)
            .await?;
    if count > 0 {
        log::info!("Directory already seeded ({count} users), skipping admin seed");
        return Ok(());
    }

    let admin_role =
        insert_entity(pool, "admin_role", "console-admin", "Console Administrator").await?;
    for code in [
        codes::USERS_SEARCH,
        codes::USERS_READ,
        codes::PERMS_REVIEW,
        codes::AUDIT_READ,
    ] {
        let perm = insert_entity(pool, "permission", code, code).await?;
        relate(pool, "has_permission", admin_role, perm).await?;
    }

    let admin = insert_entity(pool, "user", "admin", "Administrator").await?;
    set_property(pool, admin, "password", admin_password_hash).await?;
    set_property(pool, admin, "ou", "it").await?;
    relate(pool, "has_admin_role", admin, admin_role).await?;

    log::info!("Seeded console administrator 'admin'");
    Ok(())
}
