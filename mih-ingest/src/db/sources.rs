//! Source lookups and activation toggling

use mih_common::db::Source;
use mih_common::{Error, Result};
use sqlx::SqlitePool;

pub async fn list_sources(pool: &SqlitePool) -> Result<Vec<Source>> {
    let sources = sqlx::query_as::<_, Source>(
        "SELECT id, name, type, description, is_active FROM sources ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(sources)
}

pub async fn get_source(pool: &SqlitePool, source_id: i64) -> Result<Source> {
    sqlx::query_as::<_, Source>(
        "SELECT id, name, type, description, is_active FROM sources WHERE id = ?",
    )
    .bind(source_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Source {} not found", source_id)))
}

/// Flip `is_active` and return the updated source
pub async fn toggle_source(pool: &SqlitePool, source_id: i64) -> Result<Source> {
    let result = sqlx::query("UPDATE sources SET is_active = NOT is_active WHERE id = ?")
        .bind(source_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Source {} not found", source_id)));
    }

    get_source(pool, source_id).await
}

/// Whether uploads into this source are accepted
pub async fn is_source_active(pool: &SqlitePool, source_id: i64) -> Result<bool> {
    Ok(get_source(pool, source_id).await?.is_active)
}
