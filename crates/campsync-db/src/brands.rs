//! Database operations for the `brands` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A brand as seen by the sync: its provider credential and default
/// collection.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: Uuid,
    pub name: String,
    pub shortimize_api_key: Option<String>,
    pub collection_name: Option<String>,
}

/// Returns brands that carry a provider API key, ordered by name.
///
/// When `brand_id` is set only that brand is returned (still only if it has
/// a key). Blank keys count as absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sync_brands(
    pool: &PgPool,
    brand_id: Option<Uuid>,
) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, shortimize_api_key, collection_name \
         FROM brands \
         WHERE shortimize_api_key IS NOT NULL \
           AND btrim(shortimize_api_key) <> '' \
           AND ($1::uuid IS NULL OR id = $1) \
         ORDER BY name, id",
    )
    .bind(brand_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single brand by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_brand(pool: &PgPool, id: Uuid) -> Result<BrandRow, DbError> {
    sqlx::query_as::<_, BrandRow>(
        "SELECT id, name, shortimize_api_key, collection_name \
         FROM brands \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
