//! Restriction data queries.
//!
//! Rows come back with raw `BIGINT` ids; conversion into core types happens
//! in the snapshot loader.

use sqlx::{FromRow, PgPool};

/// A content node row.
#[derive(Debug, Clone, FromRow)]
pub struct NodeRow {
    pub id: i64,
    pub kind: String,
    pub parent_id: Option<i64>,
}

/// A restriction rule row.
#[derive(Debug, Clone, FromRow)]
pub struct RestrictionRow {
    pub node_id: i64,
    pub product_ids: Vec<i64>,
    pub any_purchase: bool,
    pub match_mode: Option<String>,
    pub message_variant: Option<String>,
}

/// A product row.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
}

/// A settings row.
#[derive(Debug, Clone, FromRow)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
}

/// Load `ids` and every ancestor up to `max_depth` links above them.
///
/// The depth bound keeps the recursion finite on cyclic data; duplicates
/// from overlapping lineages are removed.
#[tracing::instrument(skip(pool))]
pub async fn load_lineage(
    pool: &PgPool,
    ids: &[i64],
    max_depth: i32,
) -> Result<Vec<NodeRow>, sqlx::Error> {
    sqlx::query_as::<_, NodeRow>(
        r"
        WITH RECURSIVE lineage AS (
            SELECT id, kind, parent_id, 0 AS depth
            FROM content_nodes
            WHERE id = ANY($1)
            UNION ALL
            SELECT n.id, n.kind, n.parent_id, l.depth + 1
            FROM content_nodes n
            JOIN lineage l ON n.id = l.parent_id
            WHERE l.depth < $2
        )
        SELECT DISTINCT id, kind, parent_id FROM lineage
        ",
    )
    .bind(ids)
    .bind(max_depth)
    .fetch_all(pool)
    .await
}

/// Load the restriction rules attached to any of `node_ids`.
#[tracing::instrument(skip(pool, node_ids), fields(count = node_ids.len()))]
pub async fn load_restrictions(
    pool: &PgPool,
    node_ids: &[i64],
) -> Result<Vec<RestrictionRow>, sqlx::Error> {
    sqlx::query_as::<_, RestrictionRow>(
        r"
        SELECT node_id, product_ids, any_purchase, match_mode, message_variant
        FROM content_restrictions
        WHERE node_id = ANY($1)
        ",
    )
    .bind(node_ids)
    .fetch_all(pool)
    .await
}

/// Products a user has completed a purchase of.
#[tracing::instrument(skip(pool))]
pub async fn load_purchases(pool: &PgPool, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT product_id FROM purchases WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Names of the given products.
#[tracing::instrument(skip(pool, ids), fields(count = ids.len()))]
pub async fn load_products(pool: &PgPool, ids: &[i64]) -> Result<Vec<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>("SELECT id, name FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

/// Settings rows for the given keys.
#[tracing::instrument(skip(pool))]
pub async fn load_settings(pool: &PgPool, keys: &[&str]) -> Result<Vec<SettingRow>, sqlx::Error> {
    sqlx::query_as::<_, SettingRow>(
        "SELECT key, value FROM restriction_settings WHERE key = ANY($1)",
    )
    .bind(keys)
    .fetch_all(pool)
    .await
}
