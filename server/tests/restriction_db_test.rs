//! Restriction API tests against a real `PostgreSQL`.
//!
//! Run with: `cargo test --test restriction_db_test -- --ignored`
//! (see `Config::default_for_test` for the container setup).

mod helpers;

use axum::http::StatusCode;
use helpers::{body_to_json, TestApp};
use serde_json::json;
use sqlx::PgPool;

/// Ids for one test, offset so parallel tests never collide.
struct Ids {
    base: i64,
}

impl Ids {
    fn new() -> Self {
        Self {
            base: i64::from(rand::random::<u32>()) * 100 + 1_000_000,
        }
    }

    fn id(&self, n: i64) -> i64 {
        self.base + n
    }
}

async fn insert_node(pool: &PgPool, id: i64, kind: &str, parent: Option<i64>) {
    sqlx::query("INSERT INTO content_nodes (id, kind, parent_id) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(kind)
        .bind(parent)
        .execute(pool)
        .await
        .expect("Failed to insert node");
}

async fn insert_rule(pool: &PgPool, node: i64, products: &[i64], any_purchase: bool) {
    sqlx::query(
        "INSERT INTO content_restrictions (node_id, product_ids, any_purchase) VALUES ($1, $2, $3)",
    )
    .bind(node)
    .bind(products)
    .bind(any_purchase)
    .execute(pool)
    .await
    .expect("Failed to insert rule");
}

async fn cleanup(pool: &PgPool, ids: &Ids) {
    let (low, high) = (ids.id(0), ids.id(99));
    for sql in [
        "DELETE FROM content_nodes WHERE id BETWEEN $1 AND $2",
        "DELETE FROM content_restrictions WHERE node_id BETWEEN $1 AND $2",
        "DELETE FROM purchases WHERE user_id BETWEEN $1 AND $2",
        "DELETE FROM products WHERE id BETWEEN $1 AND $2",
    ] {
        let _ = sqlx::query(sql).bind(low).bind(high).execute(pool).await;
    }
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_inherited_restriction_and_purchase() {
    let app = TestApp::new().await;
    let pool = &app.pool;
    let ids = Ids::new();
    let (parent, child, product, buyer, visitor) =
        (ids.id(1), ids.id(2), ids.id(50), ids.id(80), ids.id(81));

    insert_node(pool, parent, "page", None).await;
    insert_node(pool, child, "page", Some(parent)).await;
    insert_rule(pool, parent, &[product], false).await;
    sqlx::query("INSERT INTO products (id, name) VALUES ($1, 'Course <Pro>')")
        .bind(product)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO purchases (user_id, product_id) VALUES ($1, $2)")
        .bind(buyer)
        .bind(product)
        .execute(pool)
        .await
        .unwrap();

    let resp = app.get(&format!("/api/nodes/{child}/restriction")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_to_json(resp).await;
    assert_eq!(body["restricted"], true);
    assert_eq!(body["restriction"]["source"], parent);
    assert_eq!(body["restriction"]["distance"], 1);

    let resp = app
        .post_json(
            "/api/access/check",
            &json!({ "viewer": { "user_id": buyer }, "node_id": child }),
        )
        .await;
    assert_eq!(body_to_json(resp).await["granted"], true);

    let resp = app
        .post_json(
            "/api/access/check",
            &json!({ "viewer": { "user_id": visitor }, "node_id": child }),
        )
        .await;
    let body = body_to_json(resp).await;
    assert_eq!(body["granted"], false);
    assert_eq!(
        body["message"],
        "This content is restricted to buyers of Course &lt;Pro&gt;."
    );

    cleanup(pool, &ids).await;
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_cyclic_hierarchy_terminates() {
    let app = TestApp::new().await;
    let pool = &app.pool;
    let ids = Ids::new();
    let (a, b) = (ids.id(1), ids.id(2));

    insert_node(pool, a, "page", Some(b)).await;
    insert_node(pool, b, "page", Some(a)).await;

    let resp = app.get(&format!("/api/nodes/{a}/restriction")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_to_json(resp).await["restricted"], false);

    cleanup(pool, &ids).await;
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_forum_feedback_override() {
    let app = TestApp::new().await;
    let pool = &app.pool;
    let ids = Ids::new();
    let (forum, topic) = (ids.id(1), ids.id(2));

    insert_node(pool, forum, "forum", None).await;
    insert_node(pool, topic, "topic", Some(forum)).await;
    insert_rule(pool, forum, &[], true).await;

    let resp = app
        .post_json(
            "/api/forum/feedback",
            &json!({
                "page": "topic",
                "node_id": topic,
                "text": "You cannot reply to this topic."
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_to_json(resp).await;
    assert_eq!(body["overridden"], true);
    assert_eq!(body["text"], "Topic creation is restricted to buyers.");

    cleanup(pool, &ids).await;
}
