//! HTTP-level integration tests for the tokenized `/editor` API.
//!
//! Tokens are minted through the repository layer to set up scenarios, then
//! every route is exercised through the real router via tower::ServiceExt.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, build_test_app, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

use guidetree_db::models::node::CreateNode;
use guidetree_db::models::node_option::CreateNodeOption;
use guidetree_db::models::tree::CreateTree;
use guidetree_db::repositories::{EditTokenRepo, NodeOptionRepo, NodeRepo, TreeRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_tree(name: &str) -> CreateTree {
    CreateTree {
        name: name.to_string(),
        description: None,
        created_by: "U1".to_string(),
    }
}

fn decision(title: &str) -> CreateNode {
    CreateNode {
        node_type: "decision".to_string(),
        title: title.to_string(),
        content: None,
    }
}

fn answer(title: &str) -> CreateNode {
    CreateNode {
        node_type: "answer".to_string(),
        title: title.to_string(),
        content: Some("Details.".to_string()),
    }
}

async fn seed_tree(pool: &PgPool, name: &str) -> i64 {
    TreeRepo::create(pool, &new_tree(name)).await.unwrap().id
}

async fn issue_token(pool: &PgPool, tree_id: i64) -> String {
    let token = guidetree_core::token::generate_edit_token();
    let expires_at = guidetree_core::token::expiry_from(Utc::now());
    EditTokenRepo::create(pool, &token, tree_id, "U1", expires_at)
        .await
        .unwrap();
    token
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn snapshot_returns_full_tree(pool: PgPool) {
    let tree_id = seed_tree(&pool, "Onboarding").await;
    let q1 = NodeRepo::create(&pool, tree_id, &decision("Q1")).await.unwrap();
    let a1 = NodeRepo::create(&pool, tree_id, &answer("A1")).await.unwrap();
    NodeOptionRepo::create(
        &pool,
        q1.id,
        &CreateNodeOption {
            label: "Yes".to_string(),
            next_node_id: Some(a1.id),
        },
    )
    .await
    .unwrap();
    let token = issue_token(&pool, tree_id).await;

    let app = build_test_app(pool);
    let response = get(app, &format!("/editor/{token}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["tree"]["name"], "Onboarding");
    assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(json["options"].as_array().unwrap().len(), 1);
    assert!(json["expires_at"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn snapshot_with_unknown_token_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/editor/definitely-not-a-real-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TOKEN");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn expired_token_is_unauthorized(pool: PgPool) {
    let tree_id = seed_tree(&pool, "Stale").await;
    let token = guidetree_core::token::generate_edit_token();
    let expired = Utc::now() - Duration::minutes(5);
    EditTokenRepo::create(&pool, &token, tree_id, "U1", expired)
        .await
        .unwrap();

    let app = build_test_app(pool);
    let response = get(app, &format!("/editor/{token}")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Tree and node mutations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn update_tree_info_via_token(pool: PgPool) {
    let tree_id = seed_tree(&pool, "Before").await;
    let token = issue_token(&pool, tree_id).await;

    let app = build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/editor/{token}"),
        json!({ "name": "After", "description": "Now described" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let tree = TreeRepo::find_by_id(&pool, tree_id).await.unwrap().unwrap();
    assert_eq!(tree.name, "After");
    assert_eq!(tree.description.as_deref(), Some("Now described"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_tree_name_is_rejected(pool: PgPool) {
    let tree_id = seed_tree(&pool, "Untouched").await;
    let token = issue_token(&pool, tree_id).await;

    let app = build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/editor/{token}"),
        json!({ "name": "   ", "description": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let tree = TreeRepo::find_by_id(&pool, tree_id).await.unwrap().unwrap();
    assert_eq!(tree.name, "Untouched");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_and_update_node_via_token(pool: PgPool) {
    let tree_id = seed_tree(&pool, "T").await;
    let token = issue_token(&pool, tree_id).await;

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/editor/{token}/nodes"),
        json!({ "node_type": "decision", "title": "Q1", "content": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let node = body_json(response).await;
    let node_id = node["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/editor/{token}/nodes/{node_id}"),
        json!({ "node_type": "answer", "title": "A1", "content": "Done" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = NodeRepo::find_by_id(&pool, node_id).await.unwrap().unwrap();
    assert_eq!(stored.node_type, "answer");
    assert_eq!(stored.title, "A1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn node_in_another_tree_is_not_visible(pool: PgPool) {
    let mine = seed_tree(&pool, "Mine").await;
    let theirs = seed_tree(&pool, "Theirs").await;
    let foreign = NodeRepo::create(&pool, theirs, &decision("Secret")).await.unwrap();
    let token = issue_token(&pool, mine).await;

    let app = build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/editor/{token}/nodes/{}", foreign.id),
        json!({ "node_type": "decision", "title": "Hijacked", "content": null }),
    )
    .await;
    // Scope mismatch reads as absence, not as a permissions hint.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored = NodeRepo::find_by_id(&pool, foreign.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Secret");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_node_clears_inbound_edges(pool: PgPool) {
    let tree_id = seed_tree(&pool, "T").await;
    let q1 = NodeRepo::create(&pool, tree_id, &decision("Q1")).await.unwrap();
    let a1 = NodeRepo::create(&pool, tree_id, &answer("A1")).await.unwrap();
    let opt = NodeOptionRepo::create(
        &pool,
        q1.id,
        &CreateNodeOption {
            label: "Yes".to_string(),
            next_node_id: Some(a1.id),
        },
    )
    .await
    .unwrap();
    let token = issue_token(&pool, tree_id).await;

    let app = build_test_app(pool.clone());
    let response = delete(app, &format!("/editor/{token}/nodes/{}", a1.id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let stored = NodeOptionRepo::find_by_id(&pool, opt.id).await.unwrap().unwrap();
    assert_eq!(stored.next_node_id, None);
}

// ---------------------------------------------------------------------------
// Option mutations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_option_with_same_tree_target(pool: PgPool) {
    let tree_id = seed_tree(&pool, "T").await;
    let q1 = NodeRepo::create(&pool, tree_id, &decision("Q1")).await.unwrap();
    let a1 = NodeRepo::create(&pool, tree_id, &answer("A1")).await.unwrap();
    let token = issue_token(&pool, tree_id).await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        &format!("/editor/{token}/nodes/{}/options", q1.id),
        json!({ "label": "Yes", "next_node_id": a1.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["label"], "Yes");
    assert_eq!(json["next_node_id"], a1.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cross_tree_target_is_rejected_without_side_effects(pool: PgPool) {
    let mine = seed_tree(&pool, "Mine").await;
    let theirs = seed_tree(&pool, "Theirs").await;
    let q1 = NodeRepo::create(&pool, mine, &decision("Q1")).await.unwrap();
    let foreign = NodeRepo::create(&pool, theirs, &answer("Far")).await.unwrap();
    let token = issue_token(&pool, mine).await;

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/editor/{token}/nodes/{}/options", q1.id),
        json!({ "label": "Bad", "next_node_id": foreign.id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let options = NodeOptionRepo::list_by_node(&pool, q1.id).await.unwrap();
    assert!(options.is_empty(), "rejected edge must not be inserted");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_and_delete_option_via_token(pool: PgPool) {
    let tree_id = seed_tree(&pool, "T").await;
    let q1 = NodeRepo::create(&pool, tree_id, &decision("Q1")).await.unwrap();
    let opt = NodeOptionRepo::create(
        &pool,
        q1.id,
        &CreateNodeOption {
            label: "Old".to_string(),
            // Unset edge: allowed, renders as "(not set)".
            next_node_id: None,
        },
    )
    .await
    .unwrap();
    let token = issue_token(&pool, tree_id).await;

    let app = build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/editor/{token}/options/{}", opt.id),
        json!({ "label": "New", "next_node_id": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["label"], "New");

    let app = build_test_app(pool.clone());
    let response = delete(app, &format!("/editor/{token}/options/{}", opt.id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(NodeOptionRepo::find_by_id(&pool, opt.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// End-to-end: edits made here are visible to the navigation engine
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn edited_tree_navigates_from_inferred_root(pool: PgPool) {
    let tree_id = seed_tree(&pool, "Support").await;
    let token = issue_token(&pool, tree_id).await;

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/editor/{token}/nodes"),
        json!({ "node_type": "decision", "title": "Is it plugged in?", "content": null }),
    )
    .await;
    let q1 = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/editor/{token}/nodes"),
        json!({ "node_type": "answer", "title": "Plug it in", "content": null }),
    )
    .await;
    let a1 = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    post_json(
        app,
        &format!("/editor/{token}/nodes/{q1}/options"),
        json!({ "label": "No", "next_node_id": a1 }),
    )
    .await;

    // Q1 is the only node nothing points at, so it is the root.
    let view = guidetree_api::engine::navigator::start(&pool, tree_id)
        .await
        .unwrap();
    assert_eq!(view.node_id, q1);
    assert!(!view.is_terminal());

    let choice = view.choices()[0].option_id;
    let next = guidetree_api::engine::navigator::advance(&pool, choice)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.node_id, a1);
    assert!(next.is_terminal());
}
