//! Handlers for the inbound chat-platform surface.
//!
//! Two endpoints: `/chat/events` (Events API callbacks: home opened,
//! workflow step execution) and `/chat/interactions` (button clicks and
//! modal submissions). Both verify the platform signature over the raw
//! body before parsing anything.
//!
//! No navigation or editing state is persisted between interactions: a
//! button carries an entity id, a modal carries an [`EditContext`] in its
//! private metadata, and everything else is reloaded from the store.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use guidetree_core::error::CoreError;
use guidetree_core::types::DbId;
use guidetree_db::models::node::Node;
use guidetree_db::repositories::{EditTokenRepo, NodeOptionRepo, NodeRepo, TreeRepo};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chat::actions::Action;
use crate::chat::{signature, views};
use crate::engine::authoring::{self, EditContext};
use crate::engine::navigator::{self, NavError};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Signature verification
// ---------------------------------------------------------------------------

fn verify_signature(state: &AppState, headers: &HeaderMap, body: &str) -> AppResult<()> {
    let timestamp: i64 = headers
        .get("x-slack-request-timestamp")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing request timestamp".into()))
        })?;
    let provided = headers
        .get("x-slack-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing request signature".into()))
        })?;

    let now = Utc::now().timestamp();
    if !signature::verify(
        &state.config.chat_signing_secret,
        timestamp,
        body,
        provided,
        now,
    ) {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Request signature verification failed".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// POST /chat/events
// ---------------------------------------------------------------------------

/// Events API callback: URL verification handshake, home tab opens, and
/// workflow step execution.
pub async fn events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<Response> {
    verify_signature(&state, &headers, &body)?;

    let payload: Value = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed event payload: {e}")))?;

    match payload["type"].as_str() {
        Some("url_verification") => {
            let challenge = payload["challenge"].as_str().unwrap_or_default();
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        Some("event_callback") => {
            dispatch_event(&state, &payload["event"]).await?;
            Ok(().into_response())
        }
        _ => Ok(().into_response()),
    }
}

async fn dispatch_event(state: &AppState, event: &Value) -> AppResult<()> {
    match event["type"].as_str() {
        Some("app_home_opened") => {
            let user_id = event["user"]
                .as_str()
                .ok_or_else(|| AppError::BadRequest("app_home_opened without user".into()))?;
            publish_home(state, user_id).await
        }
        Some("workflow_step_execute") => {
            let inputs = &event["workflow_step"]["inputs"];
            let tree_id: DbId = inputs["tree"]["value"]
                .as_str()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| AppError::BadRequest("workflow step without tree input".into()))?;
            let channel = inputs["channel"]["value"]
                .as_str()
                .ok_or_else(|| AppError::BadRequest("workflow step without channel".into()))?;
            execute_workflow_step(state, tree_id, channel).await
        }
        other => {
            tracing::debug!(event_type = ?other, "Ignoring unhandled event");
            Ok(())
        }
    }
}

/// Run a tree into the step's configured channel.
///
/// A tree with no well-defined root is a hard failure here: the workflow
/// was explicitly configured with this tree, so the operator gets the
/// diagnostic instead of silence.
async fn execute_workflow_step(state: &AppState, tree_id: DbId, channel: &str) -> AppResult<()> {
    match navigator::start(&state.pool, tree_id).await {
        Ok(view) => {
            state
                .chat
                .post_message(
                    channel,
                    &views::navigation_text(&view),
                    views::navigation_blocks(&view),
                )
                .await?;
            Ok(())
        }
        Err(NavError::Root(reason)) => {
            tracing::warn!(tree_id, %reason, "Workflow step tree is not runnable");
            state
                .chat
                .post_message(
                    channel,
                    &format!(
                        "Workflow step failed: {}",
                        views::not_runnable_text(reason)
                    ),
                    Value::Array(vec![]),
                )
                .await?;
            Ok(())
        }
        Err(err) => Err(nav_to_app(err)),
    }
}

// ---------------------------------------------------------------------------
// POST /chat/interactions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct InteractionForm {
    payload: String,
}

/// Interactivity callback: block actions, modal submissions, and workflow
/// step configuration.
pub async fn interactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<Response> {
    verify_signature(&state, &headers, &body)?;

    let form: InteractionForm = serde_urlencoded::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed interaction body: {e}")))?;
    let payload: Value = serde_json::from_str(&form.payload)
        .map_err(|e| AppError::BadRequest(format!("Malformed interaction payload: {e}")))?;

    match payload["type"].as_str() {
        Some("block_actions") => handle_block_action(&state, &payload).await,
        Some("view_submission") => handle_view_submission(&state, &payload).await,
        Some("workflow_step_edit") => handle_workflow_edit(&state, &payload).await,
        other => {
            tracing::debug!(interaction_type = ?other, "Ignoring unhandled interaction");
            Ok(().into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Block actions
// ---------------------------------------------------------------------------

async fn handle_block_action(state: &AppState, payload: &Value) -> AppResult<Response> {
    let action_id = payload["actions"][0]["action_id"]
        .as_str()
        .ok_or_else(|| AppError::BadRequest("block_actions without action_id".into()))?;
    let Ok(action) = action_id.parse::<Action>() else {
        tracing::debug!(action_id, "Ignoring unrecognized action");
        return Ok(().into_response());
    };

    let user_id = payload["user"]["id"].as_str().unwrap_or_default();
    let trigger_id = payload["trigger_id"].as_str().unwrap_or_default();
    let view_id = payload["view"]["id"].as_str().unwrap_or_default();

    match action {
        Action::Run(tree_id) => run_tree(state, payload, tree_id, user_id).await?,
        Action::Navigate(option_id) => navigate(state, payload, option_id).await?,

        Action::CreateTree => {
            state
                .chat
                .open_modal(trigger_id, views::create_tree_modal())
                .await?;
        }
        Action::EditTree(tree_id) => {
            let view = tree_editor_view(state, tree_id).await?;
            state.chat.open_modal(trigger_id, view).await?;
        }
        Action::RenameTree(tree_id) => {
            let tree = TreeRepo::find_by_id(&state.pool, tree_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Tree",
                    id: tree_id,
                })?;
            state
                .chat
                .push_modal(trigger_id, views::tree_info_modal(&tree))
                .await?;
        }
        Action::BrowserLink(tree_id) => issue_edit_link(state, tree_id, user_id).await?,

        Action::AddNode(tree_id) => {
            state
                .chat
                .push_modal(trigger_id, views::node_form_modal(tree_id, None))
                .await?;
        }
        Action::EditNode(node_id) => {
            let node = find_node(state, node_id).await?;
            state
                .chat
                .push_modal(trigger_id, views::node_form_modal(node.tree_id, Some(&node)))
                .await?;
        }
        Action::DeleteNode(node_id) => {
            // Any view showing the deleted node falls back to the owning
            // tree's editor, never to a stale node view.
            let ctx = authoring::delete_node(&state.pool, None, node_id).await?;
            let view = tree_editor_view(state, ctx.tree_id).await?;
            state.chat.update_modal(view_id, view).await?;
        }
        Action::OpenNode(node_id) => {
            let view = node_editor_view(state, node_id).await?;
            state.chat.push_modal(trigger_id, view).await?;
        }
        Action::AddOption(node_id) => {
            let node = find_node(state, node_id).await?;
            let tree_nodes = NodeRepo::list_by_tree(&state.pool, node.tree_id).await?;
            state
                .chat
                .push_modal(trigger_id, views::option_form_modal(&node, &tree_nodes, None))
                .await?;
        }
        Action::EditOption(option_id) => {
            let option = NodeOptionRepo::find_by_id(&state.pool, option_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Option",
                    id: option_id,
                })?;
            let node = find_node(state, option.node_id).await?;
            let tree_nodes = NodeRepo::list_by_tree(&state.pool, node.tree_id).await?;
            state
                .chat
                .push_modal(
                    trigger_id,
                    views::option_form_modal(&node, &tree_nodes, Some(&option)),
                )
                .await?;
        }
        Action::DeleteOption(option_id) => {
            let ctx = authoring::delete_option(&state.pool, None, option_id).await?;
            let node_id = ctx.node_id.expect("option commands carry a node context");
            let view = node_editor_view(state, node_id).await?;
            state.chat.update_modal(view_id, view).await?;
        }
    }

    Ok(().into_response())
}

/// Direct "run" trigger: post the root view as a new message.
///
/// A tree with no well-defined root posts a warning instead of a view; the
/// engine never guesses an entry node.
async fn run_tree(
    state: &AppState,
    payload: &Value,
    tree_id: DbId,
    user_id: &str,
) -> AppResult<()> {
    // Home-tab clicks have no channel; deliver to the user's DM instead.
    let channel = match payload["channel"]["id"].as_str() {
        Some(c) => c.to_string(),
        None => state.chat.open_dm(user_id).await?,
    };

    match navigator::start(&state.pool, tree_id).await {
        Ok(view) => {
            state
                .chat
                .post_message(
                    &channel,
                    &views::navigation_text(&view),
                    views::navigation_blocks(&view),
                )
                .await?;
            Ok(())
        }
        Err(NavError::Root(reason)) => {
            state
                .chat
                .post_message(&channel, &views::not_runnable_text(reason), Value::Array(vec![]))
                .await?;
            Ok(())
        }
        Err(err) => Err(nav_to_app(err)),
    }
}

/// Follow a chosen option, updating the originating message in place.
async fn navigate(state: &AppState, payload: &Value, option_id: DbId) -> AppResult<()> {
    let channel = payload["channel"]["id"].as_str().unwrap_or_default();
    let ts = payload["message"]["ts"].as_str().unwrap_or_default();
    if channel.is_empty() || ts.is_empty() {
        return Err(AppError::BadRequest(
            "navigation action outside a message context".into(),
        ));
    }

    match navigator::advance(&state.pool, option_id).await {
        // Unset target: deliberate no-op, the message stays as it is.
        Ok(None) => Ok(()),
        Ok(Some(view)) => {
            state
                .chat
                .update_message(
                    channel,
                    ts,
                    &views::navigation_text(&view),
                    views::navigation_blocks(&view),
                )
                .await?;
            Ok(())
        }
        // The option or its target raced a delete; say so in place.
        Err(NavError::OptionNotFound(_)) | Err(NavError::NodeMissing(_)) => {
            state
                .chat
                .update_message(
                    channel,
                    ts,
                    "This path no longer exists. The tree was edited.",
                    Value::Array(vec![]),
                )
                .await?;
            Ok(())
        }
        Err(err) => Err(nav_to_app(err)),
    }
}

/// Generate a browser edit link and DM it to the requesting user.
async fn issue_edit_link(state: &AppState, tree_id: DbId, user_id: &str) -> AppResult<()> {
    TreeRepo::find_by_id(&state.pool, tree_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Tree",
            id: tree_id,
        })?;

    let token = guidetree_core::token::generate_edit_token();
    let expires_at = guidetree_core::token::expiry_from(Utc::now());
    EditTokenRepo::create(&state.pool, &token, tree_id, user_id, expires_at).await?;

    let url = format!("{}/editor/{token}", state.config.editor_base_url);
    state
        .chat
        .post_dm(
            user_id,
            &format!("Edit this tree in your browser (link valid for 1 hour): {url}"),
        )
        .await?;
    tracing::info!(tree_id, user_id, "Issued browser edit link");
    Ok(())
}

// ---------------------------------------------------------------------------
// View submissions
// ---------------------------------------------------------------------------

async fn handle_view_submission(state: &AppState, payload: &Value) -> AppResult<Response> {
    let callback_id = payload["view"]["callback_id"].as_str().unwrap_or_default();
    let user_id = payload["user"]["id"].as_str().unwrap_or_default();
    let metadata = payload["view"]["private_metadata"].as_str().unwrap_or_default();

    let result = apply_submission(state, payload, callback_id, user_id, metadata).await;

    match result {
        Ok(Some(next_view)) => {
            // Pull-based consistency: replace the submitted modal with the
            // freshly re-rendered parent view.
            Ok(Json(json!({ "response_action": "update", "view": next_view })).into_response())
        }
        Ok(None) => Ok(().into_response()),
        // Validation problems render inline on the offending input instead
        // of failing the request; the command had no effect.
        Err(AppError::Core(CoreError::Validation(msg))) => {
            let block = error_block_for(callback_id);
            Ok(Json(json!({
                "response_action": "errors",
                "errors": { (block): msg },
            }))
            .into_response())
        }
        Err(err) => Err(err),
    }
}

/// Run the authoring command for a submitted modal. Returns the view to
/// re-render, or `None` when the modal stack should simply close.
async fn apply_submission(
    state: &AppState,
    payload: &Value,
    callback_id: &str,
    user_id: &str,
    metadata: &str,
) -> AppResult<Option<Value>> {
    if callback_id == "create_tree" {
        let name = input_value(payload, "name").unwrap_or_default();
        let description = input_value(payload, "description").filter(|s| !s.is_empty());
        authoring::create_tree(&state.pool, &name, description, user_id).await?;
        publish_home(state, user_id).await?;
        return Ok(None);
    }

    if callback_id == "workflow_config" {
        let edit_id = metadata;
        let tree = select_value(payload, "tree")
            .ok_or_else(|| AppError::BadRequest("no tree selected".into()))?;
        let channel = input_value(payload, "channel").unwrap_or_default();
        state
            .chat
            .update_workflow_step(
                edit_id,
                json!({
                    "tree": { "value": tree },
                    "channel": { "value": channel },
                }),
            )
            .await?;
        return Ok(None);
    }

    let ctx = EditContext::decode(metadata)
        .ok_or_else(|| AppError::BadRequest("modal carries no edit context".into()))?;

    if callback_id == "submit_tree_info" {
        let name = input_value(payload, "name").unwrap_or_default();
        let description = input_value(payload, "description").filter(|s| !s.is_empty());
        authoring::update_tree_info(&state.pool, ctx.tree_id, &name, description).await?;
        return Ok(Some(tree_editor_view(state, ctx.tree_id).await?));
    }

    if let Some(target) = callback_id.strip_prefix("submit_node:") {
        let node_type = select_value(payload, "node_type").unwrap_or_default();
        let title = input_value(payload, "title").unwrap_or_default();
        let content = input_value(payload, "content").filter(|s| !s.is_empty());

        let next = if target == "new" {
            authoring::create_node(&state.pool, ctx.tree_id, &node_type, &title, content)
                .await?
                .1
        } else {
            let node_id: DbId = target
                .parse()
                .map_err(|_| AppError::BadRequest("bad node id in callback".into()))?;
            authoring::update_node(&state.pool, None, node_id, &node_type, &title, content)
                .await?
                .1
        };
        return Ok(Some(tree_editor_view(state, next.tree_id).await?));
    }

    if let Some(target) = callback_id.strip_prefix("submit_option:") {
        let label = input_value(payload, "label").unwrap_or_default();
        let next_node_id = select_value(payload, "next_node")
            .filter(|v| v != "none")
            .and_then(|v| v.parse::<DbId>().ok());

        let next = if target == "new" {
            let node_id = ctx
                .node_id
                .ok_or_else(|| AppError::BadRequest("option modal without node context".into()))?;
            authoring::create_option(&state.pool, None, node_id, &label, next_node_id)
                .await?
                .1
        } else {
            let option_id: DbId = target
                .parse()
                .map_err(|_| AppError::BadRequest("bad option id in callback".into()))?;
            authoring::update_option(&state.pool, None, option_id, &label, next_node_id)
                .await?
                .1
        };
        let node_id = next.node_id.expect("option commands carry a node context");
        return Ok(Some(node_editor_view(state, node_id).await?));
    }

    tracing::debug!(callback_id, "Ignoring unrecognized submission");
    Ok(None)
}

/// Read a text input from submitted view state. Every input element uses
/// the `value` action id, so state is addressed by block id alone.
fn input_value(payload: &Value, block_id: &str) -> Option<String> {
    payload["view"]["state"]["values"][block_id]["value"]["value"]
        .as_str()
        .map(|s| s.trim().to_string())
}

/// Read a static-select choice from submitted view state.
fn select_value(payload: &Value, block_id: &str) -> Option<String> {
    payload["view"]["state"]["values"][block_id]["value"]["selected_option"]["value"]
        .as_str()
        .map(|s| s.to_string())
}

/// Which input block a validation error attaches to, per modal type.
fn error_block_for(callback_id: &str) -> &'static str {
    if callback_id.starts_with("submit_node") {
        "title"
    } else if callback_id.starts_with("submit_option") {
        "label"
    } else {
        "name"
    }
}

// ---------------------------------------------------------------------------
// Workflow step configuration
// ---------------------------------------------------------------------------

async fn handle_workflow_edit(state: &AppState, payload: &Value) -> AppResult<Response> {
    let trigger_id = payload["trigger_id"].as_str().unwrap_or_default();
    let edit_id = payload["workflow_step"]["workflow_step_edit_id"]
        .as_str()
        .unwrap_or_default();

    let trees = TreeRepo::list_all(&state.pool).await?;
    let tree_options: Vec<(String, String)> = trees
        .iter()
        .map(|t| (t.name.clone(), t.id.to_string()))
        .collect();
    let refs: Vec<(&str, &str)> = tree_options
        .iter()
        .map(|(l, v)| (l.as_str(), v.as_str()))
        .collect();

    let view = views::workflow_config_modal(&refs, edit_id);
    state.chat.open_modal(trigger_id, view).await?;
    Ok(().into_response())
}

// ---------------------------------------------------------------------------
// Shared view refreshes
// ---------------------------------------------------------------------------

async fn publish_home(state: &AppState, user_id: &str) -> AppResult<()> {
    let trees = TreeRepo::list_all(&state.pool).await?;
    state
        .chat
        .publish_home(user_id, views::home_view(&trees))
        .await?;
    Ok(())
}

async fn tree_editor_view(state: &AppState, tree_id: DbId) -> AppResult<Value> {
    let tree = TreeRepo::find_by_id(&state.pool, tree_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Tree",
            id: tree_id,
        })?;
    let nodes = NodeRepo::list_by_tree(&state.pool, tree_id).await?;
    Ok(views::tree_editor_modal(&tree, &nodes))
}

async fn node_editor_view(state: &AppState, node_id: DbId) -> AppResult<Value> {
    let node = find_node(state, node_id).await?;
    let options = NodeOptionRepo::list_by_node(&state.pool, node_id).await?;
    let tree_nodes = NodeRepo::list_by_tree(&state.pool, node.tree_id).await?;
    Ok(views::node_editor_modal(&node, &options, &tree_nodes))
}

async fn find_node(state: &AppState, node_id: DbId) -> AppResult<Node> {
    NodeRepo::find_by_id(&state.pool, node_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Node",
                id: node_id,
            })
        })
}

/// Fold navigation failures into the HTTP error taxonomy for the cases the
/// chat surface does not translate into user-facing copy itself.
fn nav_to_app(err: NavError) -> AppError {
    match err {
        NavError::Db(e) => AppError::Database(e),
        NavError::TreeNotFound(id) => AppError::Core(CoreError::NotFound {
            entity: "Tree",
            id,
        }),
        NavError::OptionNotFound(id) => AppError::Core(CoreError::NotFound {
            entity: "Option",
            id,
        }),
        NavError::NodeMissing(id) => AppError::Core(CoreError::NotFound {
            entity: "Node",
            id,
        }),
        other => AppError::InternalError(other.to_string()),
    }
}
