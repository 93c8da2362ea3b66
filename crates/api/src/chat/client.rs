//! Outbound chat platform client.
//!
//! The platform's transport, block kit, and modal stacking are external
//! collaborators; this module reduces them to a handful of opaque
//! operations behind a trait so handlers stay testable without a network.

use async_trait::async_trait;
use serde_json::{json, Value};

/// Failure of an outbound chat platform call.
///
/// Calls are never retried; a failure is terminal for the interaction that
/// caused it.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat API rejected the call: {0}")]
    Api(String),
}

/// The opaque view/message operations the chat platform provides.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Publish (replace) a user's app home surface.
    async fn publish_home(&self, user_id: &str, view: Value) -> Result<(), ChatError>;

    /// Open a new modal on top of whatever the user is looking at.
    async fn open_modal(&self, trigger_id: &str, view: Value) -> Result<(), ChatError>;

    /// Push a modal onto the current modal stack.
    async fn push_modal(&self, trigger_id: &str, view: Value) -> Result<(), ChatError>;

    /// Replace an already-open modal in place.
    async fn update_modal(&self, view_id: &str, view: Value) -> Result<(), ChatError>;

    /// Post a brand-new message to a channel. Returns the message timestamp
    /// handle needed for later in-place updates.
    async fn post_message(&self, channel: &str, text: &str, blocks: Value)
        -> Result<String, ChatError>;

    /// Update an existing message in place.
    async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
        blocks: Value,
    ) -> Result<(), ChatError>;

    /// Open (or reuse) a direct-message conversation with a user,
    /// returning its channel id.
    async fn open_dm(&self, user_id: &str) -> Result<String, ChatError>;

    /// Send a direct message to a user.
    async fn post_dm(&self, user_id: &str, text: &str) -> Result<(), ChatError>;

    /// Save a workflow step's configuration (selected tree + delivery
    /// channel) back to the platform.
    async fn update_workflow_step(&self, edit_id: &str, inputs: Value) -> Result<(), ChatError>;
}

/// [`ChatClient`] implementation over the platform's HTTP Web API.
pub struct HttpChatClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl HttpChatClient {
    pub fn new(api_base: String, bot_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            bot_token,
        }
    }

    /// POST a JSON payload to a Web API method and check the platform's
    /// `{"ok": bool, "error": ...}` envelope.
    async fn call(&self, method: &str, payload: Value) -> Result<Value, ChatError> {
        let url = format!("{}/{method}", self.api_base);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await?;

        let body: Value = response.json().await?;
        if body["ok"].as_bool() != Some(true) {
            let reason = body["error"].as_str().unwrap_or("unknown").to_string();
            tracing::warn!(method, %reason, "Chat API call failed");
            return Err(ChatError::Api(reason));
        }
        Ok(body)
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn publish_home(&self, user_id: &str, view: Value) -> Result<(), ChatError> {
        self.call("views.publish", json!({ "user_id": user_id, "view": view }))
            .await?;
        Ok(())
    }

    async fn open_modal(&self, trigger_id: &str, view: Value) -> Result<(), ChatError> {
        self.call("views.open", json!({ "trigger_id": trigger_id, "view": view }))
            .await?;
        Ok(())
    }

    async fn push_modal(&self, trigger_id: &str, view: Value) -> Result<(), ChatError> {
        self.call("views.push", json!({ "trigger_id": trigger_id, "view": view }))
            .await?;
        Ok(())
    }

    async fn update_modal(&self, view_id: &str, view: Value) -> Result<(), ChatError> {
        self.call("views.update", json!({ "view_id": view_id, "view": view }))
            .await?;
        Ok(())
    }

    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: Value,
    ) -> Result<String, ChatError> {
        let body = self
            .call(
                "chat.postMessage",
                json!({ "channel": channel, "text": text, "blocks": blocks }),
            )
            .await?;
        Ok(body["ts"].as_str().unwrap_or_default().to_string())
    }

    async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
        blocks: Value,
    ) -> Result<(), ChatError> {
        self.call(
            "chat.update",
            json!({ "channel": channel, "ts": ts, "text": text, "blocks": blocks }),
        )
        .await?;
        Ok(())
    }

    async fn open_dm(&self, user_id: &str) -> Result<String, ChatError> {
        let opened = self
            .call("conversations.open", json!({ "users": user_id }))
            .await?;
        opened["channel"]["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChatError::Api("conversations.open returned no channel".into()))
    }

    async fn post_dm(&self, user_id: &str, text: &str) -> Result<(), ChatError> {
        let channel = self.open_dm(user_id).await?;
        self.call(
            "chat.postMessage",
            json!({ "channel": channel, "text": text }),
        )
        .await?;
        Ok(())
    }

    async fn update_workflow_step(&self, edit_id: &str, inputs: Value) -> Result<(), ChatError> {
        self.call(
            "workflows.updateStep",
            json!({ "workflow_step_edit_id": edit_id, "inputs": inputs }),
        )
        .await?;
        Ok(())
    }
}
