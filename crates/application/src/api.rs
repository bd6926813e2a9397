//! Typed client for the dialogue backend.
//!
//! JSON-over-HTTPS endpoints behind bearer auth: chat messaging, session
//! persistence, conversation listing, profile retrieval, and signed-URL
//! issuance for CDN-hosted conversation blobs. 401 and 503 recovery lives
//! in [`AuthenticatedClient`]; everything else non-2xx surfaces as an
//! error carrying the status.

use std::sync::Arc;

use auron_domain::{
    ApiConfig, ChatReply, ChatRequest, SaveSessionReceipt, SignedConversationUrl,
};
use serde::Serialize;

use crate::error::{ApplicationError, ApplicationResult};
use crate::fetch::AuthenticatedClient;
use crate::ports::{HttpRequest, HttpResponse, HttpTransport};

#[derive(Serialize)]
struct SaveSessionRequest<'a> {
    session_id: &'a str,
}

#[derive(Serialize)]
struct SignedUrlRequest<'a> {
    storage_key: &'a str,
}

/// Client for the dialogue backend API.
pub struct DialogueApi {
    http: Arc<AuthenticatedClient>,
    transport: Arc<dyn HttpTransport>,
    config: ApiConfig,
}

impl DialogueApi {
    /// Creates an API client.
    ///
    /// The bare `transport` is used for signed-URL fetches, which carry
    /// their own auth and must not get a bearer header.
    #[must_use]
    pub fn new(
        http: Arc<AuthenticatedClient>,
        transport: Arc<dyn HttpTransport>,
        config: ApiConfig,
    ) -> Self {
        Self {
            http,
            transport,
            config,
        }
    }

    /// Sends a chat message, continuing `session_id` when given.
    ///
    /// # Errors
    ///
    /// Fails when unauthenticated, on transport failure, or on a
    /// non-success response.
    pub async fn send_message(
        &self,
        message: &str,
        session_id: Option<String>,
    ) -> ApplicationResult<ChatReply> {
        let url = self.config.dialogue_url("chat")?;
        let response = self
            .http
            .post_json(url.as_str(), &ChatRequest::new(message, session_id))
            .await?;
        expect_success("chat", &response)?;
        Ok(response.json()?)
    }

    /// Persists a session on the backend, triggering pattern extraction.
    ///
    /// # Errors
    ///
    /// Fails when unauthenticated, on transport failure, or on a
    /// non-success response.
    pub async fn save_session(&self, session_id: &str) -> ApplicationResult<SaveSessionReceipt> {
        let url = self.config.dialogue_url("save-session")?;
        let response = self
            .http
            .post_json(url.as_str(), &SaveSessionRequest { session_id })
            .await?;
        expect_success("save-session", &response)?;
        Ok(response.json()?)
    }

    /// Lists the user's conversations as the backend reports them.
    ///
    /// # Errors
    ///
    /// Fails when unauthenticated, on transport failure, or on a
    /// non-success response.
    pub async fn conversations(&self) -> ApplicationResult<serde_json::Value> {
        let url = self.config.dialogue_url("conversations")?;
        let response = self.http.get(url.as_str()).await?;
        expect_success("conversations", &response)?;
        Ok(response.json()?)
    }

    /// Requests a signed CDN URL for a conversation blob.
    ///
    /// # Errors
    ///
    /// Fails when unauthenticated, on transport failure, or on a
    /// non-success response.
    pub async fn conversation_url(&self, storage_key: &str) -> ApplicationResult<String> {
        let url = self.config.dialogue_url("get-conversation-url")?;
        let response = self
            .http
            .post_json(url.as_str(), &SignedUrlRequest { storage_key })
            .await?;
        expect_success("get-conversation-url", &response)?;
        let signed: SignedConversationUrl = response.json()?;
        Ok(signed.signed_url)
    }

    /// Fetches a conversation blob through its signed URL.
    ///
    /// The signed URL authenticates itself; no bearer token is attached.
    ///
    /// # Errors
    ///
    /// Fails on transport failure or a non-success response.
    pub async fn fetch_conversation(
        &self,
        signed_url: &str,
    ) -> ApplicationResult<serde_json::Value> {
        let response = self.transport.send(HttpRequest::get(signed_url)).await?;
        expect_success("conversation blob", &response)?;
        Ok(response.json()?)
    }

    /// Retrieves the user's analysis profile.
    ///
    /// The payload shape is owned by the dashboard; it is passed through
    /// as raw JSON.
    ///
    /// # Errors
    ///
    /// Fails when unauthenticated, on transport failure, or on a
    /// non-success response.
    pub async fn profile(&self) -> ApplicationResult<serde_json::Value> {
        let url = self.config.dialogue_url("profile")?;
        let response = self.http.get(url.as_str()).await?;
        expect_success("profile", &response)?;
        Ok(response.json()?)
    }
}

fn expect_success(endpoint: &'static str, response: &HttpResponse) -> ApplicationResult<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ApplicationError::Api {
            endpoint,
            status: response.status,
        })
    }
}
