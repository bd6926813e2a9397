//! Shared fakes and wiring for the application test suites.
#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use auron_application::ports::{
    ConversationCipher, HttpRequest, HttpResponse, HttpTransport, IdentityProvider, KeyValueStore,
    Navigator, TransportError,
};
use auron_application::{AccessTokenResolver, AuthSession, AuthenticatedClient, TokenStore};
use auron_domain::{
    AccessToken, ApiConfig, AuthError, CryptoError, FirstScreen, IdTokenClaims, IdentityConfig,
    NONCE_LEN,
};
use tokio::sync::{Notify, RwLock};
use url::Url;

/// In-memory key-value backend.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }
}

/// One scripted provider answer.
#[derive(Debug, Clone)]
pub enum TokenScript {
    /// Return this token.
    Token(&'static str),
    /// Return an empty token string.
    Empty,
    /// Fail with a provider error.
    Fail,
    /// Never resolve (caller hangs until cancelled).
    Hang,
}

/// Scriptable identity provider fake.
pub struct FakeProvider {
    script: Mutex<VecDeque<TokenScript>>,
    fallback: TokenScript,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    sign_outs: AtomicUsize,
    fail_sign_out: bool,
}

impl FakeProvider {
    /// Provider that always yields `token`.
    pub fn returning(token: &'static str) -> Self {
        Self::scripted(Vec::new(), TokenScript::Token(token))
    }

    /// Provider that always fails.
    pub fn failing() -> Self {
        Self::scripted(Vec::new(), TokenScript::Fail)
    }

    /// Provider that plays `script` in order, then repeats `fallback`.
    pub fn scripted(script: Vec<TokenScript>, fallback: TokenScript) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            gate: None,
            calls: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
            fail_sign_out: false,
        }
    }

    /// Blocks each token call until the gate is notified.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Makes provider sign-out fail.
    #[must_use]
    pub fn with_failing_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    /// Number of token requests the provider has served.
    pub fn token_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of sign-out calls.
    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    fn next_script(&self) -> TokenScript {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn is_authenticated(&self) -> bool {
        true
    }

    async fn sign_in(&self, _redirect_uri: &Url, _first_screen: FirstScreen) -> Result<(), AuthError> {
        Ok(())
    }

    async fn sign_out(&self, _post_sign_out_uri: &Url) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            Err(AuthError::Provider("provider unreachable".to_string()))
        } else {
            Ok(())
        }
    }

    async fn access_token(&self, _resource: &str) -> Result<AccessToken, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.next_script() {
            TokenScript::Token(token) => Ok(AccessToken::new(token)),
            TokenScript::Empty => Ok(AccessToken::new("")),
            TokenScript::Fail => Err(AuthError::Provider("token endpoint failed".to_string())),
            TokenScript::Hang => std::future::pending().await,
        }
    }

    async fn id_token_claims(&self) -> Result<IdTokenClaims, AuthError> {
        Ok(IdTokenClaims {
            sub: "u1".to_string(),
            name: Some("Ada".to_string()),
            username: None,
            email: Some("ada@example.com".to_string()),
            picture: None,
        })
    }

    async fn handle_sign_in_callback(&self, _current_url: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Navigation recorder.
#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<Url> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &Url) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
    }
}

/// Transport fake that records requests and replays scripted responses.
#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and body.
    pub fn push(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(response(status, body)));
    }

    /// Queues a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The value of `header` on request `index`, if present.
    pub fn header(&self, index: usize, header: &str) -> Option<String> {
        self.requests().get(index).and_then(|request| {
            request
                .headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(header))
                .map(|(_, value)| value.clone())
        })
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(response(200, "")))
    }
}

/// Builds an HTTP response value.
pub fn response(status: u16, body: impl Into<Vec<u8>>) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: body.into(),
    }
}

/// Cipher fake: a fixed zero nonce followed by plaintext JSON.
pub struct PlainCipher;

impl ConversationCipher for PlainCipher {
    fn seal(&self, value: &serde_json::Value) -> Result<Vec<u8>, CryptoError> {
        let mut packed = vec![0u8; NONCE_LEN];
        packed.extend_from_slice(
            &serde_json::to_vec(value)
                .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?,
        );
        Ok(packed)
    }

    fn open(&self, buffer: &[u8]) -> Result<serde_json::Value, CryptoError> {
        if buffer.len() < NONCE_LEN {
            return Err(CryptoError::MalformedEnvelope {
                actual: buffer.len(),
            });
        }
        serde_json::from_slice(&buffer[NONCE_LEN..])
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

pub const RESOURCE: &str = "https://api.example.com";

pub fn identity_config() -> IdentityConfig {
    IdentityConfig {
        endpoint: Url::parse("https://auth.example.com/").unwrap(),
        app_id: "app123".to_string(),
        resources: vec![RESOURCE.to_string()],
        scopes: vec!["read:conversations".to_string()],
        redirect_uri: Url::parse("https://app.example.com/callback.html").unwrap(),
        post_sign_out_uri: Url::parse("https://app.example.com/").unwrap(),
    }
}

pub fn api_config() -> ApiConfig {
    ApiConfig {
        dialogue_base: Url::parse("https://api.example.com/").unwrap(),
        bff_base: Url::parse("https://bff.example.com/").unwrap(),
    }
}

/// Fully wired client stack over fakes.
pub struct Harness {
    pub provider: Arc<FakeProvider>,
    pub transport: Arc<FakeTransport>,
    pub navigator: Arc<RecordingNavigator>,
    pub backend: Arc<MemoryStore>,
    pub store: TokenStore,
    pub resolver: Arc<AccessTokenResolver>,
    pub session: Arc<AuthSession>,
    pub client: Arc<AuthenticatedClient>,
}

pub fn harness(provider: FakeProvider) -> Harness {
    let provider = Arc::new(provider);
    let transport = Arc::new(FakeTransport::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let backend = Arc::new(MemoryStore::default());
    let store = TokenStore::new(backend.clone());

    let resolver = Arc::new(AccessTokenResolver::new(
        provider.clone(),
        store.clone(),
        RESOURCE,
    ));
    let session = Arc::new(AuthSession::new(
        provider.clone(),
        store.clone(),
        navigator.clone(),
        identity_config(),
    ));
    let client = Arc::new(AuthenticatedClient::new(
        transport.clone(),
        resolver.clone(),
        session.clone(),
    ));

    Harness {
        provider,
        transport,
        navigator,
        backend,
        store,
        resolver,
        session,
        client,
    }
}
