//! Logto OIDC identity-provider adapter.
//!
//! Implements the `IdentityProvider` port against a hosted Logto endpoint:
//! authorization-code-with-PKCE sign-in, callback code exchange,
//! refresh-token grants with resource indicators for access tokens, and
//! the end-session redirect for sign-out.
//!
//! Session state (refresh token, ID token, in-flight PKCE session) is
//! persisted through the key-value port under `logto:{app_id}:*` keys, so
//! the token store's provider-key sweep removes it on sign-out.

use std::sync::Arc;

use async_trait::async_trait;
use auron_application::ports::{IdentityProvider, KeyValueStore, Navigator};
use auron_domain::{AccessToken, AuthError, FirstScreen, IdTokenClaims, IdentityConfig};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const AUTHORIZE_PATH: &str = "oidc/auth";
const TOKEN_PATH: &str = "oidc/token";
const END_SESSION_PATH: &str = "oidc/session/end";

/// Scopes requested for every session in addition to the configured ones.
/// `offline_access` is what makes refresh-token grants possible.
const BASE_SCOPES: [&str; 2] = ["openid", "offline_access"];

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

/// Token endpoint error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// In-flight sign-in state persisted between redirect and callback.
#[derive(Debug, Serialize, Deserialize)]
struct SignInSession {
    state: String,
    code_verifier: String,
    redirect_uri: String,
}

/// Identity provider adapter for Logto.
pub struct LogtoProvider {
    config: IdentityConfig,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    http: Client,
}

impl LogtoProvider {
    /// Creates a provider adapter.
    #[must_use]
    pub fn new(
        config: IdentityConfig,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            storage,
            navigator,
            http: Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn key(&self, suffix: &str) -> String {
        format!("logto:{}:{suffix}", self.config.app_id)
    }

    fn refresh_token_key(&self) -> String {
        self.key("refreshToken")
    }

    fn id_token_key(&self) -> String {
        self.key("idToken")
    }

    fn sign_in_session_key(&self) -> String {
        self.key("signInSession")
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, AuthError> {
        self.config
            .endpoint
            .join(path)
            .map_err(|e| AuthError::Provider(format!("invalid endpoint path {path}: {e}")))
    }

    fn build_authorize_url(
        &self,
        session: &SignInSession,
        first_screen: FirstScreen,
    ) -> Result<Url, AuthError> {
        let mut url = self.endpoint_url(AUTHORIZE_PATH)?;
        let scope = BASE_SCOPES
            .iter()
            .map(ToString::to_string)
            .chain(self.config.scopes.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.app_id)
                .append_pair("redirect_uri", &session.redirect_uri)
                .append_pair("response_type", "code")
                .append_pair("scope", &scope)
                .append_pair("state", &session.state)
                .append_pair("code_challenge", &pkce_challenge(&session.code_verifier))
                .append_pair("code_challenge_method", "S256")
                .append_pair("prompt", "consent");

            for resource in &self.config.resources {
                query.append_pair("resource", resource);
            }

            if let Some(screen) = first_screen.as_param() {
                query.append_pair("first_screen", screen);
            }
        }

        Ok(url)
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let url = self.endpoint_url(TOKEN_PATH)?;
        let body = serde_urlencoded::to_string(params)
            .map_err(|e| AuthError::Provider(format!("failed to encode form: {e}")))?;

        let response = self
            .http
            .post(url)
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error) = serde_json::from_str::<TokenErrorResponse>(&error_text) {
                // invalid_grant means the refresh token itself is dead.
                if error.error == "invalid_grant" {
                    return Err(AuthError::SessionExpired);
                }
                return Err(AuthError::Provider(
                    error.error_description.unwrap_or(error.error),
                ));
            }
            return Err(AuthError::Provider(format!(
                "token request failed: {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("failed to parse token response: {e}")))
    }

    /// Persists rotated session tokens from a token endpoint response.
    async fn store_session_tokens(&self, response: &TokenResponse) {
        if let Some(refresh_token) = &response.refresh_token {
            self.storage
                .set(&self.refresh_token_key(), refresh_token)
                .await;
        }
        if let Some(id_token) = &response.id_token {
            self.storage.set(&self.id_token_key(), id_token).await;
        }
    }
}

#[async_trait]
impl IdentityProvider for LogtoProvider {
    async fn is_authenticated(&self) -> bool {
        self.storage.get(&self.refresh_token_key()).await.is_some()
            || self.storage.get(&self.id_token_key()).await.is_some()
    }

    async fn sign_in(
        &self,
        redirect_uri: &Url,
        first_screen: FirstScreen,
    ) -> Result<(), AuthError> {
        let session = SignInSession {
            state: Uuid::new_v4().simple().to_string(),
            code_verifier: pkce_verifier(),
            redirect_uri: redirect_uri.to_string(),
        };
        let raw = serde_json::to_string(&session)
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        self.storage.set(&self.sign_in_session_key(), &raw).await;

        let url = self.build_authorize_url(&session, first_screen)?;
        debug!("redirecting to hosted sign-in");
        self.navigator.navigate(&url);
        Ok(())
    }

    async fn sign_out(&self, post_sign_out_uri: &Url) -> Result<(), AuthError> {
        self.storage.remove(&self.refresh_token_key()).await;
        self.storage.remove(&self.id_token_key()).await;
        self.storage.remove(&self.sign_in_session_key()).await;

        let mut url = self.endpoint_url(END_SESSION_PATH)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.app_id)
            .append_pair("post_logout_redirect_uri", post_sign_out_uri.as_str());

        debug!("redirecting to provider end-session");
        self.navigator.navigate(&url);
        Ok(())
    }

    async fn access_token(&self, resource: &str) -> Result<AccessToken, AuthError> {
        let refresh_token = self
            .storage
            .get(&self.refresh_token_key())
            .await
            .ok_or(AuthError::Unauthenticated)?;

        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.config.app_id.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];
        if !resource.is_empty() {
            params.push(("resource", resource));
        }

        let response = self.token_request(&params).await?;
        // Logto rotates refresh tokens; keep the newest one.
        self.store_session_tokens(&response).await;

        Ok(AccessToken::new(response.access_token))
    }

    async fn id_token_claims(&self) -> Result<IdTokenClaims, AuthError> {
        let id_token = self
            .storage
            .get(&self.id_token_key())
            .await
            .ok_or(AuthError::Unauthenticated)?;
        decode_claims(&id_token)
    }

    async fn handle_sign_in_callback(&self, current_url: &str) -> Result<(), AuthError> {
        let url = Url::parse(current_url)
            .map_err(|e| AuthError::Provider(format!("invalid callback URL: {e}")))?;

        let mut code = None;
        let mut state = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => {
                    return Err(AuthError::Provider(format!("sign-in rejected: {value}")));
                }
                _ => {}
            }
        }
        let code = code.ok_or_else(|| {
            AuthError::Provider("callback is missing the authorization code".to_string())
        })?;

        let raw = self
            .storage
            .get(&self.sign_in_session_key())
            .await
            .ok_or_else(|| AuthError::Provider("no sign-in in progress".to_string()))?;
        let session: SignInSession = serde_json::from_str(&raw)
            .map_err(|e| AuthError::Provider(format!("unreadable sign-in session: {e}")))?;

        if state.as_deref() != Some(session.state.as_str()) {
            return Err(AuthError::Provider(
                "state mismatch in sign-in callback".to_string(),
            ));
        }

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.app_id.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", session.redirect_uri.as_str()),
            ("code_verifier", session.code_verifier.as_str()),
        ];
        let response = self.token_request(&params).await?;

        self.store_session_tokens(&response).await;
        self.storage.remove(&self.sign_in_session_key()).await;
        debug!("sign-in callback handled");
        Ok(())
    }
}

/// Generates a fresh PKCE code verifier (43 base64url chars).
fn pkce_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 code challenge for a verifier.
fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Decodes the payload segment of an ID token into claims.
///
/// The token arrives over TLS straight from the provider's token endpoint,
/// so the signature is not re-verified here.
fn decode_claims(id_token: &str) -> Result<IdTokenClaims, AuthError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::Provider("malformed ID token".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| AuthError::Provider(format!("malformed ID token payload: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::Provider(format!("unreadable ID token claims: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use tokio::sync::RwLock;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
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

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<Url>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, url: &Url) {
            self.visited
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(url.clone());
        }
    }

    fn config() -> IdentityConfig {
        IdentityConfig {
            endpoint: Url::parse("https://auth.example.com/").unwrap(),
            app_id: "app123".to_string(),
            resources: vec!["https://api.example.com".to_string()],
            scopes: vec!["read:conversations".to_string()],
            redirect_uri: Url::parse("https://app.example.com/callback.html").unwrap(),
            post_sign_out_uri: Url::parse("https://app.example.com/").unwrap(),
        }
    }

    fn provider() -> (
        LogtoProvider,
        Arc<MemoryStore>,
        Arc<RecordingNavigator>,
    ) {
        let storage = Arc::new(MemoryStore::default());
        let navigator = Arc::new(RecordingNavigator::default());
        (
            LogtoProvider::new(config(), storage.clone(), navigator.clone()),
            storage,
            navigator,
        )
    }

    fn query_map(url: &Url) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in url.query_pairs() {
            map.entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        map
    }

    #[tokio::test]
    async fn sign_in_persists_session_and_redirects() {
        let (provider, storage, navigator) = provider();

        provider
            .sign_in(&config().redirect_uri, FirstScreen::SignIn)
            .await
            .unwrap();

        let raw = storage.get("logto:app123:signInSession").await.unwrap();
        let session: SignInSession = serde_json::from_str(&raw).unwrap();

        let visited = navigator.visited.lock().unwrap();
        let url = visited.first().expect("navigated to authorize URL");
        assert_eq!(url.path(), "/oidc/auth");

        let query = query_map(url);
        assert_eq!(query["client_id"], vec!["app123"]);
        assert_eq!(query["state"], vec![session.state.clone()]);
        assert_eq!(query["code_challenge_method"], vec!["S256"]);
        assert_eq!(query["resource"], vec!["https://api.example.com"]);
        assert_eq!(
            query["scope"],
            vec!["openid offline_access read:conversations"]
        );
        assert!(!query.contains_key("first_screen"));
    }

    #[tokio::test]
    async fn sign_up_requests_register_screen() {
        let (provider, _, navigator) = provider();

        provider
            .sign_in(&config().redirect_uri, FirstScreen::Register)
            .await
            .unwrap();

        let visited = navigator.visited.lock().unwrap();
        let query = query_map(visited.first().unwrap());
        assert_eq!(query["first_screen"], vec!["register"]);
    }

    #[tokio::test]
    async fn sign_out_clears_provider_state_and_redirects() {
        let (provider, storage, navigator) = provider();
        storage.set("logto:app123:refreshToken", "r1").await;
        storage.set("logto:app123:idToken", "i1").await;

        provider
            .sign_out(&config().post_sign_out_uri)
            .await
            .unwrap();

        assert!(storage.get("logto:app123:refreshToken").await.is_none());
        assert!(storage.get("logto:app123:idToken").await.is_none());

        let visited = navigator.visited.lock().unwrap();
        let url = visited.first().unwrap();
        assert_eq!(url.path(), "/oidc/session/end");
        let query = query_map(url);
        assert_eq!(
            query["post_logout_redirect_uri"],
            vec!["https://app.example.com/"]
        );
    }

    #[tokio::test]
    async fn is_authenticated_tracks_stored_session() {
        let (provider, storage, _) = provider();
        assert!(!provider.is_authenticated().await);

        storage.set("logto:app123:refreshToken", "r1").await;
        assert!(provider.is_authenticated().await);
    }

    #[tokio::test]
    async fn access_token_without_session_is_unauthenticated() {
        let (provider, _, _) = provider();
        assert_eq!(
            provider.access_token("https://api.example.com").await,
            Err(AuthError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn callback_requires_code_and_matching_state() {
        let (provider, storage, _) = provider();

        let err = provider
            .handle_sign_in_callback("https://app.example.com/callback.html?state=s1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Provider(_)));

        let session = SignInSession {
            state: "expected".to_string(),
            code_verifier: pkce_verifier(),
            redirect_uri: "https://app.example.com/callback.html".to_string(),
        };
        storage
            .set(
                "logto:app123:signInSession",
                &serde_json::to_string(&session).unwrap(),
            )
            .await;

        let err = provider
            .handle_sign_in_callback(
                "https://app.example.com/callback.html?code=c1&state=other",
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::Provider("state mismatch in sign-in callback".to_string())
        );
    }

    #[tokio::test]
    async fn callback_surfaces_provider_error_parameter() {
        let (provider, _, _) = provider();
        let err = provider
            .handle_sign_in_callback(
                "https://app.example.com/callback.html?error=access_denied",
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::Provider("sign-in rejected: access_denied".to_string())
        );
    }

    #[test]
    fn pkce_verifier_and_challenge_shapes() {
        let verifier = pkce_verifier();
        assert_eq!(verifier.len(), 43);
        assert!(!verifier.contains('='));

        let challenge = pkce_challenge(&verifier);
        assert_eq!(challenge.len(), 43);
        assert_ne!(challenge, verifier);
        assert_eq!(challenge, pkce_challenge(&verifier));
    }

    #[test]
    fn decodes_claims_from_id_token_payload() {
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({"sub": "u1", "name": "Ada", "email": "ada@example.com"})
                .to_string(),
        );
        let token = format!("header.{payload}.signature");

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.name.as_deref(), Some("Ada"));
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert_eq!(claims.username, None);
    }

    #[test]
    fn rejects_tokens_without_payload_segment() {
        assert!(decode_claims("garbage").is_err());
        assert!(decode_claims("a.!!!.c").is_err());
    }
}
