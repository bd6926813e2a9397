//! Authenticated fetch with automatic 401 recovery.
//!
//! Safety net for token expiration during requests: every call carries a
//! bearer token, and a 401 triggers exactly one forced refresh plus one
//! retry. A failed refresh means the session is truly expired; the client
//! signs out and hands the original 401 back so status-checking call
//! sites keep working.

use std::sync::Arc;
use std::time::Duration;

use auron_domain::AuthError;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{AccessTokenResolver, AuthSession};
use crate::error::ApplicationResult;
use crate::ports::{HttpRequest, HttpResponse, HttpTransport};

/// Delay before retrying a 503 from the backend.
const SERVICE_RETRY_DELAY: Duration = Duration::from_secs(2);

/// HTTP client wrapper that injects bearer tokens and performs one-shot
/// 401 recovery.
///
/// Issues at most two network requests per logical call: the original and
/// a single retry.
pub struct AuthenticatedClient {
    transport: Arc<dyn HttpTransport>,
    resolver: Arc<AccessTokenResolver>,
    session: Arc<AuthSession>,
}

impl AuthenticatedClient {
    /// Creates an authenticated client over the given transport.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        resolver: Arc<AccessTokenResolver>,
        session: Arc<AuthSession>,
    ) -> Self {
        Self {
            transport,
            resolver,
            session,
        }
    }

    /// Sends a request with a bearer token attached.
    ///
    /// Caller-supplied headers are preserved; the `Authorization` header
    /// is owned by this client. The response is returned as data even
    /// when its status is a failure.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] when no token is obtainable
    /// (no network call is made), or a transport error when no response
    /// was produced.
    pub async fn execute(&self, request: HttpRequest) -> ApplicationResult<HttpResponse> {
        let Some(token) = self.resolver.token().await else {
            warn!("no auth token available");
            return Err(AuthError::Unauthenticated.into());
        };

        let authed = request
            .clone()
            .with_authorization(token.authorization_header());
        let response = self.transport.send(authed).await?;

        match response.status {
            401 => self.recover_unauthorized(request, response).await,
            503 => self.retry_unavailable(request, response).await,
            _ => Ok(response),
        }
    }

    /// Convenience GET.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::execute`].
    pub async fn get(&self, url: impl Into<String> + Send) -> ApplicationResult<HttpResponse> {
        self.execute(HttpRequest::get(url)).await
    }

    /// Convenience POST with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::execute`]; additionally fails if the
    /// body cannot be serialized.
    pub async fn post_json<T: Serialize + Sync>(
        &self,
        url: impl Into<String> + Send,
        body: &T,
    ) -> ApplicationResult<HttpResponse> {
        self.execute(HttpRequest::post(url).json(body)?).await
    }

    /// 401 handling: one forced refresh, then either a single retry or a
    /// sign-out with the original response returned.
    async fn recover_unauthorized(
        &self,
        request: HttpRequest,
        original: HttpResponse,
    ) -> ApplicationResult<HttpResponse> {
        debug!(url = %request.url, "401 received, attempting token refresh");

        match self.resolver.force_refresh().await {
            Some(fresh) => {
                debug!("retrying request with fresh token");
                let retried = request.with_authorization(fresh.authorization_header());
                // The second response is returned verbatim, failure or not.
                Ok(self.transport.send(retried).await?)
            }
            None => {
                warn!("token refresh failed, session truly expired");
                self.session.sign_out().await;
                Ok(original)
            }
        }
    }

    /// 503 handling: the auth service is temporarily unavailable; wait
    /// and retry once with a freshly resolved token.
    async fn retry_unavailable(
        &self,
        request: HttpRequest,
        original: HttpResponse,
    ) -> ApplicationResult<HttpResponse> {
        debug!(url = %request.url, "503 received, retrying shortly");
        tokio::time::sleep(SERVICE_RETRY_DELAY).await;

        match self.resolver.token().await {
            Some(token) => {
                let retried = request.with_authorization(token.authorization_header());
                Ok(self.transport.send(retried).await?)
            }
            None => Ok(original),
        }
    }
}
