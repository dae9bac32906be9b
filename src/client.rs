use std::fmt;
use std::sync::Arc;

use reqwest::{header::CONTENT_TYPE, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    endpoint::{self, Scope},
    envelope::{self, Envelope},
    error::CancelReason,
    options::ClientConfig,
    ClientBuilder, CloudflareError, RequestContext, Result,
};

/// Outgoing request body with its media type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RequestBody {
    pub(crate) bytes: Vec<u8>,
    pub(crate) content_type: &'static str,
}

impl RequestBody {
    pub(crate) fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)
            .map_err(|err| CloudflareError::Config(format!("request body could not be encoded: {err}")))?;
        Ok(Self {
            bytes,
            content_type: "application/json",
        })
    }

    pub(crate) fn javascript(script: &str) -> Self {
        Self {
            bytes: script.as_bytes().to_vec(),
            content_type: "application/javascript",
        }
    }
}

/// Status and body of one HTTP exchange, before envelope decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawResponse {
    pub(crate) status: u16,
    pub(crate) body: Vec<u8>,
}

impl RawResponse {
    pub(crate) fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone)]
/// HTTP client for the Cloudflare v4 API.
///
/// Cloning is cheap; clones share the connection pool and the immutable
/// configuration, so one client can serve concurrent calls.
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("default_account_id", &self.config.default_account_id)
            .field("headers", &"<redacted>")
            .finish()
    }
}

impl ApiClient {
    /// Starts a [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client authenticated with a global API key and account email.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cloudflare_http::ApiClient;
    ///
    /// let api = ApiClient::new("deadbeef", "test@example.org").expect("valid credentials");
    /// ```
    pub fn new(key: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(key, email).build()
    }

    /// Creates a client authenticated with a scoped API token.
    pub fn with_api_token(token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_token(token).build()
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `CLOUDFLARE_API_TOKEN`, or `CLOUDFLARE_API_KEY` together with
    ///   `CLOUDFLARE_API_EMAIL`
    /// - `CLOUDFLARE_ACCOUNT_ID` (optional default account)
    /// - `CLOUDFLARE_API_BASE_URL` (optional)
    ///
    /// **Not available on `wasm32` targets**, where environment variables
    /// do not exist.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self> {
        fn var(name: &str) -> Option<String> {
            std::env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
        }

        let mut builder = ClientBuilder::new();
        builder = match (
            var("CLOUDFLARE_API_TOKEN"),
            var("CLOUDFLARE_API_KEY"),
            var("CLOUDFLARE_API_EMAIL"),
        ) {
            (Some(token), _, _) => builder.api_token(token),
            (None, Some(key), Some(email)) => builder.api_key(key, email),
            (None, Some(_), None) => {
                return Err(CloudflareError::Config(
                    "CLOUDFLARE_API_KEY is set but CLOUDFLARE_API_EMAIL is missing".to_owned(),
                ))
            }
            (None, None, _) => {
                return Err(CloudflareError::Config(
                    "missing CLOUDFLARE_API_TOKEN or CLOUDFLARE_API_KEY environment variable"
                        .to_owned(),
                ))
            }
        };
        if let Some(account) = var("CLOUDFLARE_ACCOUNT_ID") {
            builder = builder.account(account);
        }
        if let Some(base_url) = var("CLOUDFLARE_API_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }

    pub(crate) fn from_parts(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn default_account_id(&self) -> Option<&str> {
        self.config.default_account_id.as_deref()
    }

    /// Resolves `template` against `scope` and the client defaults into a full URL.
    pub(crate) fn endpoint_url(
        &self,
        template: &str,
        scope: &Scope,
        query: &[(&str, String)],
    ) -> Result<String> {
        let path = endpoint::resolve(template, scope, self.default_account_id())?;
        Ok(endpoint::join_url(&self.config.base_url, &path, query))
    }

    /// Performs exactly one HTTP exchange.
    ///
    /// An already-cancelled context fails before the transport is touched;
    /// cancellation during the exchange drops the in-flight request.
    pub(crate) async fn dispatch(
        &self,
        ctx: &RequestContext,
        method: Method,
        url: &str,
        body: Option<RequestBody>,
    ) -> Result<RawResponse> {
        if ctx.is_cancelled() {
            return Err(CloudflareError::Cancelled(CancelReason::Cancelled));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(%method, url, "dispatching api request");

        let mut request = self
            .http
            .request(method, url)
            .headers(self.config.headers.clone());
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, body.content_type)
                .body(body.bytes);
        }
        let deadline = ctx.timeout();
        if let Some(timeout) = deadline {
            request = request.timeout(timeout);
        }

        let exchange = async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(RawResponse {
                status,
                body: body.to_vec(),
            })
        };

        let response = tokio::select! {
            biased;
            () = ctx.token().cancelled() => {
                return Err(CloudflareError::Cancelled(CancelReason::Cancelled));
            }
            result = exchange => result.map_err(|err| transport_error(err, deadline.is_some()))?,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(status = response.status, bytes = response.body.len(), "api response received");

        Ok(response)
    }

    /// Resolves, dispatches and decodes the envelope of one call.
    pub(crate) async fn request_envelope(
        &self,
        ctx: &RequestContext,
        method: Method,
        template: &str,
        scope: &Scope,
        query: &[(&str, String)],
        body: Option<RequestBody>,
    ) -> Result<Envelope> {
        let url = self.endpoint_url(template, scope, query)?;
        let response = self.dispatch(ctx, method, &url, body).await?;
        decode_response(&response)
    }

    /// Like [`ApiClient::request_envelope`], then deserializes `result` into `T`.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        method: Method,
        template: &str,
        scope: &Scope,
        body: Option<RequestBody>,
    ) -> Result<T> {
        self.request_envelope(ctx, method, template, scope, &[], body)
            .await?
            .into_result()
    }
}

pub(crate) fn decode_response(response: &RawResponse) -> Result<Envelope> {
    let decoded = envelope::decode(response.status, &response.body);

    #[cfg(feature = "tracing")]
    if let Err(CloudflareError::Api(failure)) = &decoded {
        tracing::debug!(
            status = failure.status(),
            codes = ?failure.codes().collect::<Vec<_>>(),
            "api rejected request"
        );
    }

    decoded
}

/// A timeout is a deadline only when the context set one; timeouts configured
/// on an injected `reqwest::Client` stay transport failures.
fn transport_error(err: reqwest::Error, has_deadline: bool) -> CloudflareError {
    if has_deadline && err.is_timeout() {
        CloudflareError::Cancelled(CancelReason::DeadlineExceeded)
    } else {
        CloudflareError::Transport(err)
    }
}
