use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::{ApiClient, CloudflareError, Credentials, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

const DEFAULT_USER_AGENT: &str = concat!("cloudflare-http/", env!("CARGO_PKG_VERSION"));

/// Immutable configuration of a built client.
#[derive(Clone, Debug)]
pub(crate) struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) default_account_id: Option<String>,
    /// Authentication, user agent and static extra headers, computed once.
    pub(crate) headers: HeaderMap,
}

/// Collects construction options for an [`ApiClient`].
///
/// Each setter may be called repeatedly; the last call of a kind wins,
/// including switching between key and token authentication.
#[derive(Clone, Debug, Default)]
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    default_account_id: Option<String>,
    base_url: Option<String>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Authenticates with a global API key and the account email.
    pub fn api_key(self, key: impl Into<String>, email: impl Into<String>) -> Self {
        self.credentials(Credentials::api_key(key, email))
    }

    /// Authenticates with a scoped API token.
    pub fn api_token(self, token: impl Into<String>) -> Self {
        self.credentials(Credentials::api_token(token))
    }

    /// Account used by account-scoped calls that do not name one explicitly.
    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.default_account_id = Some(account_id.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a static header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Uses a preconfigured `reqwest` client (proxy, TLS, pool settings).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Validates the options and builds the client.
    pub fn build(self) -> Result<ApiClient> {
        let credentials = self.credentials.ok_or_else(|| {
            CloudflareError::Config("no credentials: set an API key and email or an API token".to_owned())
        })?;

        let base_url = validate_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let default_account_id = match self.default_account_id {
            Some(account) if account.trim().is_empty() => {
                return Err(CloudflareError::Config(
                    "default account ID must not be empty".to_owned(),
                ))
            }
            other => other.map(|account| account.trim().to_owned()),
        };

        let mut headers = HeaderMap::new();
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|err| CloudflareError::Config(format!("invalid user agent: {err}")))?,
        );
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                CloudflareError::Config(format!("invalid header name '{name}': {err}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                CloudflareError::Config(format!("invalid value for header '{name}': {err}"))
            })?;
            headers.insert(name, value);
        }
        // Authentication is applied last so extra headers cannot replace it.
        headers.extend(credentials.auth_headers()?);

        let config = ClientConfig {
            base_url,
            default_account_id,
            headers,
        };
        Ok(ApiClient::from_parts(self.http.unwrap_or_default(), config))
    }
}

fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed)
        .map_err(|err| CloudflareError::Config(format!("invalid base URL '{raw}': {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CloudflareError::Config(format!(
            "base URL '{raw}' must use http or https"
        )));
    }
    if url.query().is_some() {
        return Err(CloudflareError::Config(format!(
            "base URL '{raw}' must not carry a query string"
        )));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use reqwest::header::{AUTHORIZATION, USER_AGENT};

    use super::{ClientBuilder, DEFAULT_BASE_URL};
    use crate::{auth::AUTH_KEY_HEADER, CloudflareError};

    #[test]
    fn build_requires_credentials() {
        let err = ClientBuilder::new().build().expect_err("must fail");
        assert!(matches!(err, CloudflareError::Config(_)));
    }

    #[test]
    fn defaults_apply() {
        let client = ClientBuilder::new().api_token("tok").build().expect("must build");
        assert_eq!(client.config().base_url, DEFAULT_BASE_URL);
        assert_eq!(client.config().default_account_id, None);
        assert!(client.config().headers.contains_key(USER_AGENT));
    }

    #[test]
    fn later_auth_mode_overrides_earlier() {
        let client = ClientBuilder::new()
            .api_key("deadbeef", "test@example.org")
            .api_token("tok")
            .build()
            .expect("must build");
        let headers = &client.config().headers;
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert!(!headers.contains_key(AUTH_KEY_HEADER));
    }

    #[test]
    fn later_account_overrides_earlier() {
        let client = ClientBuilder::new()
            .api_token("tok")
            .account("first")
            .account("second")
            .build()
            .expect("must build");
        assert_eq!(client.config().default_account_id.as_deref(), Some("second"));
    }

    #[test]
    fn blank_account_is_rejected() {
        let err = ClientBuilder::new()
            .api_token("tok")
            .account(" ")
            .build()
            .expect_err("must fail");
        assert!(matches!(err, CloudflareError::Config(_)));
    }

    #[test]
    fn base_url_is_validated_and_trimmed() {
        let client = ClientBuilder::new()
            .api_token("tok")
            .base_url("http://127.0.0.1:8080/client/v4/")
            .build()
            .expect("must build");
        assert_eq!(client.config().base_url, "http://127.0.0.1:8080/client/v4");

        for bad in ["not a url", "ftp://example.com", "https://example.com/?x=1"] {
            let err = ClientBuilder::new()
                .api_token("tok")
                .base_url(bad)
                .build()
                .expect_err("must fail");
            assert!(matches!(err, CloudflareError::Config(_)), "{bad}");
        }
    }

    #[test]
    fn extra_headers_cannot_replace_authentication() {
        let client = ClientBuilder::new()
            .api_token("tok")
            .header("Authorization", "Basic nope")
            .header("x-trace", "1")
            .header("X-Trace", "2")
            .build()
            .expect("must build");
        let headers = &client.config().headers;
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert_eq!(headers["x-trace"], "2");
    }
}
