use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::{CloudflareError, Result};

pub(crate) const AUTH_KEY_HEADER: &str = "x-auth-key";
pub(crate) const AUTH_EMAIL_HEADER: &str = "x-auth-email";

/// Authentication mode used for every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Legacy global API key paired with the account email.
    ApiKey { key: String, email: String },
    /// Scoped API token sent as `Authorization: Bearer <token>`.
    ApiToken(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("key", &"<redacted>")
                .field("email", email)
                .finish(),
            Self::ApiToken(_) => f.debug_tuple("ApiToken").field(&"<redacted>").finish(),
        }
    }
}

impl Credentials {
    pub fn api_key(key: impl Into<String>, email: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            email: email.into(),
        }
    }

    pub fn api_token(token: impl Into<String>) -> Self {
        Self::ApiToken(token.into())
    }

    /// Builds the authentication headers for this mode.
    ///
    /// Fails when a required field is blank or cannot be sent as a header value.
    pub fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        match self {
            Self::ApiKey { key, email } => {
                headers.insert(
                    HeaderName::from_static(AUTH_KEY_HEADER),
                    sensitive_value("API key", key)?,
                );
                headers.insert(
                    HeaderName::from_static(AUTH_EMAIL_HEADER),
                    header_value("API email", email)?,
                );
            }
            Self::ApiToken(token) => {
                if token.trim().is_empty() {
                    return Err(blank("API token"));
                }
                let authorization = normalize_bearer_authorization(token);
                headers.insert(AUTHORIZATION, sensitive_value("API token", &authorization)?);
            }
        }
        Ok(headers)
    }
}

fn blank(field: &str) -> CloudflareError {
    CloudflareError::Config(format!("{field} must not be empty"))
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(blank(field));
    }
    HeaderValue::from_str(trimmed)
        .map_err(|err| CloudflareError::Config(format!("{field} is not a valid header value: {err}")))
}

fn sensitive_value(field: &str, value: &str) -> Result<HeaderValue> {
    let mut value = header_value(field, value)?;
    value.set_sensitive(true);
    Ok(value)
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use super::{normalize_bearer_authorization, Credentials, AUTH_EMAIL_HEADER, AUTH_KEY_HEADER};
    use crate::CloudflareError;

    #[test]
    fn normalize_bearer_adds_prefix_when_missing() {
        assert_eq!(
            normalize_bearer_authorization("abc123"),
            "Bearer abc123".to_owned()
        );
    }

    #[test]
    fn normalize_bearer_keeps_existing_prefix() {
        assert_eq!(
            normalize_bearer_authorization("bEaReR abc123"),
            "bEaReR abc123".to_owned()
        );
    }

    #[test]
    fn key_mode_emits_two_headers() {
        let headers = Credentials::api_key("deadbeef", "test@example.org")
            .auth_headers()
            .expect("must build headers");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[AUTH_KEY_HEADER], "deadbeef");
        assert_eq!(headers[AUTH_EMAIL_HEADER], "test@example.org");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn token_mode_emits_single_authorization_header() {
        let headers = Credentials::api_token("tok")
            .auth_headers()
            .expect("must build headers");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
    }

    #[test]
    fn key_mode_requires_email() {
        let err = Credentials::api_key("deadbeef", " ")
            .auth_headers()
            .expect_err("must fail");
        assert!(matches!(err, CloudflareError::Config(_)));
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = Credentials::api_token("").auth_headers().expect_err("must fail");
        assert!(matches!(err, CloudflareError::Config(_)));
    }

    #[test]
    fn header_values_reject_control_characters() {
        let err = Credentials::api_token("tok\nen")
            .auth_headers()
            .expect_err("must fail");
        assert!(matches!(err, CloudflareError::Config(_)));
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", Credentials::api_key("secret-key", "me@example.org"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }
}
