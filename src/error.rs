use std::fmt;

use crate::envelope::ErrorDetail;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum CloudflareError {
    /// Invalid or incomplete client configuration.
    #[error("configuration error: {0}")]
    Config(String),
    /// A zone, account or resource identifier required by the endpoint was not supplied.
    #[error("missing required {0} identifier")]
    MissingIdentifier(IdentifierKind),
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// The request context was cancelled or its deadline elapsed.
    #[error("request {0}")]
    Cancelled(CancelReason),
    /// Response body is not a valid API envelope.
    #[error("malformed response (http {status}): {message}")]
    MalformedResponse { status: u16, message: String },
    /// The API answered with `success: false`.
    #[error("{0}")]
    Api(ApiFailure),
    /// No zone matched the requested name.
    #[error("zone '{0}' could not be found")]
    ZoneNotFound(String),
}

impl CloudflareError {
    /// Returns `true` when the network layer failed before an API answer was read.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` for cancellation and deadline errors.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns the provider failure when the API rejected the request.
    pub fn api_failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Api(failure) => Some(failure),
            _ => None,
        }
    }

    /// HTTP status attached to the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::MalformedResponse { status, .. } => Some(*status),
            Self::Api(failure) => Some(failure.status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn malformed(status: u16, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            status,
            message: message.into(),
        }
    }
}

/// Identifier dimension an endpoint needs to be addressed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdentifierKind {
    Zone,
    Account,
    /// Per-resource ID: record ID, route ID, script name, live input ID.
    Resource,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zone => f.write_str("zone"),
            Self::Account => f.write_str("account"),
            Self::Resource => f.write_str("resource"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CancelReason {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Failure reported by the API through a `success: false` envelope.
///
/// Every error entry is kept; [`ApiFailure::errors`] enumerates them in
/// the order the API returned them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiFailure {
    pub(crate) status: u16,
    pub(crate) errors: Vec<ErrorDetail>,
    pub(crate) messages: Vec<String>,
}

impl ApiFailure {
    /// HTTP status code of the response that carried the envelope.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn errors(&self) -> &[ErrorDetail] {
        &self.errors
    }

    pub fn codes(&self) -> impl Iterator<Item = i64> + '_ {
        self.errors.iter().map(|error| error.code)
    }

    /// Supplementary `messages` from the envelope; not part of the error text.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn has_code(&self, code: i64) -> bool {
        self.codes().any(|candidate| candidate == code)
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "api request failed with http {}", self.status);
        }
        write!(f, "api request failed with http {}:", self.status)?;
        for error in &self.errors {
            write!(f, "\n  {}: {}", error.code, error.message)?;
        }
        Ok(())
    }
}
