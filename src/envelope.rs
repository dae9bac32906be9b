use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{error::ApiFailure, CloudflareError, Result};

/// Single error entry returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Paging block attached to listing responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
}

/// Decoded `{success, errors, messages, result, result_info}` wrapper.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub errors: Vec<ErrorDetail>,
    pub messages: Vec<String>,
    /// Opaque payload, left for the typed wrapper to deserialize.
    pub result: Option<serde_json::Value>,
    pub result_info: Option<PaginationInfo>,
    pub(crate) status: u16,
}

impl Envelope {
    /// HTTP status of the response the envelope was read from.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Deserializes `result` into `T`.
    ///
    /// A missing result is read as JSON `null`, which `()` and `Option<_>` accept.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        let status = self.status;
        let value = self.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).map_err(|err| {
            CloudflareError::malformed(status, format!("unexpected result shape: {err}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    errors: Vec<ErrorDetail>,
    #[serde(default, deserialize_with = "null_as_default")]
    messages: Vec<WireMessage>,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    result_info: Option<PaginationInfo>,
}

/// `messages` entries arrive either as bare strings or as `{code, message}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireMessage {
    Text(String),
    Detail {
        #[serde(default)]
        code: Option<i64>,
        message: String,
    },
}

impl From<WireMessage> for String {
    fn from(message: WireMessage) -> Self {
        match message {
            WireMessage::Text(text) => text,
            WireMessage::Detail {
                code: Some(code),
                message,
            } => format!("{code}: {message}"),
            WireMessage::Detail { code: None, message } => message,
        }
    }
}

/// Reads JSON `null` as the field's default, like an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Decodes a response body into an [`Envelope`].
///
/// The envelope's `success` flag is authoritative over the HTTP status;
/// the status is only carried into the error for diagnostics.
pub(crate) fn decode(status: u16, raw: &[u8]) -> Result<Envelope> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        if is_success_status(status) {
            return Ok(Envelope {
                success: true,
                status,
                ..Envelope::default()
            });
        }
        return Err(CloudflareError::malformed(status, "empty response body"));
    }

    let wire: WireEnvelope = serde_json::from_slice(raw).map_err(|err| {
        CloudflareError::malformed(
            status,
            format!(
                "invalid envelope JSON: {err}; body: {}",
                String::from_utf8_lossy(raw)
            ),
        )
    })?;

    let messages = wire.messages.into_iter().map(String::from).collect();

    if !wire.success {
        return Err(CloudflareError::Api(ApiFailure {
            status,
            errors: wire.errors,
            messages,
        }));
    }

    Ok(Envelope {
        success: true,
        errors: wire.errors,
        messages,
        result: wire.result,
        result_info: wire.result_info,
        status,
    })
}
