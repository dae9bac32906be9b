//! Stream live inputs (account scope).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    endpoint::{Scope, STREAM_LIVE_INPUT},
    envelope::null_as_default,
    error::IdentifierKind,
    ApiClient, CloudflareError, RequestContext, Result,
};

/// Identifies one live input. A missing account uses the client default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamLiveParams {
    pub account_id: Option<String>,
    pub live_id: String,
}

impl StreamLiveParams {
    pub fn new(live_id: impl Into<String>) -> Self {
        Self {
            account_id: None,
            live_id: live_id.into(),
        }
    }

    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rtmps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stream_key: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Srt {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stream_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub passphrase: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLiveStatusEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default)]
    pub status_entered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status_last_seen: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLiveStatus {
    #[serde(default)]
    pub current: Option<StreamLiveStatusEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<StreamLiveStatusEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLiveRecording {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mode: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "requireSignedURLs")]
    pub require_signed_urls: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allowed_origins: Vec<String>,
}

/// Live input descriptor with its ingest and playback credentials.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLive {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rtmps: Rtmps,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rtmps_playback: Rtmps,
    #[serde(default, deserialize_with = "null_as_default")]
    pub srt: Srt,
    #[serde(default, deserialize_with = "null_as_default")]
    pub srt_playback: Srt,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub status: Option<StreamLiveStatus>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recording: StreamLiveRecording,
}

impl ApiClient {
    /// Fetches one live input.
    pub async fn stream_live_input(
        &self,
        ctx: &RequestContext,
        params: &StreamLiveParams,
    ) -> Result<StreamLive> {
        if params.live_id.trim().is_empty() {
            return Err(CloudflareError::MissingIdentifier(IdentifierKind::Resource));
        }
        let scope = Scope {
            account_id: params.account_id.clone(),
            resource_id: Some(params.live_id.clone()),
            ..Scope::default()
        };
        self.request(ctx, Method::GET, STREAM_LIVE_INPUT, &scope, None)
            .await
    }
}
