//! Experimental raw envelope passthrough for endpoints without a typed wrapper.
//!
//! Enabled with the `raw-mode` feature.

use reqwest::Method;

use crate::{client::RequestBody, endpoint::Scope, ApiClient, Envelope, RequestContext, Result};

/// Decoded envelope of a successful raw call; `result` stays untyped.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEnvelope(pub Envelope);

impl ApiClient {
    /// Calls `template` (with `{zone}`, `{account}`, `{id}` placeholders)
    /// and returns the decoded envelope.
    pub async fn raw_request(
        &self,
        ctx: &RequestContext,
        method: Method,
        template: &str,
        scope: &Scope,
        body: Option<&serde_json::Value>,
    ) -> Result<RawEnvelope> {
        let body = body.map(RequestBody::json).transpose()?;
        self.request_envelope(ctx, method, template, scope, &[], body)
            .await
            .map(RawEnvelope)
    }
}
