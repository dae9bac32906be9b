use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    endpoint::{Scope, ZONES},
    envelope::null_as_default,
    error::IdentifierKind,
    ApiClient, CloudflareError, RequestContext, Result,
};

/// Zone summary as returned by the zone listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paused: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name_servers: Vec<String>,
}

impl ApiClient {
    /// Looks up the zone ID for a domain name.
    pub async fn zone_id_by_name(&self, ctx: &RequestContext, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CloudflareError::MissingIdentifier(IdentifierKind::Zone));
        }

        let envelope = self
            .request_envelope(
                ctx,
                Method::GET,
                ZONES,
                &Scope::new(),
                &[("name", name.to_owned())],
                None,
            )
            .await?;
        let zones: Option<Vec<Zone>> = envelope.into_result()?;

        zones
            .unwrap_or_default()
            .into_iter()
            .find(|zone| zone.name.eq_ignore_ascii_case(name))
            .map(|zone| zone.id)
            .ok_or_else(|| CloudflareError::ZoneNotFound(name.to_owned()))
    }
}
