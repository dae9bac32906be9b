//! DNS records (zone scope only).

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::RequestBody,
    endpoint::{Scope, DNS_RECORD, DNS_RECORDS},
    envelope::null_as_default,
    error::IdentifierKind,
    ApiClient, CloudflareError, RequestContext, Result,
};

/// Records requested per listing page.
pub(crate) const DNS_PAGE_SIZE: u32 = 100;

/// DNS record as returned by the API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub record_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub proxiable: bool,
    #[serde(default)]
    pub proxied: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zone_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

/// Listing filter. Only non-empty fields constrain the query.
///
/// An empty field never means "match empty values"; it means "any".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DnsRecordFilter {
    /// Exact record type, e.g. `AAAA`.
    pub record_type: String,
    /// Exact fully-qualified name, e.g. `foo.example.com`.
    pub name: String,
    /// Exact record content, e.g. `198.51.100.1`.
    pub content: String,
}

impl DnsRecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Query constraints for the non-empty fields, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("type", &self.record_type),
            ("name", &self.name),
            ("content", &self.content),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key, value.clone()))
        .collect()
    }
}

/// Body for creating or updating a record.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewDnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    /// `1` selects automatic TTL.
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn require_zone(zone_id: &str) -> Result<()> {
    if zone_id.trim().is_empty() {
        return Err(CloudflareError::MissingIdentifier(IdentifierKind::Zone));
    }
    Ok(())
}

impl ApiClient {
    /// Lists every record in a zone matching `filter`, following all pages.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cloudflare_http::{ApiClient, DnsRecordFilter, RequestContext};
    ///
    /// # async fn run() -> cloudflare_http::Result<()> {
    /// let api = ApiClient::new("deadbeef", "test@example.org")?;
    /// let ctx = RequestContext::background();
    /// let zone_id = api.zone_id_by_name(&ctx, "example.com").await?;
    /// let aaaa = api
    ///     .dns_records(&ctx, &zone_id, &DnsRecordFilter::new().record_type("AAAA"))
    ///     .await?;
    /// for record in aaaa {
    ///     println!("{}: {}", record.name, record.content);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn dns_records(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
        filter: &DnsRecordFilter,
    ) -> Result<Vec<DnsRecord>> {
        require_zone(zone_id)?;
        let scope = Scope::new().zone(zone_id);
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let mut query = filter.query_pairs();
            query.push(("page", page.to_string()));
            query.push(("per_page", DNS_PAGE_SIZE.to_string()));

            let envelope = self
                .request_envelope(ctx, Method::GET, DNS_RECORDS, &scope, &query, None)
                .await?;
            let total_pages = envelope.result_info.map_or(0, |info| info.total_pages);
            let batch: Option<Vec<DnsRecord>> = envelope.into_result()?;
            let batch = batch.unwrap_or_default();
            let fetched = batch.len();
            records.extend(batch);

            if page >= total_pages || fetched == 0 {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    /// Fetches a single record.
    pub async fn dns_record(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
        record_id: &str,
    ) -> Result<DnsRecord> {
        require_zone(zone_id)?;
        let scope = Scope::new().zone(zone_id).resource(record_id);
        self.request(ctx, Method::GET, DNS_RECORD, &scope, None).await
    }

    pub async fn create_dns_record(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
        record: &NewDnsRecord,
    ) -> Result<DnsRecord> {
        require_zone(zone_id)?;
        let scope = Scope::new().zone(zone_id);
        let body = RequestBody::json(record)?;
        self.request(ctx, Method::POST, DNS_RECORDS, &scope, Some(body))
            .await
    }

    /// Patches an existing record with the fields of `record`.
    pub async fn update_dns_record(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
        record_id: &str,
        record: &NewDnsRecord,
    ) -> Result<DnsRecord> {
        require_zone(zone_id)?;
        let scope = Scope::new().zone(zone_id).resource(record_id);
        let body = RequestBody::json(record)?;
        self.request(ctx, Method::PATCH, DNS_RECORD, &scope, Some(body))
            .await
    }

    pub async fn delete_dns_record(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
        record_id: &str,
    ) -> Result<()> {
        require_zone(zone_id)?;
        let scope = Scope::new().zone(zone_id).resource(record_id);
        self.request_envelope(ctx, Method::DELETE, DNS_RECORD, &scope, &[], None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DnsRecord, DnsRecordFilter, NewDnsRecord};

    #[test]
    fn type_only_filter_constrains_only_type() {
        let pairs = DnsRecordFilter::new().record_type("AAAA").query_pairs();
        assert_eq!(pairs, vec![("type", "AAAA".to_owned())]);
    }

    #[test]
    fn empty_filter_is_unconstrained() {
        assert!(DnsRecordFilter::default().query_pairs().is_empty());
    }

    #[test]
    fn all_fields_are_sent_in_order() {
        let pairs = DnsRecordFilter::new()
            .content("198.51.100.1")
            .name("foo.example.com")
            .record_type("A")
            .query_pairs();
        let keys: Vec<_> = pairs.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["type", "name", "content"]);
    }

    #[test]
    fn record_deserializes_api_shape() {
        let record: DnsRecord = serde_json::from_value(serde_json::json!({
            "id": "372e67954025e0ba6aaa6d586b9e0b59",
            "type": "A",
            "name": "example.com",
            "content": "198.51.100.4",
            "proxiable": true,
            "proxied": false,
            "ttl": 3600,
            "locked": false,
            "zone_id": "023e105f4ecef8ad9ca31a8372d0c353",
            "zone_name": "example.com",
            "created_on": "2014-01-01T05:20:00.12345Z",
            "modified_on": "2014-01-01T05:20:00.12345Z"
        }))
        .expect("must deserialize");

        assert_eq!(record.record_type, "A");
        assert_eq!(record.ttl, 3600);
        assert_eq!(record.proxied, Some(false));
        assert!(record.created_on.is_some());
    }

    #[test]
    fn new_record_omits_unset_optionals() {
        let body = serde_json::to_value(NewDnsRecord {
            record_type: "A".to_owned(),
            name: "www.example.com".to_owned(),
            content: "198.51.100.4".to_owned(),
            ttl: 1,
            ..NewDnsRecord::default()
        })
        .expect("must serialize");

        assert_eq!(body["type"], "A");
        assert!(body.get("proxied").is_none());
        assert!(body.get("priority").is_none());
    }

    #[test]
    fn null_record_fields_read_as_defaults() {
        let record: DnsRecord = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "type": "TXT",
            "name": "example.com",
            "content": null,
            "proxiable": null,
            "ttl": null,
            "zone_id": null,
            "zone_name": null,
            "locked": null,
            "proxied": null
        }))
        .expect("must deserialize");
        assert_eq!(record.id, "r1");
        assert!(record.content.is_empty());
        assert!(record.zone_id.is_empty());
        assert_eq!(record.ttl, 0);
        assert!(!record.locked);
        assert_eq!(record.proxied, None);
    }
}
