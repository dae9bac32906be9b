//! Workers scripts and routes.
//!
//! Script operations are addressed through [`WorkerScope`]: either the
//! zone's single script or a named script under an account. Routes are
//! always zone-scoped.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{decode_response, RequestBody},
    endpoint::{Scope, WorkerScope, ACCOUNT_WORKER_SCRIPTS, WORKER_ROUTE, WORKER_ROUTES},
    envelope::null_as_default,
    error::IdentifierKind,
    ApiClient, CloudflareError, RequestContext, Result,
};

/// Metadata the API keeps about an uploaded script.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerMetaData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub etag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

/// Script source with its metadata. Downloads only fill `script`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerScript {
    #[serde(flatten)]
    pub meta: WorkerMetaData,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub script: String,
}

/// URL pattern bound to a script.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRoute {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pattern: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub script: String,
}

impl WorkerRoute {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            enabled: true,
            ..Self::default()
        }
    }

    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }
}

fn require(value: &str, kind: IdentifierKind) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CloudflareError::MissingIdentifier(kind));
    }
    Ok(())
}

fn require_scope(scope: &WorkerScope) -> Result<()> {
    match scope {
        WorkerScope::Zone { zone_id } => require(zone_id, IdentifierKind::Zone),
        WorkerScope::Account { script_name, .. } => require(script_name, IdentifierKind::Resource),
    }
}

impl ApiClient {
    /// Uploads script source, replacing any previous version.
    pub async fn upload_worker(
        &self,
        ctx: &RequestContext,
        scope: &WorkerScope,
        script: &str,
    ) -> Result<WorkerScript> {
        require_scope(scope)?;
        let (template, scope) = scope.endpoint();
        let mut uploaded: WorkerScript = self
            .request(
                ctx,
                Method::PUT,
                template,
                &scope,
                Some(RequestBody::javascript(script)),
            )
            .await?;
        if uploaded.script.is_empty() {
            uploaded.script = script.to_owned();
        }
        Ok(uploaded)
    }

    /// Downloads the raw script source.
    ///
    /// A successful response body is the script itself, not an envelope.
    pub async fn download_worker(
        &self,
        ctx: &RequestContext,
        scope: &WorkerScope,
    ) -> Result<WorkerScript> {
        require_scope(scope)?;
        let (template, scope) = scope.endpoint();
        let url = self.endpoint_url(template, &scope, &[])?;
        let response = self.dispatch(ctx, Method::GET, &url, None).await?;

        if response.is_success() {
            let script = String::from_utf8(response.body).map_err(|err| {
                CloudflareError::malformed(response.status, format!("script is not UTF-8: {err}"))
            })?;
            return Ok(WorkerScript {
                script,
                ..WorkerScript::default()
            });
        }

        decode_response(&response)?;
        Err(CloudflareError::malformed(
            response.status,
            "successful envelope on a failed script download",
        ))
    }

    pub async fn delete_worker(&self, ctx: &RequestContext, scope: &WorkerScope) -> Result<()> {
        require_scope(scope)?;
        let (template, scope) = scope.endpoint();
        self.request_envelope(ctx, Method::DELETE, template, &scope, &[], None)
            .await?;
        Ok(())
    }

    /// Lists scripts of an account; `None` uses the client's default account.
    pub async fn list_worker_scripts(
        &self,
        ctx: &RequestContext,
        account_id: Option<&str>,
    ) -> Result<Vec<WorkerMetaData>> {
        let scope = Scope {
            account_id: account_id.map(str::to_owned),
            ..Scope::default()
        };
        let scripts: Option<Vec<WorkerMetaData>> = self
            .request(ctx, Method::GET, ACCOUNT_WORKER_SCRIPTS, &scope, None)
            .await?;
        Ok(scripts.unwrap_or_default())
    }

    pub async fn create_worker_route(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
        route: &WorkerRoute,
    ) -> Result<WorkerRoute> {
        require(zone_id, IdentifierKind::Zone)?;
        let created: WorkerRoute = self
            .request(
                ctx,
                Method::POST,
                WORKER_ROUTES,
                &Scope::new().zone(zone_id),
                Some(RequestBody::json(route)?),
            )
            .await?;
        Ok(merge_route(created, route))
    }

    pub async fn update_worker_route(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
        route_id: &str,
        route: &WorkerRoute,
    ) -> Result<WorkerRoute> {
        require(zone_id, IdentifierKind::Zone)?;
        let scope = Scope::new().zone(zone_id).resource(route_id);
        let updated: WorkerRoute = self
            .request(
                ctx,
                Method::PUT,
                WORKER_ROUTE,
                &scope,
                Some(RequestBody::json(route)?),
            )
            .await?;
        Ok(merge_route(updated, route))
    }

    pub async fn list_worker_routes(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
    ) -> Result<Vec<WorkerRoute>> {
        require(zone_id, IdentifierKind::Zone)?;
        let routes: Option<Vec<WorkerRoute>> = self
            .request(
                ctx,
                Method::GET,
                WORKER_ROUTES,
                &Scope::new().zone(zone_id),
                None,
            )
            .await?;
        Ok(routes.unwrap_or_default())
    }

    pub async fn delete_worker_route(
        &self,
        ctx: &RequestContext,
        zone_id: &str,
        route_id: &str,
    ) -> Result<()> {
        require(zone_id, IdentifierKind::Zone)?;
        let scope = Scope::new().zone(zone_id).resource(route_id);
        self.request_envelope(ctx, Method::DELETE, WORKER_ROUTE, &scope, &[], None)
            .await?;
        Ok(())
    }
}

/// Create and update answers may carry only the route ID.
fn merge_route(returned: WorkerRoute, sent: &WorkerRoute) -> WorkerRoute {
    if !returned.pattern.is_empty() {
        return returned;
    }
    WorkerRoute {
        id: returned.id,
        ..sent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{merge_route, WorkerRoute, WorkerScript};

    #[test]
    fn route_body_omits_empty_script_and_id() {
        let body = serde_json::to_value(WorkerRoute::new("app1.example.com/*"))
            .expect("must serialize");
        assert_eq!(
            body,
            serde_json::json!({"pattern": "app1.example.com/*", "enabled": true})
        );
    }

    #[test]
    fn route_body_keeps_script_when_set() {
        let body = serde_json::to_value(WorkerRoute::new("app1.example.com/*").script("baz"))
            .expect("must serialize");
        assert_eq!(body["script"], "baz");
    }

    #[test]
    fn merge_route_fills_id_only_answers() {
        let sent = WorkerRoute::new("app2.example.com/*");
        let returned = WorkerRoute {
            id: "e7a57d8746e74ae49c25994dadb421b1".to_owned(),
            ..WorkerRoute::default()
        };
        let merged = merge_route(returned, &sent);
        assert_eq!(merged.id, "e7a57d8746e74ae49c25994dadb421b1");
        assert_eq!(merged.pattern, "app2.example.com/*");
        assert!(merged.enabled);
    }

    #[test]
    fn script_metadata_flattens() {
        let script: WorkerScript = serde_json::from_value(serde_json::json!({
            "id": "baz",
            "etag": "279cf40d86d70b82f6cd3ba90a646b3ad995912da446836d7371c21c6a43977a",
            "size": 191,
            "created_on": "2018-06-09T15:17:01.989141Z",
            "modified_on": "2018-06-09T15:17:01.989141Z"
        }))
        .expect("must deserialize");
        assert_eq!(script.meta.id, "baz");
        assert_eq!(script.meta.size, 191);
        assert!(script.script.is_empty());
    }

    #[test]
    fn null_route_and_script_fields_read_as_defaults() {
        let route: WorkerRoute = serde_json::from_value(serde_json::json!({
            "id": "route-1",
            "pattern": "app1.example.com/*",
            "enabled": null,
            "script": null
        }))
        .expect("must deserialize");
        assert_eq!(route.id, "route-1");
        assert!(route.script.is_empty());
        assert!(!route.enabled);

        let script: WorkerScript = serde_json::from_value(serde_json::json!({
            "id": "baz",
            "etag": null,
            "size": null,
            "script": null
        }))
        .expect("must deserialize");
        assert_eq!(script.meta.id, "baz");
        assert!(script.meta.etag.is_empty());
        assert_eq!(script.meta.size, 0);
        assert!(script.script.is_empty());
    }
}
