//! Endpoint resolution: path templates with `{zone}`, `{account}` and
//! `{id}` placeholders, filled from a per-call [`Scope`].
//!
//! Zone and account templates are separate families. The resolver never
//! substitutes one dimension for another; only `{account}` may fall back
//! to the client's default account.

use crate::{error::IdentifierKind, CloudflareError, Result};

/// Identifiers supplied for one call. Empty or whitespace-only strings count
/// as absent; other values are sent exactly as given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    pub zone_id: Option<String>,
    pub account_id: Option<String>,
    pub resource_id: Option<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zone(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    #[cfg(any(test, feature = "raw-mode"))]
    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }
}

/// Addressing mode for Workers script operations.
///
/// A script is either the single script bound to a zone, or a named
/// script under an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerScope {
    Zone {
        zone_id: String,
    },
    Account {
        /// Falls back to the client's default account when `None`.
        account_id: Option<String>,
        script_name: String,
    },
}

impl WorkerScope {
    pub fn zone(zone_id: impl Into<String>) -> Self {
        Self::Zone {
            zone_id: zone_id.into(),
        }
    }

    /// Named script under the client's default account.
    pub fn script(script_name: impl Into<String>) -> Self {
        Self::Account {
            account_id: None,
            script_name: script_name.into(),
        }
    }

    pub fn account_script(account_id: impl Into<String>, script_name: impl Into<String>) -> Self {
        Self::Account {
            account_id: Some(account_id.into()),
            script_name: script_name.into(),
        }
    }

    pub(crate) fn endpoint(&self) -> (&'static str, Scope) {
        match self {
            Self::Zone { zone_id } => (ZONE_WORKER_SCRIPT, Scope::new().zone(zone_id.as_str())),
            Self::Account {
                account_id,
                script_name,
            } => {
                let scope = Scope {
                    account_id: account_id.clone(),
                    resource_id: Some(script_name.clone()),
                    ..Scope::default()
                };
                (ACCOUNT_WORKER_SCRIPT, scope)
            }
        }
    }
}

pub(crate) const ZONES: &str = "/zones";
pub(crate) const DNS_RECORDS: &str = "/zones/{zone}/dns_records";
pub(crate) const DNS_RECORD: &str = "/zones/{zone}/dns_records/{id}";
pub(crate) const ZONE_WORKER_SCRIPT: &str = "/zones/{zone}/workers/script";
pub(crate) const ACCOUNT_WORKER_SCRIPTS: &str = "/accounts/{account}/workers/scripts";
pub(crate) const ACCOUNT_WORKER_SCRIPT: &str = "/accounts/{account}/workers/scripts/{id}";
pub(crate) const WORKER_ROUTES: &str = "/zones/{zone}/workers/routes";
pub(crate) const WORKER_ROUTE: &str = "/zones/{zone}/workers/routes/{id}";
pub(crate) const STREAM_LIVE_INPUT: &str = "/accounts/{account}/stream/live_inputs/{id}";

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

/// Fills every placeholder in `template`, escaping each value as a path segment.
pub(crate) fn resolve(
    template: &str,
    scope: &Scope,
    default_account: Option<&str>,
) -> Result<String> {
    let mut path = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        path.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            CloudflareError::Config(format!("unterminated placeholder in template '{template}'"))
        })?;
        let value = match &after[..end] {
            "zone" => non_empty(scope.zone_id.as_deref())
                .ok_or(CloudflareError::MissingIdentifier(IdentifierKind::Zone))?,
            "account" => non_empty(scope.account_id.as_deref())
                .or_else(|| non_empty(default_account))
                .ok_or(CloudflareError::MissingIdentifier(IdentifierKind::Account))?,
            "id" => non_empty(scope.resource_id.as_deref())
                .ok_or(CloudflareError::MissingIdentifier(IdentifierKind::Resource))?,
            other => {
                return Err(CloudflareError::Config(format!(
                    "unknown placeholder '{{{other}}}' in template '{template}'"
                )))
            }
        };
        path.push_str(&urlencoding::encode(value));
        rest = &after[end + 1..];
    }
    path.push_str(rest);

    Ok(path)
}

/// Joins base URL, resolved path and escaped query pairs.
pub(crate) fn join_url(base_url: &str, path: &str, query: &[(&str, String)]) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    for (index, (key, value)) in query.iter().enumerate() {
        url.push(if index == 0 { '?' } else { '&' });
        url.push_str(&urlencoding::encode(key));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::{
        join_url, resolve, Scope, WorkerScope, ACCOUNT_WORKER_SCRIPT, DNS_RECORD, DNS_RECORDS,
        STREAM_LIVE_INPUT,
    };
    use crate::{error::IdentifierKind, CloudflareError};

    #[test]
    fn resolves_all_placeholders() {
        let scope = Scope::new().zone("z1").resource("r1");
        let path = resolve(DNS_RECORD, &scope, None).expect("must resolve");
        assert_eq!(path, "/zones/z1/dns_records/r1");
        assert!(!path.contains('{'));
    }

    #[test]
    fn account_falls_back_to_default() {
        let scope = Scope::new().resource("live");
        let path = resolve(STREAM_LIVE_INPUT, &scope, Some("foo")).expect("must resolve");
        assert_eq!(path, "/accounts/foo/stream/live_inputs/live");
    }

    #[test]
    fn explicit_account_wins_over_default() {
        let scope = Scope::new().account("bar").resource("live");
        let path = resolve(STREAM_LIVE_INPUT, &scope, Some("foo")).expect("must resolve");
        assert!(path.contains("/bar/"));
        assert!(!path.contains("foo"));
    }

    #[test]
    fn blank_explicit_account_uses_default() {
        let scope = Scope::new().account("").resource("live");
        let path = resolve(STREAM_LIVE_INPUT, &scope, Some("foo")).expect("must resolve");
        assert!(path.contains("/foo/"));
    }

    #[test]
    fn zone_never_borrows_account_default() {
        let scope = Scope::new().account("acct");
        let err = resolve(DNS_RECORDS, &scope, Some("foo")).expect_err("must fail");
        assert!(matches!(
            err,
            CloudflareError::MissingIdentifier(IdentifierKind::Zone)
        ));
    }

    #[test]
    fn missing_account_without_default_fails() {
        let scope = Scope::new().resource("live");
        let err = resolve(STREAM_LIVE_INPUT, &scope, None).expect_err("must fail");
        assert!(matches!(
            err,
            CloudflareError::MissingIdentifier(IdentifierKind::Account)
        ));
    }

    #[test]
    fn missing_resource_fails() {
        let scope = Scope::new().zone("z1").resource("   ");
        let err = resolve(DNS_RECORD, &scope, None).expect_err("must fail");
        assert!(matches!(
            err,
            CloudflareError::MissingIdentifier(IdentifierKind::Resource)
        ));
    }

    #[test]
    fn values_are_path_escaped() {
        let scope = Scope::new().zone("a/b?c").resource("x y");
        let path = resolve(DNS_RECORD, &scope, None).expect("must resolve");
        assert_eq!(path, "/zones/a%2Fb%3Fc/dns_records/x%20y");
    }

    #[test]
    fn surrounding_whitespace_is_escaped_not_trimmed() {
        let scope = Scope::new().zone(" z1").resource("r1 ");
        let path = resolve(DNS_RECORD, &scope, None).expect("must resolve");
        assert_eq!(path, "/zones/%20z1/dns_records/r1%20");
    }

    #[test]
    fn unknown_placeholder_is_a_config_error() {
        let err = resolve("/users/{user}", &Scope::new(), None).expect_err("must fail");
        assert!(matches!(err, CloudflareError::Config(_)));
        let err = resolve("/zones/{zone", &Scope::new().zone("z"), None).expect_err("must fail");
        assert!(matches!(err, CloudflareError::Config(_)));
    }

    #[test]
    fn worker_scope_selects_template_family() {
        let (template, scope) = WorkerScope::zone("z1").endpoint();
        assert_eq!(
            resolve(template, &scope, Some("foo")).expect("must resolve"),
            "/zones/z1/workers/script"
        );

        let (template, scope) = WorkerScope::script("baz").endpoint();
        assert_eq!(template, ACCOUNT_WORKER_SCRIPT);
        assert_eq!(
            resolve(template, &scope, Some("foo")).expect("must resolve"),
            "/accounts/foo/workers/scripts/baz"
        );
    }

    #[test]
    fn join_url_escapes_query_and_trims_slash() {
        let url = join_url(
            "https://api.example.test/client/v4/",
            "/zones",
            &[("name", "a b&c".to_owned()), ("page", "1".to_owned())],
        );
        assert_eq!(
            url,
            "https://api.example.test/client/v4/zones?name=a%20b%26c&page=1"
        );
    }
}
