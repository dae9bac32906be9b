//! `cloudflare-http` is an async typed client for the Cloudflare v4 API.
//!
//! Every call goes through one pipeline: endpoint resolution from a
//! zone or account scope, one authenticated HTTP exchange, and decoding of
//! the `{success, errors, messages, result}` envelope into a typed result
//! or a [`CloudflareError`].
//!
//! Typed operations:
//! - DNS: [`ApiClient::dns_records`], [`ApiClient::create_dns_record`], ...
//! - Zones: [`ApiClient::zone_id_by_name`]
//! - Workers: [`ApiClient::upload_worker`], [`ApiClient::list_worker_routes`], ...
//! - Stream: [`ApiClient::stream_live_input`]

mod auth;
mod client;
mod context;
mod dns;
mod endpoint;
mod envelope;
mod error;
mod options;
mod stream;
mod workers;
mod zones;

#[cfg(feature = "raw-mode")]
pub mod raw;

pub use auth::Credentials;
pub use client::ApiClient;
pub use context::RequestContext;
pub use dns::{DnsRecord, DnsRecordFilter, NewDnsRecord};
#[cfg(feature = "raw-mode")]
pub use endpoint::Scope;
pub use endpoint::WorkerScope;
pub use envelope::{Envelope, ErrorDetail, PaginationInfo};
pub use error::{ApiFailure, CancelReason, CloudflareError, IdentifierKind};
pub use options::{ClientBuilder, DEFAULT_BASE_URL};
pub use reqwest::Method;
pub use stream::{
    Rtmps, Srt, StreamLive, StreamLiveParams, StreamLiveRecording, StreamLiveStatus,
    StreamLiveStatusEntry,
};
pub use tokio_util::sync::CancellationToken;
pub use workers::{WorkerMetaData, WorkerRoute, WorkerScript};
pub use zones::Zone;

pub type Result<T> = std::result::Result<T, CloudflareError>;
