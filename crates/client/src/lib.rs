//! Memobase HTTP Client
//!
//! A native Rust client for a Memobase project: register end-users, submit
//! typed blobs on their behalf, page through them, trigger buffer flushes and
//! read back the derived user profiles.
//!
//! # Quick Start
//!
//! ```no_run
//! use memobase_client::{Blob, BlobType, ChatMessage, MemobaseClient, ProfileQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), memobase_client::Error> {
//!     let client = MemobaseClient::new("http://localhost:8019", Some("secret"))?;
//!
//!     if !client.ping().await {
//!         eprintln!("Memobase is not reachable");
//!     }
//!
//!     let user = client.get_or_create_user("9a1c2f4e-0000-4000-8000-000000000001").await?;
//!
//!     let blob = Blob::chat([
//!         ChatMessage::user("Hi, I'm here again"),
//!         ChatMessage::assistant("Hi, Gus! How can I help you?"),
//!     ]);
//!     let blob_id = user.insert(&blob).await?;
//!     println!("inserted {blob_id}");
//!
//!     // Accepted, not finished: processing happens on the service side.
//!     user.flush(BlobType::Chat).await?;
//!
//!     for profile in user.profile(&ProfileQuery::new()).await? {
//!         println!("{}/{}: {}", profile.topic(), profile.sub_topic(), profile.content());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```no_run
//! use memobase_client::MemobaseClientBuilder;
//! use std::time::Duration;
//!
//! let client = MemobaseClientBuilder::new("http://localhost:8019")
//!     .timeout(Duration::from_secs(30))
//!     .api_key("your-api-key")
//!     .build()
//!     .unwrap();
//! ```
//!
//! When no key is given, `MEMOBASE_API_KEY` is read once at build time.

pub mod config;
mod error;
mod query;
mod user;
mod users;

pub use config::ClientConfig;
pub use error::Error;
pub use query::{ContextQuery, ProfileQuery};
pub use user::User;

// Re-export the data model so callers don't need a direct `memobase_core` dependency.
pub use memobase_core::{
    Blob, BlobContent, BlobData, BlobType, ChatBlob, ChatMessage, CodeBlob, DocBlob, Fields,
    ImageBlob, ProfileReport, SkippedEntry, TranscriptBlob, TranscriptStamp, UserEvent,
    UserProfile,
};

use std::time::Duration;

use memobase_core::{Envelope, Payload};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use tracing::debug;

use crate::config::{API_KEY_ENV, DEFAULT_API_VERSION, resolve_api_key};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest body excerpt kept in [`Error::Http`].
const BODY_EXCERPT_LEN: usize = 256;

/// HTTP client for a Memobase project.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct MemobaseClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

/// Builder for configuring a [`MemobaseClient`].
#[derive(Debug)]
pub struct MemobaseClientBuilder {
    project_url: String,
    api_version: String,
    timeout: Duration,
    api_key: Option<String>,
    client: Option<Client>,
}

impl MemobaseClientBuilder {
    /// Create a new builder for the given project URL.
    pub fn new(project_url: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into().trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
            client: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the API key for authentication.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API prefix (default `api/v1`).
    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into().trim_matches('/').to_string();
        self
    }

    /// Use a custom reqwest Client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings. The
    /// configured timeout is not applied to a custom client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    ///
    /// The API key set on the builder takes precedence; otherwise
    /// `MEMOBASE_API_KEY` is used. Having neither is an error.
    pub fn build(self) -> Result<MemobaseClient, Error> {
        let api_key = resolve_api_key(self.api_key, std::env::var(API_KEY_ENV).ok())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "api key is required, pass it explicitly or set {API_KEY_ENV}"
                ))
            })?;

        let raw = if self.api_version.is_empty() {
            self.project_url
        } else {
            format!("{}/{}", self.project_url, self.api_version)
        };
        let base_url = Url::parse(&raw)
            .map_err(|e| Error::Configuration(format!("invalid project url '{raw}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "project url '{raw}' cannot carry a path"
            )));
        }

        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };

        Ok(MemobaseClient {
            client,
            base_url,
            api_key,
        })
    }
}

impl MemobaseClient {
    /// Create a client with default configuration.
    ///
    /// `api_key` falls back to `MEMOBASE_API_KEY` when `None`.
    pub fn new(project_url: impl Into<String>, api_key: Option<&str>) -> Result<Self, Error> {
        let mut builder = MemobaseClientBuilder::new(project_url);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    /// Create a client from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        let mut builder = MemobaseClientBuilder::new(&config.project_url);

        if let Some(ref timeout) = config.timeout {
            builder = builder.timeout(*timeout);
        }

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        if let Some(ref api_version) = config.api_version {
            builder = builder.api_version(api_version);
        }

        builder.build()
    }

    /// Create a builder for advanced configuration.
    pub fn builder(project_url: impl Into<String>) -> MemobaseClientBuilder {
        MemobaseClientBuilder::new(project_url)
    }

    /// Get the base URL requests are issued against (project URL plus API prefix).
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Check whether the service is reachable.
    ///
    /// Only an HTTP 200 from `/healthcheck` counts as healthy. Transport
    /// errors and any other status collapse to `false`.
    pub async fn ping(&self) -> bool {
        let request = match self.request(Method::GET, &["healthcheck"]) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "healthcheck request could not be built");
                return false;
            }
        };

        match request.send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(error = %e, "healthcheck failed");
                false
            }
        }
    }

    /// Resolve path segments against the base URL.
    ///
    /// Segments are percent-encoded, so ids may contain `/` or spaces.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::Configuration(format!("base url '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start an authenticated request.
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, Error> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "memobase request");
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.api_key))
    }

    /// Send a request and decode its envelope.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Payload, Error> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        unpack_response(status, &body)
    }
}

/// Interpret a raw HTTP response.
///
/// A well-formed envelope is authoritative. A body that is not an envelope
/// is reported as [`Error::Http`] when the status is not 2xx, and as
/// [`Error::Deserialization`] otherwise.
fn unpack_response(status: StatusCode, body: &[u8]) -> Result<Payload, Error> {
    match Envelope::from_slice(body) {
        Ok(envelope) => Ok(envelope.into_payload()?),
        Err(_) if !status.is_success() => Err(Error::Http {
            status: status.as_u16(),
            message: body_excerpt(status, body),
        }),
        Err(e) => Err(e.into()),
    }
}

fn body_excerpt(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }
    text.chars().take(BODY_EXCERPT_LEN).collect()
}
