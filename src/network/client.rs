//! HTTP client for a network's public API.
//!
//! This module provides the reqwest-backed [`ClientService`] used by coin instances. Every request
//! goes through one retry loop: connection failures and 5xx responses are retried with exponential
//! backoff, anything else is returned to the caller as-is.

use super::types::*;
use crate::coins::{Host, NetworkManifest};

use backoff::ExponentialBackoff;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout applied to every request when the caller gives none.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on the time spent retrying a single request.
const MAX_RETRY_ELAPSED: Duration = Duration::from_secs(10);

/// Network API client bound to one host
#[derive(Clone)]
pub struct HttpClientService {
	/// The shared HTTP client.
	http_client: Client,
	/// Base URL of the selected host, without a trailing slash.
	base_url: String,
	/// Per-request timeout.
	timeout: Duration,
	/// Endpoint of the known-wallets list, when the network publishes one.
	known_wallets_url: Option<String>,
}

impl HttpClientService {
	/// Create a new client.
	///
	/// # Arguments
	/// * `http_client` - The shared reqwest client.
	/// * `base_url` - The host's API root.
	/// * `timeout` - Per-request timeout; defaults to [`DEFAULT_REQUEST_TIMEOUT`].
	pub fn new(http_client: Client, base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
		Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			timeout: timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
			known_wallets_url: None,
		}
	}

	pub fn with_known_wallets_url(mut self, url: Option<String>) -> Self {
		self.known_wallets_url = url;
		self
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}

	fn retry_policy() -> ExponentialBackoff {
		ExponentialBackoff {
			max_elapsed_time: Some(MAX_RETRY_ELAPSED),
			..ExponentialBackoff::default()
		}
	}

	/// Send a request built by `build`, retrying transient failures, and
	/// decode the `{data}` envelope.
	async fn send<T, F>(&self, url: &str, build: F) -> Result<T, LookupError>
	where
		T: DeserializeOwned + Send,
		F: Fn() -> reqwest::RequestBuilder + Sync,
	{
		let build = &build;
		let timeout = self.timeout;

		backoff::future::retry(Self::retry_policy(), move || async move {
			let response = build()
				.timeout(timeout)
				.send()
				.await
				.map_err(|e| {
					if e.is_connect() || e.is_timeout() {
						warn!("Transient failure requesting {}: {}", url, e);
						backoff::Error::transient(LookupError::HttpError(e))
					} else {
						backoff::Error::permanent(LookupError::HttpError(e))
					}
				})?;

			let status = response.status();
			if !status.is_success() {
				let error = LookupError::StatusError {
					status: status.as_u16(),
					url: url.to_string(),
				};
				return Err(if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
					warn!("Retrying {} after status {}", url, status);
					backoff::Error::transient(error)
				} else {
					backoff::Error::permanent(error)
				});
			}

			let body = response
				.bytes()
				.await
				.map_err(|e| backoff::Error::permanent(LookupError::HttpError(e)))?;
			let envelope: ApiResponse<T> = serde_json::from_slice(&body)
				.map_err(|e| backoff::Error::permanent(LookupError::JsonError(e)))?;

			Ok(envelope.data)
		})
		.await
	}

	async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> Result<T, LookupError> {
		let url = self.url(path);
		debug!("GET {}", url);
		self.send(&url, || self.http_client.get(&url)).await
	}
}

#[async_trait::async_trait]
impl ClientService for HttpClientService {
	async fn wallets(&self, identifiers: &[WalletIdentifier]) -> Result<Vec<WalletData>, LookupError> {
		if identifiers.is_empty() {
			return Ok(Vec::new());
		}

		let url = self.url("wallets/search");
		let body = json!({ "identifiers": identifiers });
		debug!("POST {} with {} identifiers", url, identifiers.len());

		self.send(&url, || self.http_client.post(&url).json(&body))
			.await
	}

	async fn delegates(&self) -> Result<Vec<Delegate>, LookupError> {
		self.get("delegates").await
	}

	async fn fees(&self) -> Result<TransactionFees, LookupError> {
		self.get("node/fees").await
	}

	async fn known_wallets(&self) -> Result<Vec<KnownWallet>, LookupError> {
		match &self.known_wallets_url {
			Some(url) => {
				let url = url.clone();
				debug!("GET {}", url);
				self.send(&url, || self.http_client.get(&url)).await
			}
			None => self.get("wallets/known").await,
		}
	}
}

/// Factory producing [`HttpClientService`] instances that share one reqwest client.
#[derive(Clone)]
pub struct HttpClientFactory {
	http_client: Client,
}

impl HttpClientFactory {
	pub fn new(http_client: Client) -> Self {
		Self { http_client }
	}
}

impl ClientFactory for HttpClientFactory {
	fn make(
		&self,
		manifest: &NetworkManifest,
		host: &Host,
		timeout: Option<Duration>,
	) -> Arc<dyn ClientService> {
		Arc::new(
			HttpClientService::new(self.http_client.clone(), host.url.clone(), timeout)
				.with_known_wallets_url(manifest.known_wallets_url.clone()),
		)
	}
}
