//! Market data collaborator used to keep exchange rates warm.

use super::types::LookupError;

use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Source of spot prices between a coin ticker and a fiat/crypto currency.
#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
	async fn rate(&self, ticker: &str, currency: &str) -> Result<f64, LookupError>;
}

/// CryptoCompare-style price endpoint: `GET {base}/data/price?fsym=ARK&tsyms=USD`
/// answering `{"USD": 0.25}`.
#[derive(Clone)]
pub struct HttpPriceFeed {
	http_client: Client,
	base_url: String,
	timeout: Duration,
}

impl HttpPriceFeed {
	pub fn new(http_client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
		Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			timeout,
		}
	}
}

#[async_trait::async_trait]
impl PriceFeed for HttpPriceFeed {
	async fn rate(&self, ticker: &str, currency: &str) -> Result<f64, LookupError> {
		let url = format!("{}/data/price", self.base_url);
		debug!("Fetching {} rate for {} from {}", currency, ticker, url);

		let response = self
			.http_client
			.get(&url)
			.query(&[("fsym", ticker), ("tsyms", currency)])
			.timeout(self.timeout)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(LookupError::StatusError {
				status: response.status().as_u16(),
				url,
			});
		}

		let prices: HashMap<String, f64> = response.json().await?;
		prices
			.get(&currency.to_uppercase())
			.copied()
			.ok_or(LookupError::NoData)
	}
}
