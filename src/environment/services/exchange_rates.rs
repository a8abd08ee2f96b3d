//! Exchange rates between the tickers a profile holds and its display currency.

use super::profile_coins;
use crate::environment::EnvironmentError;
use crate::network::{LookupError, PriceFeed};
use crate::profile::{SETTING_EXCHANGE_CURRENCY, SharedProfile};
use crate::repository::Setting;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate {
	pub rate: f64,
	pub updated_at: DateTime<Utc>,
}

pub struct ExchangeRateService {
	price_feed: Arc<dyn PriceFeed>,
	default_currency: String,
	rates: RwLock<HashMap<(String, String), ExchangeRate>>,
}

impl ExchangeRateService {
	pub fn new(price_feed: Arc<dyn PriceFeed>, default_currency: impl Into<String>) -> Self {
		Self {
			price_feed,
			default_currency: default_currency.into(),
			rates: RwLock::new(HashMap::new()),
		}
	}

	fn key(ticker: &str, currency: &str) -> (String, String) {
		(ticker.to_uppercase(), currency.to_uppercase())
	}

	pub async fn sync(&self, ticker: &str, currency: &str) -> Result<f64, LookupError> {
		let rate = self.price_feed.rate(ticker, currency).await?;
		debug!("{} is worth {} {}", ticker, rate, currency);
		self.rates.write().await.insert(
			Self::key(ticker, currency),
			ExchangeRate {
				rate,
				updated_at: Utc::now(),
			},
		);
		Ok(rate)
	}

	/// Refresh the rate of every ticker the profile holds in the profile's currency.
	///
	/// Every ticker is attempted; the last failure is returned after the others were refreshed.
	pub async fn sync_all(&self, profile: &SharedProfile) -> Result<(), EnvironmentError> {
		let currency = profile
			.lock()
			.await
			.settings()
			.get(SETTING_EXCHANGE_CURRENCY)
			.and_then(Setting::as_text)
			.map(str::to_string)
			.unwrap_or_else(|| self.default_currency.clone());

		let mut tickers: Vec<String> = profile_coins(profile)
			.await?
			.iter()
			.map(|coin| coin.manifest().ticker.clone())
			.collect();
		tickers.sort();
		tickers.dedup();

		let mut failure = None;
		for ticker in tickers {
			if let Err(e) = self.sync(&ticker, &currency).await {
				warn!("Failed to fetch {} rate for {}: {}", currency, ticker, e);
				failure = Some(e);
			}
		}

		match failure {
			Some(e) => Err(e.into()),
			None => Ok(()),
		}
	}

	pub async fn rate(&self, ticker: &str, currency: &str) -> Option<ExchangeRate> {
		self.rates
			.read()
			.await
			.get(&Self::key(ticker, currency))
			.copied()
	}

	/// Convert `amount` of `ticker` into `currency` using the cached rate.
	pub async fn convert(&self, ticker: &str, currency: &str, amount: f64) -> Option<f64> {
		self.rate(ticker, currency)
			.await
			.map(|exchange_rate| amount * exchange_rate.rate)
	}
}
