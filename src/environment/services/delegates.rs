use super::profile_coins;
use crate::coins::Coin;
use crate::environment::EnvironmentError;
use crate::network::{Delegate, LookupError};
use crate::profile::SharedProfile;

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Delegate lists per network.
#[derive(Default)]
pub struct DelegateService {
	delegates: RwLock<HashMap<String, Vec<Delegate>>>,
}

impl DelegateService {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn sync(&self, coin: &Coin) -> Result<(), LookupError> {
		let delegates = coin.client().delegates().await?;
		debug!("Fetched {} delegates for {}", delegates.len(), coin.key());
		self.delegates.write().await.insert(coin.key(), delegates);
		Ok(())
	}

	/// Refresh every network the profile holds wallets on.
	pub async fn sync_all(&self, profile: &SharedProfile) -> Result<(), EnvironmentError> {
		let coins = profile_coins(profile).await?;
		for coin in &coins {
			self.sync(coin).await?;
		}
		info!("Synchronized delegates for {} networks", coins.len());
		Ok(())
	}

	/// Delegates of `coin.network`, `None` until the network was synchronized.
	pub async fn all(&self, coin: &str, network: &str) -> Option<Vec<Delegate>> {
		self.delegates
			.read()
			.await
			.get(&format!("{}.{}", coin, network))
			.cloned()
	}

	pub async fn find_by_username(&self, coin: &str, network: &str, username: &str) -> Option<Delegate> {
		self.all(coin, network)
			.await?
			.into_iter()
			.find(|delegate| delegate.username == username)
	}

	pub async fn find_by_address(&self, coin: &str, network: &str, address: &str) -> Option<Delegate> {
		self.all(coin, network)
			.await?
			.into_iter()
			.find(|delegate| delegate.address == address)
	}
}
