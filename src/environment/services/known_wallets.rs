use super::profile_coins;
use crate::coins::Coin;
use crate::environment::EnvironmentError;
use crate::network::{KnownWallet, LookupError};
use crate::profile::SharedProfile;

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Addresses publicly attributed to exchanges and teams, per network.
#[derive(Default)]
pub struct KnownWalletService {
	registry: RwLock<HashMap<String, Vec<KnownWallet>>>,
}

impl KnownWalletService {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn sync(&self, coin: &Coin) -> Result<(), LookupError> {
		let wallets = coin.client().known_wallets().await?;
		debug!("Fetched {} known wallets for {}", wallets.len(), coin.key());
		self.registry.write().await.insert(coin.key(), wallets);
		Ok(())
	}

	pub async fn sync_all(&self, profile: &SharedProfile) -> Result<(), EnvironmentError> {
		for coin in profile_coins(profile).await? {
			self.sync(&coin).await?;
		}
		Ok(())
	}

	async fn find(&self, network: &str, address: &str) -> Option<KnownWallet> {
		self.registry
			.read()
			.await
			.get(network)?
			.iter()
			.find(|wallet| wallet.address == address)
			.cloned()
	}

	/// Display name for `address` on `network` (a `coin.network` key).
	pub async fn name(&self, network: &str, address: &str) -> Option<String> {
		self.find(network, address).await.map(|wallet| wallet.name)
	}

	pub async fn is_known(&self, network: &str, address: &str) -> bool {
		self.find(network, address).await.is_some()
	}

	pub async fn is_exchange(&self, network: &str, address: &str) -> bool {
		self.has_type(network, address, "exchange").await
	}

	pub async fn is_team(&self, network: &str, address: &str) -> bool {
		self.has_type(network, address, "team").await
	}

	async fn has_type(&self, network: &str, address: &str, kind: &str) -> bool {
		self.find(network, address)
			.await
			.is_some_and(|wallet| wallet.kind == kind)
	}
}
