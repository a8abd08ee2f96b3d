use crate::network::WalletData;

use std::collections::HashMap;
use tokio::sync::RwLock;

/// Registered usernames per network and address, fed by wallet synchronization.
#[derive(Default)]
pub struct UsernameService {
	usernames: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl UsernameService {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record the usernames reported in `wallets` for `network` (a `coin.network` key).
	pub async fn record(&self, network: &str, wallets: &[WalletData]) {
		let mut usernames = self.usernames.write().await;
		let entries = usernames.entry(network.to_string()).or_default();
		for wallet in wallets {
			match &wallet.username {
				Some(username) => {
					entries.insert(wallet.address.clone(), username.clone());
				}
				None => {
					entries.remove(&wallet.address);
				}
			}
		}
	}

	pub async fn username(&self, network: &str, address: &str) -> Option<String> {
		self.usernames
			.read()
			.await
			.get(network)?
			.get(address)
			.cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn data(address: &str, username: Option<&str>) -> WalletData {
		WalletData {
			address: address.to_string(),
			public_key: None,
			balance: "0".to_string(),
			nonce: None,
			username: username.map(str::to_string),
		}
	}

	#[tokio::test]
	async fn latest_report_wins() {
		let usernames = UsernameService::new();
		usernames
			.record("ARK.mainnet", &[data("A1", Some("genesis")), data("A2", None)])
			.await;
		assert_eq!(usernames.username("ARK.mainnet", "A1").await.as_deref(), Some("genesis"));
		assert_eq!(usernames.username("ARK.mainnet", "A2").await, None);
		assert_eq!(usernames.username("ARK.devnet", "A1").await, None);

		usernames.record("ARK.mainnet", &[data("A1", None)]).await;
		assert_eq!(usernames.username("ARK.mainnet", "A1").await, None);
	}
}
