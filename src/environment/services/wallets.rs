//! Keeps wallet balances, nonces and usernames in line with the network.

use super::usernames::UsernameService;
use crate::coins::{Coin, MAX_HOST_FAILURES};
use crate::environment::EnvironmentError;
use crate::network::WalletIdentifier;
use crate::profile::SharedProfile;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum identifiers sent in one lookup request.
const LOOKUP_CHUNK_SIZE: usize = 50;

pub struct WalletService {
	usernames: Arc<UsernameService>,
}

impl WalletService {
	pub fn new(usernames: Arc<UsernameService>) -> Self {
		Self { usernames }
	}

	/// Refresh every wallet of the profile, one network at a time.
	///
	/// The profile is only locked while reading identifiers and while applying results, never
	/// across a network request. Failures count against the custom host that served the request.
	pub async fn sync_all(&self, profile: &SharedProfile) -> Result<(), EnvironmentError> {
		let networks = profile.lock().await.wallets().networks();

		for (coin_name, network) in networks {
			let (coin, identifiers) = {
				let mut guard = profile.lock().await;
				let coin = guard.coin(&coin_name, &network)?;
				let identifiers: Vec<WalletIdentifier> = guard
					.wallets()
					.by_coin(&coin_name, &network)
					.into_iter()
					.map(|wallet| wallet.identifier(coin.manifest()))
					.collect();
				(coin, identifiers)
			};

			match self.sync_network(&coin, profile, &identifiers).await {
				Ok(updated) => {
					let mut guard = profile.lock().await;
					guard.hosts_mut().record_success(&coin.key(), &coin.host().url);
					info!("Synchronized {} wallets on {}", updated, coin.key());
				}
				Err(e) => {
					let mut guard = profile.lock().await;
					let failures = guard
						.hosts_mut()
						.record_failure(&coin.key(), &coin.host().url);
					if failures.is_some_and(|count| count >= MAX_HOST_FAILURES) {
						warn!(
							"Host {} reached {} failures, dropping cached coin instances",
							coin.host().url,
							MAX_HOST_FAILURES
						);
						guard.coins_mut().flush();
					}
					return Err(e);
				}
			}
		}

		Ok(())
	}

	async fn sync_network(
		&self,
		coin: &Coin,
		profile: &SharedProfile,
		identifiers: &[WalletIdentifier],
	) -> Result<usize, EnvironmentError> {
		let client = coin.client();
		let mut found = Vec::new();
		for chunk in identifiers.chunks(LOOKUP_CHUNK_SIZE) {
			found.extend(client.wallets(chunk).await?);
		}
		debug!(
			"Lookup for {} identifiers on {} returned {} wallets",
			identifiers.len(),
			coin.key(),
			found.len()
		);

		self.usernames.record(&coin.key(), &found).await;

		let by_address: HashMap<&str, _> = found
			.iter()
			.map(|data| (data.address.as_str(), data))
			.collect();

		let mut guard = profile.lock().await;
		let ids: Vec<String> = guard
			.wallets()
			.by_coin(&coin.manifest().coin, &coin.manifest().network)
			.into_iter()
			.filter(|wallet| by_address.contains_key(wallet.address.as_str()))
			.map(|wallet| wallet.id.clone())
			.collect();

		for id in &ids {
			let wallet = guard.wallets_mut().find_by_id_mut(id)?;
			if let Some(data) = by_address.get(wallet.address.as_str()) {
				wallet.apply_data(data);
			}
		}

		Ok(ids.len())
	}
}
