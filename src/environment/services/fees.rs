use super::profile_coins;
use crate::coins::Coin;
use crate::environment::EnvironmentError;
use crate::network::{FeeStatistics, LookupError, TransactionFees};
use crate::profile::SharedProfile;

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Fee statistics per network and transaction type.
#[derive(Default)]
pub struct FeeService {
	fees: RwLock<HashMap<String, TransactionFees>>,
}

impl FeeService {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn sync(&self, coin: &Coin) -> Result<(), LookupError> {
		let fees = coin.client().fees().await?;
		debug!("Fetched fees for {} transaction types on {}", fees.len(), coin.key());
		self.fees.write().await.insert(coin.key(), fees);
		Ok(())
	}

	pub async fn sync_all(&self, profile: &SharedProfile) -> Result<(), EnvironmentError> {
		for coin in profile_coins(profile).await? {
			self.sync(&coin).await?;
		}
		Ok(())
	}

	pub async fn all(&self, coin: &str, network: &str) -> Option<TransactionFees> {
		self.fees
			.read()
			.await
			.get(&format!("{}.{}", coin, network))
			.cloned()
	}

	pub async fn find_by_type(
		&self,
		coin: &str,
		network: &str,
		transaction_type: &str,
	) -> Option<FeeStatistics> {
		self.all(coin, network).await?.remove(transaction_type)
	}
}
