use super::types::ProfileError;
use crate::coins::NetworkManifest;
use crate::network::{WalletData, WalletIdentifier};
use crate::repository::DataRepository;

use serde::{Deserialize, Serialize};

/// How a wallet was added to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportMethod {
	Address,
	PublicKey,
	ExtendedPublicKey,
	Mnemonic,
	Ledger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
	pub id: String,
	pub coin: String,
	pub network: String,
	pub address: String,
	#[serde(default)]
	pub public_key: Option<String>,
	#[serde(default)]
	pub extended_public_key: Option<String>,
	pub import_method: ImportMethod,
	#[serde(default)]
	pub derivation_path: Option<String>,
	#[serde(default)]
	pub balance: String,
	#[serde(default)]
	pub nonce: Option<String>,
	#[serde(default)]
	pub username: Option<String>,
}

impl Wallet {
	pub fn from_address(coin: &str, network: &str, address: impl Into<String>) -> Self {
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			coin: coin.to_string(),
			network: network.to_string(),
			address: address.into(),
			public_key: None,
			extended_public_key: None,
			import_method: ImportMethod::Address,
			derivation_path: None,
			balance: "0".to_string(),
			nonce: None,
			username: None,
		}
	}

	/// `coin.network` of the network this wallet lives on.
	pub fn network_key(&self) -> String {
		format!("{}.{}", self.coin, self.network)
	}

	/// Identifier used to look this wallet up remotely.
	///
	/// Wallets imported from an extended public key are looked up by it when the network supports
	/// that; everything else is looked up by address.
	pub fn identifier(&self, manifest: &NetworkManifest) -> WalletIdentifier {
		match (&self.extended_public_key, self.import_method) {
			(Some(key), ImportMethod::ExtendedPublicKey) if manifest.supports_extended_public_key => {
				WalletIdentifier::extended_public_key(key.clone())
			}
			_ => WalletIdentifier::address(self.address.clone()),
		}
	}

	/// Apply what the network reported for this wallet.
	pub fn apply_data(&mut self, data: &WalletData) {
		self.balance = data.balance.clone();
		if data.nonce.is_some() {
			self.nonce = data.nonce.clone();
		}
		if data.public_key.is_some() {
			self.public_key = data.public_key.clone();
		}
		self.username = data.username.clone();
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletRepository {
	data: DataRepository<Wallet>,
}

impl WalletRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add `wallet`; a wallet with the same address on the same network is rejected.
	pub fn push(&mut self, wallet: Wallet) -> Result<(), ProfileError> {
		if self
			.find_by_address(&wallet.coin, &wallet.network, &wallet.address)
			.is_some()
		{
			return Err(ProfileError::WalletAlreadyExists(wallet.address));
		}
		self.data.set(wallet.id.clone(), wallet);
		Ok(())
	}

	pub fn find_by_id(&self, id: &str) -> Result<&Wallet, ProfileError> {
		self.data
			.get(id)
			.ok_or_else(|| ProfileError::WalletNotFound(id.to_string()))
	}

	pub fn find_by_id_mut(&mut self, id: &str) -> Result<&mut Wallet, ProfileError> {
		self.data
			.get_mut(id)
			.ok_or_else(|| ProfileError::WalletNotFound(id.to_string()))
	}

	pub fn find_by_address(&self, coin: &str, network: &str, address: &str) -> Option<&Wallet> {
		self.data.iter().map(|(_, wallet)| wallet).find(|wallet| {
			wallet.coin == coin && wallet.network == network && wallet.address == address
		})
	}

	pub fn by_coin(&self, coin: &str, network: &str) -> Vec<&Wallet> {
		self.data
			.iter()
			.map(|(_, wallet)| wallet)
			.filter(|wallet| wallet.coin == coin && wallet.network == network)
			.collect()
	}

	pub fn forget(&mut self, id: &str) -> Result<(), ProfileError> {
		if self.data.missing(id) {
			return Err(ProfileError::WalletNotFound(id.to_string()));
		}
		self.data.forget(id);
		Ok(())
	}

	pub fn values(&self) -> Vec<Wallet> {
		self.data.values()
	}

	pub fn count(&self) -> usize {
		self.data.count()
	}

	/// Distinct `(coin, network)` pairs in wallet order.
	pub fn networks(&self) -> Vec<(String, String)> {
		let mut networks: Vec<(String, String)> = Vec::new();
		for (_, wallet) in self.data.iter() {
			let pair = (wallet.coin.clone(), wallet.network.clone());
			if !networks.contains(&pair) {
				networks.push(pair);
			}
		}
		networks
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::coins::manifest::ark_mainnet;

	#[test]
	fn identifier_depends_on_import_method_and_network() {
		let mut manifest = ark_mainnet();
		let mut wallet = Wallet::from_address("ARK", "mainnet", "AXXX");
		wallet.extended_public_key = Some("xpub".to_string());
		wallet.import_method = ImportMethod::ExtendedPublicKey;

		assert_eq!(wallet.identifier(&manifest), WalletIdentifier::address("AXXX"));

		manifest.supports_extended_public_key = true;
		assert_eq!(
			wallet.identifier(&manifest),
			WalletIdentifier::extended_public_key("xpub")
		);

		wallet.import_method = ImportMethod::Mnemonic;
		assert_eq!(wallet.identifier(&manifest), WalletIdentifier::address("AXXX"));
	}

	#[test]
	fn identifier_is_not_persisted() {
		let wallet = Wallet::from_address("ARK", "mainnet", "AXXX");
		let value = serde_json::to_value(&wallet).unwrap();
		assert!(value.get("identifier").is_none());
		assert_eq!(value["importMethod"], "address");
	}

	#[test]
	fn rejects_duplicate_addresses_per_network() {
		let mut wallets = WalletRepository::new();
		wallets.push(Wallet::from_address("ARK", "mainnet", "AXXX")).unwrap();
		wallets.push(Wallet::from_address("ARK", "devnet", "AXXX")).unwrap();

		assert!(matches!(
			wallets.push(Wallet::from_address("ARK", "mainnet", "AXXX")),
			Err(ProfileError::WalletAlreadyExists(_))
		));
		assert_eq!(wallets.by_coin("ARK", "mainnet").len(), 1);
		assert_eq!(
			wallets.networks(),
			vec![
				("ARK".to_string(), "mainnet".to_string()),
				("ARK".to_string(), "devnet".to_string()),
			]
		);
	}

	#[test]
	fn apply_data_updates_balance_and_keeps_known_keys() {
		let mut wallet = Wallet::from_address("ARK", "mainnet", "AXXX");
		wallet.public_key = Some("02aa".to_string());
		wallet.apply_data(&WalletData {
			address: "AXXX".to_string(),
			public_key: None,
			balance: "250".to_string(),
			nonce: Some("3".to_string()),
			username: Some("genesis_1".to_string()),
		});

		assert_eq!(wallet.balance, "250");
		assert_eq!(wallet.nonce.as_deref(), Some("3"));
		assert_eq!(wallet.public_key.as_deref(), Some("02aa"));
		assert_eq!(wallet.username.as_deref(), Some("genesis_1"));
	}
}
