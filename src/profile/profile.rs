//! A user profile and everything it owns.

use super::contacts::ContactRepository;
use super::hosts::HostRepository;
use super::types::{ProfileAttribute, ProfileError, SETTING_FALLBACK_TO_DEFAULT_NODES};
use super::wallets::{ImportMethod, Wallet, WalletRepository};
use crate::coins::{Coin, CoinOptions, CoinService, NetworkManifest};
use crate::environment::Container;
use crate::exchange::ExchangeTransactionRepository;
use crate::ledger::LedgerWallet;
use crate::repository::{AttributeBag, DataRepository, Setting};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Persisted shape of one profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileData {
	pub id: String,
	pub attributes: AttributeBag<ProfileAttribute, String>,
	pub settings: DataRepository<Setting>,
	pub data: DataRepository<Value>,
	pub contacts: ContactRepository,
	pub exchange_transactions: Map<String, Value>,
	pub networks: HostRepository,
	pub wallets: WalletRepository,
}

pub struct Profile {
	id: String,
	attributes: AttributeBag<ProfileAttribute, String>,
	settings: DataRepository<Setting>,
	data: DataRepository<Value>,
	contacts: ContactRepository,
	exchange_transactions: ExchangeTransactionRepository,
	hosts: HostRepository,
	wallets: WalletRepository,
	coins: CoinService,
	container: Arc<Container>,
}

impl Profile {
	pub fn new(id: impl Into<String>, name: impl Into<String>, container: Arc<Container>) -> Self {
		let mut attributes = AttributeBag::new();
		attributes.set(ProfileAttribute::Name, name.into());
		attributes.set(ProfileAttribute::CreatedAt, chrono::Utc::now().to_rfc3339());

		Self {
			id: id.into(),
			attributes,
			settings: DataRepository::new(),
			data: DataRepository::new(),
			contacts: ContactRepository::new(),
			exchange_transactions: ExchangeTransactionRepository::new(),
			hosts: HostRepository::new(),
			wallets: WalletRepository::new(),
			coins: CoinService::new(container.clone()),
			container,
		}
	}

	/// Restore a profile from its persisted shape. Coin instances are not persisted and start empty.
	pub fn from_data(data: ProfileData, container: Arc<Container>) -> Result<Self, ProfileError> {
		let mut exchange_transactions = ExchangeTransactionRepository::new();
		exchange_transactions.fill(&data.exchange_transactions)?;

		Ok(Self {
			id: data.id,
			attributes: data.attributes,
			settings: data.settings,
			data: data.data,
			contacts: data.contacts,
			exchange_transactions,
			hosts: data.networks,
			wallets: data.wallets,
			coins: CoinService::new(container.clone()),
			container,
		})
	}

	pub fn to_data(&self) -> Result<ProfileData, ProfileError> {
		Ok(ProfileData {
			id: self.id.clone(),
			attributes: self.attributes.clone(),
			settings: self.settings.clone(),
			data: self.data.clone(),
			contacts: self.contacts.clone(),
			exchange_transactions: self.exchange_transactions.to_object()?,
			networks: self.hosts.clone(),
			wallets: self.wallets.clone(),
		})
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn name(&self) -> String {
		self.attributes
			.get_or(&ProfileAttribute::Name, String::new())
	}

	pub fn attributes(&self) -> &AttributeBag<ProfileAttribute, String> {
		&self.attributes
	}

	pub fn attributes_mut(&mut self) -> &mut AttributeBag<ProfileAttribute, String> {
		&mut self.attributes
	}

	pub fn settings(&self) -> &DataRepository<Setting> {
		&self.settings
	}

	pub fn settings_mut(&mut self) -> &mut DataRepository<Setting> {
		&mut self.settings
	}

	pub fn data(&self) -> &DataRepository<Value> {
		&self.data
	}

	pub fn data_mut(&mut self) -> &mut DataRepository<Value> {
		&mut self.data
	}

	pub fn contacts(&self) -> &ContactRepository {
		&self.contacts
	}

	pub fn contacts_mut(&mut self) -> &mut ContactRepository {
		&mut self.contacts
	}

	pub fn exchange_transactions(&self) -> &ExchangeTransactionRepository {
		&self.exchange_transactions
	}

	pub fn exchange_transactions_mut(&mut self) -> &mut ExchangeTransactionRepository {
		&mut self.exchange_transactions
	}

	pub fn hosts(&self) -> &HostRepository {
		&self.hosts
	}

	pub fn hosts_mut(&mut self) -> &mut HostRepository {
		&mut self.hosts
	}

	pub fn wallets(&self) -> &WalletRepository {
		&self.wallets
	}

	pub fn wallets_mut(&mut self) -> &mut WalletRepository {
		&mut self.wallets
	}

	pub fn coins(&self) -> &CoinService {
		&self.coins
	}

	pub fn coins_mut(&mut self) -> &mut CoinService {
		&mut self.coins
	}

	/// Options used to construct coin instances for `manifest` on behalf of this profile.
	pub fn coin_options(&self, manifest: &NetworkManifest) -> CoinOptions {
		let fallback_to_default = self
			.settings
			.get(SETTING_FALLBACK_TO_DEFAULT_NODES)
			.and_then(Setting::as_bool)
			.unwrap_or(true);

		CoinOptions {
			timeout: self.container.request_timeout,
			custom_hosts: self.hosts.all_by_network(&manifest.key()).to_vec(),
			fallback_to_default,
		}
	}

	/// Cached coin instance for `(coin, network)`, constructed with this profile's options.
	pub fn coin(&mut self, coin: &str, network: &str) -> Result<Arc<Coin>, ProfileError> {
		if let Ok(instance) = self.coins.get(coin, network) {
			return Ok(instance);
		}

		let options = match self.container.manifests.find(coin, network) {
			Some(manifest) => self.coin_options(manifest),
			None => CoinOptions::default(),
		};
		Ok(self.coins.set(coin, network, &options)?)
	}

	/// Add the wallets found by a ledger scan. Addresses already in the profile are skipped.
	pub fn import_ledger_wallets(
		&mut self,
		coin: &str,
		network: &str,
		discovered: &[LedgerWallet],
	) -> Result<Vec<Wallet>, ProfileError> {
		let mut imported = Vec::new();

		for found in discovered {
			if self
				.wallets
				.find_by_address(coin, network, &found.address)
				.is_some()
			{
				debug!("Skipping known ledger wallet {}", found.address);
				continue;
			}

			let mut wallet = Wallet::from_address(coin, network, found.address.clone());
			wallet.import_method = ImportMethod::Ledger;
			wallet.public_key = Some(found.public_key.clone());
			wallet.derivation_path = Some(found.path.clone());
			wallet.apply_data(&found.data);

			self.wallets.push(wallet.clone())?;
			imported.push(wallet);
		}

		info!(
			"Imported {} of {} ledger wallets into profile {}",
			imported.len(),
			discovered.len(),
			self.id
		);
		Ok(imported)
	}
}

impl std::fmt::Debug for Profile {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Profile")
			.field("id", &self.id)
			.field("wallets", &self.wallets.count())
			.finish()
	}
}
