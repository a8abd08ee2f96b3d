//! Environment boot and persistence.
//!
//! Boot loads the combined environment blob, verifies its shape, runs pending migrations and
//! restores every profile. Persistence writes the whole environment back as one blob; it is not
//! transactional across profiles, a failed write may leave the stored blob partially updated.

use super::container::Container;
use super::migrations::{Migrator, Version};
use super::services::{
	AppData, DelegateService, ExchangeRateService, FeeService, KnownWalletService, PluginRegistry,
	UsernameService, WalletService,
};
use super::types::{EnvironmentError, MigrationError};
use crate::config::EnvironmentConfig;
use crate::ledger::{LedgerDiscoveryService, LedgerTransport};
use crate::profile::{ProfileRepository, SharedProfile};
use crate::synchronizer::{JobFuture, Synchronizer};

use serde_json::{Map, Value, json};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Environment {
	config: EnvironmentConfig,
	container: Arc<Container>,
	schema_version: Version,
	data: AppData,
	plugins: PluginRegistry,
	profiles: ProfileRepository,
	delegates: Arc<DelegateService>,
	exchange_rates: Arc<ExchangeRateService>,
	fees: Arc<FeeService>,
	known_wallets: Arc<KnownWalletService>,
	usernames: Arc<UsernameService>,
	wallets: Arc<WalletService>,
}

impl Environment {
	/// Boot with the built-in migrations.
	pub async fn boot(
		config: EnvironmentConfig,
		container: Arc<Container>,
	) -> Result<Self, EnvironmentError> {
		Self::boot_with(config, container, Migrator::builtin()).await
	}

	pub async fn boot_with(
		config: EnvironmentConfig,
		container: Arc<Container>,
		migrator: Migrator,
	) -> Result<Self, EnvironmentError> {
		let target = config.schema_version.unwrap_or_else(|| migrator.latest());
		info!("Booting environment with schema version {}", target);

		let usernames = Arc::new(UsernameService::new());
		let mut environment = Self {
			schema_version: target,
			data: AppData::new(),
			plugins: PluginRegistry::new(),
			profiles: ProfileRepository::new(container.clone()),
			delegates: Arc::new(DelegateService::new()),
			exchange_rates: Arc::new(ExchangeRateService::new(
				container.price_feed.clone(),
				config.exchange_currency.clone(),
			)),
			fees: Arc::new(FeeService::new()),
			known_wallets: Arc::new(KnownWalletService::new()),
			wallets: Arc::new(WalletService::new(usernames.clone())),
			usernames,
			config,
			container,
		};

		let Some(blob) = environment.container.storage.get(&environment.config.storage_key).await? else {
			info!("No persisted environment found, starting empty");
			return Ok(environment);
		};

		let mut persisted: Value = serde_json::from_str(&blob)?;
		Self::verify(&persisted)?;

		let stored = persisted.get("schemaVersion").cloned();
		environment.schema_version = migrator.migrate(&mut persisted, target)?;

		if stored.as_ref() != persisted.get("schemaVersion") {
			// Record the new version before anything else can fail.
			environment
				.container
				.storage
				.set(&environment.config.storage_key, &serde_json::to_string(&persisted)?)
				.await?;
			info!("Stored migrated environment at {}", environment.schema_version);
		}

		environment.restore(persisted)?;
		Ok(environment)
	}

	/// Check the persisted blob has the shape boot expects.
	pub fn verify(persisted: &Value) -> Result<(), EnvironmentError> {
		let root = persisted
			.as_object()
			.ok_or_else(|| MigrationError::Malformed("expected an object".to_string()))?;

		for key in ["profiles", "data", "plugins"] {
			match root.get(key) {
				None | Some(Value::Object(_)) => {}
				Some(_) => {
					return Err(MigrationError::Malformed(format!("{} must be an object", key)).into());
				}
			}
		}

		if let Some(version) = root.get("schemaVersion") {
			let version = version
				.as_str()
				.ok_or_else(|| MigrationError::InvalidVersion(version.to_string()))?;
			version.parse::<Version>()?;
		}

		Ok(())
	}

	fn restore(&mut self, mut persisted: Value) -> Result<(), EnvironmentError> {
		if let Some(data) = persisted.get_mut("data").map(Value::take) {
			self.data = serde_json::from_value(data)?;
		}
		if let Some(plugins) = persisted.get_mut("plugins").map(Value::take) {
			self.plugins = serde_json::from_value(plugins)?;
		}
		match persisted.get("profiles").and_then(Value::as_object) {
			Some(profiles) => self.profiles.fill(profiles)?,
			None => warn!("Persisted environment has no profiles"),
		}

		debug!(
			"Restored {} profiles, {} data entries, {} plugins",
			self.profiles.count(),
			self.data.count(),
			self.plugins.count()
		);
		Ok(())
	}

	/// Write every profile, the app data and the plugin registry as one blob.
	pub async fn persist(&self) -> Result<(), EnvironmentError> {
		let profiles: Map<String, Value> = self.profiles.to_object().await?;
		let blob = json!({
			"schemaVersion": self.schema_version.to_string(),
			"data": self.data,
			"plugins": self.plugins,
			"profiles": profiles,
		});

		self.container
			.storage
			.set(&self.config.storage_key, &serde_json::to_string(&blob)?)
			.await?;
		info!("Persisted {} profiles", self.profiles.count());
		Ok(())
	}

	/// Synchronizer wired with the standard jobs for `profile`. It is not started.
	pub fn synchronizer(&self, profile: SharedProfile) -> Synchronizer {
		let intervals = &self.config.sync;
		let mut synchronizer = Synchronizer::new();

		let service = self.wallets.clone();
		synchronizer.add(
			"wallets",
			intervals.wallets,
			job(&profile, move |profile| {
				let service = service.clone();
				async move { service.sync_all(&profile).await }
			}),
		);

		let service = self.delegates.clone();
		synchronizer.add(
			"delegates",
			intervals.delegates,
			job(&profile, move |profile| {
				let service = service.clone();
				async move { service.sync_all(&profile).await }
			}),
		);

		let service = self.fees.clone();
		synchronizer.add(
			"fees",
			intervals.fees,
			job(&profile, move |profile| {
				let service = service.clone();
				async move { service.sync_all(&profile).await }
			}),
		);

		let service = self.exchange_rates.clone();
		synchronizer.add(
			"exchange_rates",
			intervals.exchange_rates,
			job(&profile, move |profile| {
				let service = service.clone();
				async move { service.sync_all(&profile).await }
			}),
		);

		let service = self.known_wallets.clone();
		synchronizer.add(
			"known_wallets",
			intervals.known_wallets,
			job(&profile, move |profile| {
				let service = service.clone();
				async move { service.sync_all(&profile).await }
			}),
		);

		synchronizer
	}

	/// Discovery scan over `transport` for the profile's `coin.network` instance, bounded by the
	/// configured discovery settings.
	pub async fn ledger_discovery(
		&self,
		profile: &SharedProfile,
		coin: &str,
		network: &str,
		transport: Arc<dyn LedgerTransport>,
	) -> Result<LedgerDiscoveryService, EnvironmentError> {
		let coin = profile.lock().await.coin(coin, network)?;
		debug!(
			"Ledger discovery for {} capped at {} pages",
			coin.key(),
			self.config.discovery.max_pages
		);
		Ok(coin.ledger_discovery(transport, self.config.discovery.clone()))
	}

	pub fn config(&self) -> &EnvironmentConfig {
		&self.config
	}

	pub fn container(&self) -> &Arc<Container> {
		&self.container
	}

	pub fn schema_version(&self) -> Version {
		self.schema_version
	}

	pub fn profiles(&self) -> &ProfileRepository {
		&self.profiles
	}

	pub fn profiles_mut(&mut self) -> &mut ProfileRepository {
		&mut self.profiles
	}

	pub fn data(&self) -> &AppData {
		&self.data
	}

	pub fn data_mut(&mut self) -> &mut AppData {
		&mut self.data
	}

	pub fn plugins(&self) -> &PluginRegistry {
		&self.plugins
	}

	pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
		&mut self.plugins
	}

	pub fn delegates(&self) -> Arc<DelegateService> {
		self.delegates.clone()
	}

	pub fn exchange_rates(&self) -> Arc<ExchangeRateService> {
		self.exchange_rates.clone()
	}

	pub fn fees(&self) -> Arc<FeeService> {
		self.fees.clone()
	}

	pub fn known_wallets(&self) -> Arc<KnownWalletService> {
		self.known_wallets.clone()
	}

	pub fn usernames(&self) -> Arc<UsernameService> {
		self.usernames.clone()
	}

	pub fn wallets(&self) -> Arc<WalletService> {
		self.wallets.clone()
	}
}

/// Adapt a per-profile sync function into a synchronizer job.
fn job<F, Fut>(profile: &SharedProfile, run: F) -> impl Fn() -> JobFuture + Send + Sync + 'static
where
	F: Fn(SharedProfile) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<(), EnvironmentError>> + Send + 'static,
{
	let profile = profile.clone();
	move || -> JobFuture { Box::pin(run(profile.clone())) }
}
