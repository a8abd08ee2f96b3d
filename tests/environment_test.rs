//! Integration tests for booting, migrating and persisting an environment on disk.

use std::sync::Arc;

use serde_json::{Value, json};
use tempfile::TempDir;

use profile_env::coins::{ManifestRegistry, NetworkHostSelector};
use profile_env::config::{EnvironmentConfig, StorageKind};
use profile_env::environment::{
	BlobStore, Container, Environment, FileBlobStore, Migration, Migrator, Version,
};
use profile_env::exchange::{
	ExchangeStatus, ExchangeTransactionDetail, ExchangeTransactionInput, ExchangeTransactionUpdate,
};
use profile_env::profile::Wallet;
use profile_env::testing::{
	MockClientFactory, MockClientService, MockLedgerTransport, MockLedgerTransportFactory,
	MockPriceFeed,
};

fn file_container(dir: &TempDir) -> Arc<Container> {
	let client = Arc::new(MockClientService::new());
	Arc::new(Container {
		manifests: ManifestRegistry::builtin(),
		host_selector: NetworkHostSelector::new(),
		client_factory: Arc::new(MockClientFactory::new(client)),
		ledger_factory: Arc::new(MockLedgerTransportFactory::new(Arc::new(
			MockLedgerTransport::new(),
		))),
		price_feed: Arc::new(MockPriceFeed::new()),
		storage: Arc::new(FileBlobStore::new(dir.path().to_path_buf())),
		request_timeout: None,
	})
}

fn config(dir: &TempDir) -> EnvironmentConfig {
	EnvironmentConfig {
		data_dir: dir.path().to_path_buf(),
		storage: StorageKind::File,
		..EnvironmentConfig::default()
	}
}

fn detail(ticker: &str) -> ExchangeTransactionDetail {
	ExchangeTransactionDetail {
		address: "AXXX".to_string(),
		amount: 10.0,
		ticker: ticker.to_string(),
		hash: None,
	}
}

#[tokio::test]
async fn file_store_round_trips_and_writes_metadata() {
	let dir = TempDir::new().expect("temp dir");
	let store = FileBlobStore::new(dir.path().join("nested"));

	assert_eq!(store.get("environment").await.unwrap(), None);
	store.set("environment", "{\"a\":1}").await.unwrap();
	assert_eq!(
		store.get("environment").await.unwrap().as_deref(),
		Some("{\"a\":1}")
	);

	let metadata: Value = serde_json::from_str(
		&std::fs::read_to_string(dir.path().join("nested/environment.meta.json")).unwrap(),
	)
	.unwrap();
	assert_eq!(metadata["bytes"], 7);
	assert!(metadata["timestamp"].is_string());

	store.forget("environment").await.unwrap();
	assert_eq!(store.get("environment").await.unwrap(), None);
	store.forget("environment").await.unwrap();
}

#[tokio::test]
async fn persisted_profiles_survive_a_reboot() {
	let dir = TempDir::new().expect("temp dir");

	let order_id = {
		let mut environment = Environment::boot(config(&dir), file_container(&dir))
			.await
			.expect("boot");
		let profile = environment.profiles_mut().create("Jane");
		let mut profile = profile.lock().await;
		profile
			.wallets_mut()
			.push(Wallet::from_address("ARK", "mainnet", "AXXX"))
			.unwrap();
		let transaction = profile
			.exchange_transactions_mut()
			.create(ExchangeTransactionInput {
				order_id: "order-1".to_string(),
				provider: "changenow".to_string(),
				input: detail("btc"),
				output: detail("ark"),
			});
		profile
			.exchange_transactions_mut()
			.update(
				transaction.id(),
				ExchangeTransactionUpdate {
					status: Some(ExchangeStatus::Confirming),
					..Default::default()
				},
			)
			.unwrap();
		drop(profile);

		environment.persist().await.expect("persist");
		transaction.id().to_string()
	};

	let environment = Environment::boot(config(&dir), file_container(&dir))
		.await
		.expect("reboot");

	assert_eq!(environment.schema_version(), Version::new(1, 2, 0));
	assert_eq!(environment.profiles().count(), 1);

	let profile = environment.profiles().values()[0].clone();
	let profile = profile.lock().await;
	assert_eq!(profile.name(), "Jane");
	assert_eq!(profile.wallets().count(), 1);

	let transaction = profile
		.exchange_transactions()
		.find_by_id(&order_id)
		.expect("transaction restored");
	assert_eq!(transaction.status(), ExchangeStatus::Confirming);
	assert!(transaction.is_pending());
	assert_eq!(profile.exchange_transactions().pending().len(), 1);
}

#[tokio::test]
async fn failed_migration_keeps_stored_version_for_the_next_boot() {
	let dir = TempDir::new().expect("temp dir");
	let store = FileBlobStore::new(dir.path().to_path_buf());
	store
		.set(
			"environment",
			&json!({"schemaVersion": "1.2.0", "profiles": {"p1": {"attributes": {"name": "Jane"}}}})
				.to_string(),
		)
		.await
		.unwrap();

	let broken = Migrator::new(vec![Migration::new(Version::new(2, 0, 0), |_, _| {
		Err("disk full".to_string())
	})]);
	let result = Environment::boot_with(config(&dir), file_container(&dir), broken).await;
	assert!(result.is_err());

	let stored: Value = serde_json::from_str(&store.get("environment").await.unwrap().unwrap()).unwrap();
	assert_eq!(stored["schemaVersion"], "1.2.0");

	let fixed = Migrator::new(vec![Migration::new(Version::new(2, 0, 0), |_, data| {
		data.entry("data")
			.or_insert_with(|| json!({}));
		Ok(())
	})]);
	let environment = Environment::boot_with(config(&dir), file_container(&dir), fixed)
		.await
		.expect("second boot migrates");
	assert_eq!(environment.schema_version(), Version::new(2, 0, 0));

	let stored: Value = serde_json::from_str(&store.get("environment").await.unwrap().unwrap()).unwrap();
	assert_eq!(stored["schemaVersion"], "2.0.0");
	assert_eq!(stored["profiles"]["p1"]["data"], json!({}));
}
