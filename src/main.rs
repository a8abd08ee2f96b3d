use profile_env::config::EnvironmentConfig;
use profile_env::environment::{Container, Environment, EnvironmentError};
use profile_env::utils::format_balance;

use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!("Starting profile environment");

	if let Err(e) = run(EnvironmentConfig::from_env()).await {
		error!("Profile environment failed: {}", e);
		std::process::exit(1);
	}
}

async fn run(config: EnvironmentConfig) -> Result<(), EnvironmentError> {
	let container = Arc::new(Container::from_config(&config));
	let mut environment = Environment::boot(config, container).await?;

	info!(
		"Booted environment at schema version {} with {} profiles",
		environment.schema_version(),
		environment.profiles().count()
	);

	if environment.profiles().count() == 0 {
		environment.profiles_mut().create("Default");
	}

	for profile in environment.profiles().values() {
		let synchronizer = environment.synchronizer(profile.clone());
		synchronizer.run_all().await;
		if let Some(failure) = synchronizer.error() {
			warn!("Job {} failed at {}: {}", failure.job, failure.timestamp, failure.error);
		}

		let profile = profile.lock().await;
		for wallet in profile.wallets().values() {
			let decimals = environment
				.container()
				.manifests
				.find(&wallet.coin, &wallet.network)
				.map_or(0, |manifest| manifest.decimals);
			info!(
				"{} {}: {}",
				wallet.network_key(),
				wallet.address,
				format_balance(&wallet.balance, decimals)
			);
		}
	}

	environment.persist().await?;
	info!("Profile environment persisted");
	Ok(())
}
