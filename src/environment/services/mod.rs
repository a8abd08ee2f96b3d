//! Environment-wide services.
//!
//! Each service is created once per environment and shared by `Arc`. The network-backed ones keep
//! a cache keyed by `coin.network` that the synchronizer refreshes; readers only ever see complete
//! entries because every refresh replaces an entry wholesale.

mod delegates;

mod exchange_rates;

mod fees;

mod known_wallets;

mod plugins;

mod usernames;

mod wallets;

pub use delegates::DelegateService;
pub use exchange_rates::{ExchangeRate, ExchangeRateService};
pub use fees::FeeService;
pub use known_wallets::KnownWalletService;
pub use plugins::{Plugin, PluginRegistry};
pub use usernames::UsernameService;
pub use wallets::WalletService;

use crate::coins::Coin;
use crate::profile::{ProfileError, SharedProfile};
use crate::repository::DataRepository;

use std::sync::Arc;

/// Free-form environment data that is not tied to a profile.
pub type AppData = DataRepository<serde_json::Value>;

/// Coin instances for every network the profile holds wallets on.
async fn profile_coins(profile: &SharedProfile) -> Result<Vec<Arc<Coin>>, ProfileError> {
	let mut profile = profile.lock().await;
	profile
		.wallets()
		.networks()
		.into_iter()
		.map(|(coin, network)| profile.coin(&coin, &network))
		.collect()
}
