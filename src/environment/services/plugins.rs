use crate::repository::DataRepository;

use serde::{Deserialize, Serialize};
use tracing::info;

/// An installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
	pub id: String,
	pub name: String,
	pub version: String,
	#[serde(default)]
	pub enabled: bool,
}

/// Plugins installed in an environment, keyed by plugin id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginRegistry {
	plugins: DataRepository<Plugin>,
}

impl PluginRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Install `plugin`, replacing an installed plugin with the same id.
	pub fn register(&mut self, plugin: Plugin) {
		info!("Registered plugin {} {}", plugin.id, plugin.version);
		self.plugins.set(plugin.id.clone(), plugin);
	}

	pub fn find(&self, id: &str) -> Option<&Plugin> {
		self.plugins.get(id)
	}

	pub fn all(&self) -> Vec<Plugin> {
		self.plugins.values()
	}

	pub fn enabled(&self) -> Vec<Plugin> {
		self.plugins
			.iter()
			.map(|(_, plugin)| plugin)
			.filter(|plugin| plugin.enabled)
			.cloned()
			.collect()
	}

	/// Returns `false` when no plugin with `id` is installed.
	pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
		match self.plugins.get_mut(id) {
			Some(plugin) => {
				plugin.enabled = enabled;
				true
			}
			None => false,
		}
	}

	pub fn forget(&mut self, id: &str) {
		self.plugins.forget(id);
	}

	pub fn count(&self) -> usize {
		self.plugins.count()
	}
}
