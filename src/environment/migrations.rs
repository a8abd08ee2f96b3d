//! Schema migrations for persisted environment data.
//!
//! Persisted data carries the `schemaVersion` it was written with. On boot every migration whose
//! version lies in `(stored, target]` is applied to each profile in ascending semantic-version
//! order, and the target version is recorded only after all of them succeeded. A failure leaves the
//! recorded version untouched, so the same migrations run again on the next boot; every migration
//! must therefore check the shape of the data before changing it.

use super::types::MigrationError;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Semantic version `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
	pub major: u64,
	pub minor: u64,
	pub patch: u64,
}

impl Version {
	pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
		Self {
			major,
			minor,
			patch,
		}
	}
}

impl FromStr for Version {
	type Err = MigrationError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let invalid = || MigrationError::InvalidVersion(value.to_string());
		let parts = value
			.trim()
			.trim_start_matches('v')
			.split('.')
			.map(|part| part.parse::<u64>().map_err(|_| invalid()))
			.collect::<Result<Vec<_>, _>>()?;

		match parts.as_slice() {
			[major, minor, patch] => Ok(Self::new(*major, *minor, *patch)),
			_ => Err(invalid()),
		}
	}
}

impl TryFrom<String> for Version {
	type Error = MigrationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<Version> for String {
	fn from(version: Version) -> Self {
		version.to_string()
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
	}
}

type MigrationFn = dyn Fn(&str, &mut Map<String, Value>) -> Result<(), String> + Send + Sync;

/// A transform applied to every persisted profile when upgrading past `version`.
pub struct Migration {
	version: Version,
	apply: Box<MigrationFn>,
}

impl Migration {
	/// `apply` receives the profile id and its persisted data.
	pub fn new<F>(version: Version, apply: F) -> Self
	where
		F: Fn(&str, &mut Map<String, Value>) -> Result<(), String> + Send + Sync + 'static,
	{
		Self {
			version,
			apply: Box::new(apply),
		}
	}

	pub fn version(&self) -> Version {
		self.version
	}
}

impl fmt::Debug for Migration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Migration")
			.field("version", &self.version)
			.finish()
	}
}

#[derive(Debug, Default)]
pub struct Migrator {
	migrations: Vec<Migration>,
}

impl Migrator {
	pub fn new(mut migrations: Vec<Migration>) -> Self {
		migrations.sort_by(|a, b| a.version.cmp(&b.version));
		Self { migrations }
	}

	/// Migrator carrying the built-in migrations.
	pub fn builtin() -> Self {
		Self::new(vec![
			Migration::new(Version::new(1, 1, 0), ensure_profile_collections),
			Migration::new(Version::new(1, 2, 0), contacts_keyed_by_id),
		])
	}

	/// Latest version any registered migration upgrades to.
	pub fn latest(&self) -> Version {
		self.migrations
			.last()
			.map(Migration::version)
			.unwrap_or_default()
	}

	/// Migrate `persisted` (`{schemaVersion, profiles: {id: {...}}}`) up to `target`.
	///
	/// Returns the version recorded in `persisted` afterwards.
	pub fn migrate(&self, persisted: &mut Value, target: Version) -> Result<Version, MigrationError> {
		let root = persisted
			.as_object_mut()
			.ok_or_else(|| MigrationError::Malformed("expected an object".to_string()))?;

		let stored = match root.get("schemaVersion") {
			Some(Value::String(version)) => version.parse()?,
			Some(other) => return Err(MigrationError::InvalidVersion(other.to_string())),
			None => Version::default(),
		};

		if stored.cmp(&target) != Ordering::Less {
			debug!("Schema version {} is up to date with {}", stored, target);
			return Ok(stored);
		}

		let profiles = root
			.entry("profiles")
			.or_insert_with(|| Value::Object(Map::new()))
			.as_object_mut()
			.ok_or_else(|| MigrationError::Malformed("profiles must be an object".to_string()))?;

		for migration in self
			.migrations
			.iter()
			.filter(|migration| migration.version > stored && migration.version <= target)
		{
			info!("Applying migration {} to {} profiles", migration.version, profiles.len());

			for (id, profile) in profiles.iter_mut() {
				let data = profile.as_object_mut().ok_or_else(|| MigrationError::Failed {
					version: migration.version.to_string(),
					profile: id.clone(),
					reason: "profile data must be an object".to_string(),
				})?;

				(migration.apply)(id, data).map_err(|reason| MigrationError::Failed {
					version: migration.version.to_string(),
					profile: id.clone(),
					reason,
				})?;
			}
		}

		root.insert("schemaVersion".to_string(), Value::String(target.to_string()));
		info!("Migrated environment data from {} to {}", stored, target);

		Ok(target)
	}
}

/// 1.1.0: every profile carries `exchangeTransactions` and `networks`.
fn ensure_profile_collections(_: &str, data: &mut Map<String, Value>) -> Result<(), String> {
	for key in ["exchangeTransactions", "networks"] {
		match data.get(key) {
			Some(Value::Object(_)) => {}
			None | Some(Value::Null) => {
				data.insert(key.to_string(), Value::Object(Map::new()));
			}
			Some(_) => return Err(format!("{} must be an object", key)),
		}
	}
	Ok(())
}

/// 1.2.0: contacts used to be stored as an array; they are keyed by id now.
fn contacts_keyed_by_id(_: &str, data: &mut Map<String, Value>) -> Result<(), String> {
	let Some(Value::Array(contacts)) = data.get("contacts") else {
		return Ok(());
	};

	let mut keyed = Map::new();
	for contact in contacts {
		let mut contact = contact
			.as_object()
			.cloned()
			.ok_or_else(|| "contacts must be objects".to_string())?;
		let id = match contact.get("id").and_then(Value::as_str) {
			Some(id) => id.to_string(),
			None => {
				let id = uuid::Uuid::new_v4().to_string();
				contact.insert("id".to_string(), Value::String(id.clone()));
				id
			}
		};
		keyed.insert(id, Value::Object(contact));
	}

	data.insert("contacts".to_string(), Value::Object(keyed));
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn legacy() -> Value {
		json!({
			"profiles": {
				"a": {
					"settings": {},
					"contacts": [{"id": "c1", "name": "Jane"}, {"name": "John"}]
				},
				"b": {
					"settings": {},
					"networks": {"ARK.mainnet": []}
				}
			}
		})
	}

	#[test]
	fn parses_and_orders_versions() {
		let version: Version = "1.10.0".parse().unwrap();
		assert!(version > "1.9.3".parse().unwrap());
		assert_eq!(version.to_string(), "1.10.0");
		assert!("1.2".parse::<Version>().is_err());
		assert!("one.two.three".parse::<Version>().is_err());
	}

	#[test]
	fn applies_pending_migrations_in_order() {
		let mut data = legacy();
		let version = Migrator::builtin()
			.migrate(&mut data, Version::new(1, 2, 0))
			.unwrap();

		assert_eq!(version, Version::new(1, 2, 0));
		assert_eq!(data["schemaVersion"], "1.2.0");
		assert_eq!(data["profiles"]["a"]["exchangeTransactions"], json!({}));
		assert_eq!(data["profiles"]["b"]["networks"], json!({"ARK.mainnet": []}));
		assert_eq!(data["profiles"]["a"]["contacts"]["c1"]["name"], "Jane");
		assert_eq!(data["profiles"]["a"]["contacts"].as_object().unwrap().len(), 2);
	}

	#[test]
	fn migrations_are_idempotent() {
		let mut once = legacy();
		for (_, profile) in once["profiles"].as_object_mut().unwrap() {
			let data = profile.as_object_mut().unwrap();
			ensure_profile_collections("p", data).unwrap();
			contacts_keyed_by_id("p", data).unwrap();
		}

		let mut twice = once.clone();
		for (_, profile) in twice["profiles"].as_object_mut().unwrap() {
			let data = profile.as_object_mut().unwrap();
			ensure_profile_collections("p", data).unwrap();
			contacts_keyed_by_id("p", data).unwrap();
		}

		assert_eq!(once, twice);
	}

	#[test]
	fn skips_migrations_at_or_below_stored_version() {
		let mut data = legacy();
		data["schemaVersion"] = json!("1.1.0");
		Migrator::builtin()
			.migrate(&mut data, Version::new(1, 2, 0))
			.unwrap();

		// 1.1.0 already ran, so the missing collections are not added again
		assert!(data["profiles"]["a"].get("exchangeTransactions").is_none());
		assert!(data["profiles"]["a"]["contacts"].is_object());
	}

	#[test]
	fn does_not_run_migrations_beyond_target() {
		let mut data = legacy();
		Migrator::builtin()
			.migrate(&mut data, Version::new(1, 1, 0))
			.unwrap();

		assert_eq!(data["schemaVersion"], "1.1.0");
		assert!(data["profiles"]["a"]["contacts"].is_array());
	}

	#[test]
	fn failed_migration_leaves_version_unchanged() {
		let migrator = Migrator::new(vec![
			Migration::new(Version::new(2, 0, 0), |_, _| Err("boom".to_string())),
			Migration::new(Version::new(1, 5, 0), |_, data| {
				data.insert("touched".to_string(), json!(true));
				Ok(())
			}),
		]);
		let mut data = json!({"schemaVersion": "1.0.0", "profiles": {"a": {}}});

		let result = migrator.migrate(&mut data, Version::new(2, 0, 0));

		assert!(matches!(result, Err(MigrationError::Failed { .. })));
		assert_eq!(data["schemaVersion"], "1.0.0");
		// sorted by version: 1.5.0 ran before 2.0.0 failed
		assert_eq!(data["profiles"]["a"]["touched"], true);
	}

	#[test]
	fn latest_is_highest_registered_version() {
		assert_eq!(Migrator::builtin().latest(), Version::new(1, 2, 0));
		assert_eq!(Migrator::default().latest(), Version::default());
	}
}
