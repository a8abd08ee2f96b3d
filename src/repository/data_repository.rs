//! Ordered in-memory map with one-level snapshot/restore.
//!
//! This is the store that profile settings, profile data and the environment's
//! `AppData` live in. Keys are unique, insertion order is preserved for every
//! ordered accessor, and at most one snapshot is held at a time.

use super::types::RepositoryError;
use super::value::Indexable;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct DataRepository<V> {
	entries: Vec<(String, V)>,
	snapshot: Option<Vec<(String, V)>>,
}

impl<V: Clone> DataRepository<V> {
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
			snapshot: None,
		}
	}

	fn position(&self, key: &str) -> Option<usize> {
		self.entries.iter().position(|(k, _)| k == key)
	}

	/// All entries in insertion order.
	pub fn all(&self) -> Vec<(String, V)> {
		self.entries.clone()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn first(&self) -> Option<&V> {
		self.entries.first().map(|(_, v)| v)
	}

	pub fn last(&self) -> Option<&V> {
		self.entries.last().map(|(_, v)| v)
	}

	pub fn keys(&self) -> Vec<String> {
		self.entries.iter().map(|(k, _)| k.clone()).collect()
	}

	pub fn values(&self) -> Vec<V> {
		self.entries.iter().map(|(_, v)| v.clone()).collect()
	}

	pub fn get(&self, key: &str) -> Option<&V> {
		self.position(key).map(|index| &self.entries[index].1)
	}

	pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
		self.position(key).map(|index| &mut self.entries[index].1)
	}

	/// Get the value for `key`, or `default` when the key is absent.
	pub fn get_or(&self, key: &str, default: V) -> V {
		self.get(key).cloned().unwrap_or(default)
	}

	/// Insert or overwrite. Overwriting keeps the key's original position.
	pub fn set(&mut self, key: impl Into<String>, value: V) {
		let key = key.into();
		match self.position(&key) {
			Some(index) => self.entries[index].1 = value,
			None => self.entries.push((key, value)),
		}
	}

	pub fn has(&self, key: &str) -> bool {
		self.position(key).is_some()
	}

	pub fn missing(&self, key: &str) -> bool {
		!self.has(key)
	}

	/// Replace the whole content with `entries`, keeping their order.
	pub fn fill(&mut self, entries: impl IntoIterator<Item = (String, V)>) {
		self.entries.clear();
		for (key, value) in entries {
			self.set(key, value);
		}
	}

	pub fn forget(&mut self, key: &str) {
		if let Some(index) = self.position(key) {
			self.entries.remove(index);
		}
	}

	/// Drop every entry. A previously taken snapshot is left untouched.
	pub fn flush(&mut self) {
		self.entries.clear();
	}

	pub fn count(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Capture the current state, replacing any earlier snapshot.
	pub fn snapshot(&mut self) {
		debug!("Taking snapshot of {} entries", self.entries.len());
		self.snapshot = Some(self.entries.clone());
	}

	/// Return to the state captured by the last `snapshot()`.
	///
	/// The snapshot is kept, so restoring twice yields the same state.
	pub fn restore(&mut self) -> Result<(), RepositoryError> {
		let snapshot = self.snapshot.clone().ok_or(RepositoryError::NoSnapshot)?;
		debug!("Restoring snapshot of {} entries", snapshot.len());
		self.flush();
		self.fill(snapshot);
		Ok(())
	}
}

impl<V: Clone + Indexable> DataRepository<V> {
	/// Remove element `index` from the array stored under `key`.
	///
	/// Absent keys, non-array values and out-of-range indices are no-ops.
	pub fn forget_index(&mut self, key: &str, index: usize) {
		if let Some(value) = self.get_mut(key) {
			value.remove_index(index);
		}
	}
}

impl<V: Clone + Serialize> DataRepository<V> {
	/// Serialize to a JSON object whose key order matches insertion order.
	///
	/// `fill` on the parsed result reproduces this repository.
	pub fn to_serializable(&self) -> Result<String, RepositoryError> {
		Ok(serde_json::to_string(self)?)
	}
}

impl<V: Clone> Default for DataRepository<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V: Clone> FromIterator<(String, V)> for DataRepository<V> {
	fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
		let mut repository = Self::new();
		repository.fill(iter);
		repository
	}
}

impl<V: Serialize> Serialize for DataRepository<V> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;
		for (key, value) in &self.entries {
			map.serialize_entry(key, value)?;
		}
		map.end()
	}
}

struct DataRepositoryVisitor<V>(PhantomData<V>);

impl<'de, V: Clone + Deserialize<'de>> Visitor<'de> for DataRepositoryVisitor<V> {
	type Value = DataRepository<V>;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a map of string keys")
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
		let mut repository = DataRepository::new();
		while let Some((key, value)) = access.next_entry::<String, V>()? {
			repository.set(key, value);
		}
		Ok(repository)
	}
}

impl<'de, V: Clone + Deserialize<'de>> Deserialize<'de> for DataRepository<V> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_map(DataRepositoryVisitor(PhantomData))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::repository::Setting;
	use serde_json::json;

	fn subject() -> DataRepository<serde_json::Value> {
		let mut repository = DataRepository::new();
		repository.set("a", json!(1));
		repository.set("b", json!([1, 2, 3]));
		repository.set("c", json!("three"));
		repository
	}

	#[test]
	fn preserves_insertion_order() {
		let mut repository = subject();
		repository.set("a", json!(10));

		assert_eq!(repository.keys(), vec!["a", "b", "c"]);
		assert_eq!(repository.first(), Some(&json!(10)));
		assert_eq!(repository.last(), Some(&json!("three")));
		assert_eq!(repository.count(), 3);
	}

	#[test]
	fn get_or_uses_default_for_absent_keys() {
		let repository = subject();
		assert_eq!(repository.get_or("missing", json!(false)), json!(false));
		assert_eq!(repository.get_or("a", json!(false)), json!(1));
		assert!(repository.get("missing").is_none());
		assert!(repository.missing("missing"));
	}

	#[test]
	fn snapshot_flush_restore_round_trip() {
		let mut repository = subject();
		repository.forget("c");
		repository.set("d", json!({"nested": true}));
		let expected = repository.all();

		repository.snapshot();
		repository.flush();
		assert!(repository.is_empty());

		repository.restore().unwrap();
		assert_eq!(repository.all(), expected);
	}

	#[test]
	fn restore_without_snapshot_fails() {
		let mut repository = subject();
		assert!(matches!(
			repository.restore(),
			Err(RepositoryError::NoSnapshot)
		));
	}

	#[test]
	fn second_snapshot_overwrites_first() {
		let mut repository = subject();
		repository.snapshot();
		repository.set("e", json!(5));
		repository.snapshot();
		repository.flush();

		repository.restore().unwrap();
		assert!(repository.has("e"));
		assert_eq!(repository.count(), 4);
	}

	#[test]
	fn flush_does_not_discard_snapshot() {
		let mut repository = subject();
		repository.snapshot();
		repository.flush();
		repository.flush();
		repository.restore().unwrap();
		assert_eq!(repository.count(), 3);
		repository.flush();
		repository.restore().unwrap();
		assert_eq!(repository.count(), 3);
	}

	#[test]
	fn forget_index_removes_exactly_one_element() {
		let mut repository = subject();
		repository.forget_index("b", 1);
		assert_eq!(repository.get("b"), Some(&json!([1, 3])));
	}

	#[test]
	fn forget_index_out_of_range_or_missing_is_noop() {
		let mut repository = subject();
		repository.forget_index("b", 3);
		repository.forget_index("missing", 0);
		repository.forget_index("a", 0);
		assert_eq!(repository.get("b"), Some(&json!([1, 2, 3])));
		assert_eq!(repository.get("a"), Some(&json!(1)));
	}

	#[test]
	fn forget_index_on_settings() {
		let mut repository: DataRepository<Setting> = DataRepository::new();
		repository.set("k", Setting::from(vec![1i64, 2, 3]));
		repository.forget_index("k", 1);
		assert_eq!(repository.get("k"), Some(&Setting::from(vec![1i64, 3])));
	}

	#[test]
	fn serializable_round_trips_through_fill() {
		let repository = subject();
		let serialized = repository.to_serializable().unwrap();

		let parsed: DataRepository<serde_json::Value> = serde_json::from_str(&serialized).unwrap();
		let mut restored = DataRepository::new();
		restored.fill(parsed.all());

		assert_eq!(restored.all(), repository.all());
	}
}
