use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed key/value holder with default-value semantics.
///
/// Keys are usually a small enum so that every attribute an entity can carry
/// is known at compile time. Absent keys never fail; callers choose between
/// `Option` (`get`) and an explicit fallback (`get_or`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
	serialize = "K: Serialize + Ord, V: Serialize",
	deserialize = "K: Deserialize<'de> + Ord, V: Deserialize<'de>"
))]
pub struct AttributeBag<K, V> {
	attributes: BTreeMap<K, V>,
}

impl<K: Ord + Clone, V: Clone> AttributeBag<K, V> {
	pub fn new() -> Self {
		Self {
			attributes: BTreeMap::new(),
		}
	}

	pub fn all(&self) -> &BTreeMap<K, V> {
		&self.attributes
	}

	pub fn get(&self, key: &K) -> Option<&V> {
		self.attributes.get(key)
	}

	/// Get the value for `key`, or `default` when it was never set.
	pub fn get_or(&self, key: &K, default: V) -> V {
		self.attributes.get(key).cloned().unwrap_or(default)
	}

	pub fn set(&mut self, key: K, value: V) {
		self.attributes.insert(key, value);
	}

	pub fn set_many(&mut self, values: impl IntoIterator<Item = (K, V)>) {
		for (key, value) in values {
			self.set(key, value);
		}
	}

	pub fn has(&self, key: &K) -> bool {
		self.attributes.contains_key(key)
	}

	pub fn missing(&self, key: &K) -> bool {
		!self.has(key)
	}

	pub fn forget(&mut self, key: &K) {
		self.attributes.remove(key);
	}
}

impl<K: Ord + Clone, V: Clone> Default for AttributeBag<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
	enum Key {
		Name,
		Avatar,
	}

	#[test]
	fn get_or_falls_back_only_when_missing() {
		let mut bag = AttributeBag::new();
		assert_eq!(bag.get_or(&Key::Name, "anonymous".to_string()), "anonymous");

		bag.set(Key::Name, "John".to_string());
		assert_eq!(bag.get_or(&Key::Name, "anonymous".to_string()), "John");
		assert!(bag.has(&Key::Name));
		assert!(bag.missing(&Key::Avatar));
	}

	#[test]
	fn set_many_and_forget() {
		let mut bag = AttributeBag::new();
		bag.set_many([(Key::Name, 1), (Key::Avatar, 2)]);
		assert_eq!(bag.all().len(), 2);

		bag.forget(&Key::Avatar);
		assert_eq!(bag.get(&Key::Avatar), None);
		assert_eq!(bag.get(&Key::Name), Some(&1));
	}
}
