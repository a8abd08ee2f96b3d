use serde::{Deserialize, Serialize};

/// Values that can hold an array and therefore support `forget_index`.
pub trait Indexable {
	/// Remove the element at `index` if this value is an array and the index
	/// is in range. Returns whether an element was removed.
	fn remove_index(&mut self, index: usize) -> bool;
}

/// A profile setting.
///
/// Settings are a closed set of shapes; anything richer belongs in a typed
/// repository of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Setting {
	Bool(bool),
	Integer(i64),
	Text(String),
	List(Vec<Setting>),
}

impl Setting {
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Setting::Bool(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			Setting::Integer(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Setting::Text(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Setting]> {
		match self {
			Setting::List(values) => Some(values),
			_ => None,
		}
	}
}

impl From<bool> for Setting {
	fn from(value: bool) -> Self {
		Setting::Bool(value)
	}
}

impl From<i64> for Setting {
	fn from(value: i64) -> Self {
		Setting::Integer(value)
	}
}

impl From<&str> for Setting {
	fn from(value: &str) -> Self {
		Setting::Text(value.to_string())
	}
}

impl From<String> for Setting {
	fn from(value: String) -> Self {
		Setting::Text(value)
	}
}

impl<T: Into<Setting>> From<Vec<T>> for Setting {
	fn from(values: Vec<T>) -> Self {
		Setting::List(values.into_iter().map(Into::into).collect())
	}
}

impl Indexable for Setting {
	fn remove_index(&mut self, index: usize) -> bool {
		match self {
			Setting::List(values) if index < values.len() => {
				values.remove(index);
				true
			}
			_ => false,
		}
	}
}

impl Indexable for serde_json::Value {
	fn remove_index(&mut self, index: usize) -> bool {
		match self {
			serde_json::Value::Array(values) if index < values.len() => {
				values.remove(index);
				true
			}
			_ => false,
		}
	}
}
