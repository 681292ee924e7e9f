//! Free-form parameter bags attached to items, categories and submissions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object addressed with dotted keys such as `config.primary_category`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
	pub fn new() -> Self {
		Self(Map::new())
	}

	/// Parses a stored JSON object. Empty or invalid text yields an empty bag.
	pub fn from_json(text: &str) -> Self {
		match serde_json::from_str::<Value>(text) {
			Ok(Value::Object(map)) => Self(map),
			_ => Self::new(),
		}
	}

	pub fn to_json(&self) -> String {
		Value::Object(self.0.clone()).to_string()
	}

	/// Looks up a dotted key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		let mut parts = key.split('.');
		let first = parts.next()?;
		let mut current = self.0.get(first)?;
		for part in parts {
			current = current.as_object()?.get(part)?;
		}
		Some(current)
	}

	pub fn get_i64(&self, key: &str) -> Option<i64> {
		match self.get(key)? {
			Value::Number(n) => n.as_i64(),
			Value::String(s) => s.trim().parse().ok(),
			Value::Bool(b) => Some(i64::from(*b)),
			_ => None,
		}
	}

	pub fn get_bool(&self, key: &str) -> Option<bool> {
		match self.get(key)? {
			Value::Bool(b) => Some(*b),
			Value::Number(n) => n.as_i64().map(|n| n != 0),
			Value::String(s) => match s.trim() {
				"1" | "true" => Some(true),
				"0" | "false" | "" => Some(false),
				_ => None,
			},
			_ => None,
		}
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key)?.as_str()
	}

	/// Sets a dotted key, creating intermediate objects as needed.
	///
	/// A non-object value sitting on the path is replaced by an object.
	pub fn set(&mut self, key: &str, value: impl Into<Value>) {
		let mut parts: Vec<&str> = key.split('.').collect();
		let Some(last) = parts.pop() else {
			return;
		};

		let mut current = &mut self.0;
		for part in parts {
			let entry = current
				.entry(part.to_string())
				.or_insert_with(|| Value::Object(Map::new()));
			if !entry.is_object() {
				*entry = Value::Object(Map::new());
			}
			current = match entry {
				Value::Object(map) => map,
				_ => return,
			};
		}
		current.insert(last.to_string(), value.into());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Map<String, Value>> for Params {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}
