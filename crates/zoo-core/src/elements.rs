//! Element data: the per-type custom fields stored on an item.
//!
//! Element payloads are free-form JSON. Repeatable elements are usually stored
//! as an object keyed by instance index (`{"0": {"value": "..."}}`), but any
//! shape is accepted. The search data of an element is every scalar leaf of
//! its payload joined by a space; it feeds the search table the order
//! resolver sorts on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementData(Value);

impl ElementData {
	pub fn new(value: Value) -> Self {
		Self(value)
	}

	pub fn value(&self) -> &Value {
		&self.0
	}

	pub fn into_value(self) -> Value {
		self.0
	}

	/// Text written to the search table, `None` when the element holds nothing.
	pub fn search_data(&self) -> Option<String> {
		search_value(&self.0)
	}

	pub fn is_empty(&self) -> bool {
		self.search_data().is_none()
	}
}

impl From<Value> for ElementData {
	fn from(value: Value) -> Self {
		Self(value)
	}
}

impl From<&str> for ElementData {
	fn from(value: &str) -> Self {
		Self(Value::String(value.to_string()))
	}
}

impl From<String> for ElementData {
	fn from(value: String) -> Self {
		Self(Value::String(value))
	}
}

/// Flattens the scalar leaves of `value` into one search string.
pub fn search_value(value: &Value) -> Option<String> {
	let mut parts = Vec::new();
	collect_leaves(value, &mut parts);
	if parts.is_empty() {
		None
	} else {
		Some(parts.join(" "))
	}
}

fn collect_leaves(value: &Value, parts: &mut Vec<String>) {
	match value {
		Value::Null => {}
		Value::Bool(_) => {}
		Value::Number(n) => parts.push(n.to_string()),
		Value::String(s) => {
			let trimmed = s.trim();
			if !trimmed.is_empty() {
				parts.push(trimmed.to_string());
			}
		}
		Value::Array(values) => values.iter().for_each(|v| collect_leaves(v, parts)),
		Value::Object(map) => map.values().for_each(|v| collect_leaves(v, parts)),
	}
}
