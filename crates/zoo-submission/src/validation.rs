//! Element validation and the filtering applied to untrusted input.

use serde_json::Value;

use crate::submission::ElementConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
	#[error("This field is required")]
	Required,

	#[error("{0}")]
	Invalid(String),
}

/// Turns posted element data into the value bound to the item
///
/// Element types with their own rules plug in their own implementation.
pub trait ElementValidator: Send + Sync {
	fn validate(
		&self,
		config: &ElementConfig,
		value: Option<&Value>,
		trusted: bool,
	) -> Result<Value, ValidationError>;
}

/// Trims text and enforces `required`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidator;

impl ElementValidator for DefaultValidator {
	fn validate(
		&self,
		config: &ElementConfig,
		value: Option<&Value>,
		_trusted: bool,
	) -> Result<Value, ValidationError> {
		let value = value.map(trim_strings).unwrap_or(Value::Null);
		if config.required && is_blank(&value) {
			return Err(ValidationError::Required);
		}
		Ok(value)
	}
}

fn trim_strings(value: &Value) -> Value {
	match value {
		Value::String(text) => Value::String(text.trim().to_string()),
		Value::Array(values) => Value::Array(values.iter().map(trim_strings).collect()),
		Value::Object(map) => Value::Object(
			map.iter()
				.map(|(key, value)| (key.clone(), trim_strings(value)))
				.collect(),
		),
		other => other.clone(),
	}
}

/// True for null, empty text and containers holding only blank values.
pub fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(text) => text.trim().is_empty(),
		Value::Array(values) => values.iter().all(is_blank),
		Value::Object(map) => map.values().all(is_blank),
		_ => false,
	}
}

/// Removes markup from every string in `value`.
///
/// ```
/// use serde_json::json;
/// use zoo_submission::validation::filter_data;
///
/// let filtered = filter_data(&json!({"text": "<b>bold</b> <script>x()</script>move"}));
/// assert_eq!(filtered, json!({"text": "bold x()move"}));
/// ```
pub fn filter_data(value: &Value) -> Value {
	match value {
		Value::String(text) => Value::String(strip_tags(text)),
		Value::Array(values) => Value::Array(values.iter().map(filter_data).collect()),
		Value::Object(map) => Value::Object(
			map.iter()
				.map(|(key, value)| (key.clone(), filter_data(value)))
				.collect(),
		),
		other => other.clone(),
	}
}

fn strip_tags(text: &str) -> String {
	let mut result = String::with_capacity(text.len());
	let mut in_tag = false;
	for c in text.chars() {
		match c {
			'<' => in_tag = true,
			'>' if in_tag => in_tag = false,
			_ if !in_tag => result.push(c),
			_ => {}
		}
	}
	result
}
