//! Typed settings for the content store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::sources::{ConfigSource, EnvSource, SourceError, TomlFileSource};

/// Settings errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to load {source_name}: {error}")]
	Source {
		source_name: String,
		#[source]
		error: SourceError,
	},

	#[error("Invalid settings: {0}")]
	Invalid(String),

	#[error("Logging setup failed: {0}")]
	Logging(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
	/// Any URL understood by `sqlx::AnyPool` (`sqlite:`, `mysql://`, `postgres://`)
	pub url: String,
	pub max_connections: u32,
}

impl Default for DatabaseSettings {
	fn default() -> Self {
		Self {
			url: "sqlite::memory:".to_string(),
			max_connections: 5,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionSettings {
	/// Minimum seconds between two public submissions from one session
	pub time_between_public_submissions: u64,
	/// Items per page on the "my submissions" listing
	pub pagination_limit: u64,
	/// Prefix of every session key the workflow writes
	pub session_prefix: String,
	/// Key for the form hash
	pub secret: String,
}

impl Default for SubmissionSettings {
	fn default() -> Self {
		Self {
			time_between_public_submissions: 300,
			pagination_limit: 20,
			session_prefix: "ZOO_".to_string(),
			secret: String::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
	pub quality: u8,
	pub resize: bool,
	/// Directory cached thumbnails are written to
	pub cache_dir: PathBuf,
}

impl Default for ThumbnailSettings {
	fn default() -> Self {
		Self {
			quality: 90,
			resize: true,
			cache_dir: PathBuf::from("media/zoo/images"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// `EnvFilter` directive used when `RUST_LOG` is not set
	pub level: String,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
		}
	}
}

/// All settings of the content store
///
/// # Examples
///
/// ```
/// use zoo_conf::ZooSettings;
///
/// let settings = ZooSettings::default();
/// assert_eq!(settings.submission.time_between_public_submissions, 300);
/// assert_eq!(settings.thumbnail.quality, 90);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZooSettings {
	pub database: DatabaseSettings,
	pub submission: SubmissionSettings,
	pub thumbnail: ThumbnailSettings,
	pub logging: LoggingSettings,
}

impl ZooSettings {
	/// Defaults, then `path` (when given), then `ZOO_` environment variables.
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let mut builder = SettingsBuilder::new();
		if let Some(path) = path {
			builder = builder.add_source(TomlFileSource::new(path));
		}
		builder.add_source(EnvSource::new()).build()
	}

	pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
		self.database.url = url.into();
		self
	}

	pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
		self.submission.secret = secret.into();
		self
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.database.url.is_empty() {
			return Err(SettingsError::Invalid("database.url must not be empty".into()));
		}
		if self.database.max_connections == 0 {
			return Err(SettingsError::Invalid(
				"database.max_connections must be at least 1".into(),
			));
		}
		if !(1..=100).contains(&self.thumbnail.quality) {
			return Err(SettingsError::Invalid(format!(
				"thumbnail.quality must be between 1 and 100, got {}",
				self.thumbnail.quality
			)));
		}
		if self.submission.pagination_limit == 0 {
			return Err(SettingsError::Invalid(
				"submission.pagination_limit must be at least 1".into(),
			));
		}
		Ok(())
	}
}

/// Merges configuration sources by priority into [`ZooSettings`]
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	pub fn build(mut self) -> Result<ZooSettings, SettingsError> {
		self.sources.sort_by_key(|source| source.priority());

		let mut merged = serde_json::to_value(ZooSettings::default())
			.map_err(|e| SettingsError::Invalid(e.to_string()))?;

		for source in &self.sources {
			let layer = source.load().map_err(|error| SettingsError::Source {
				source_name: source.description(),
				error,
			})?;
			tracing::debug!(source = %source.description(), keys = layer.len(), "loaded settings source");
			for (key, value) in layer {
				if let Value::Object(root) = &mut merged {
					match root.get_mut(&key) {
						Some(existing) => merge_value(existing, value),
						None => {
							root.insert(key, value);
						}
					}
				}
			}
		}

		let settings: ZooSettings =
			serde_json::from_value(merged).map_err(|e| SettingsError::Invalid(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}
}

/// Deep merge of `overlay` into `target`.
///
/// Scalars coming from untyped sources are coerced back to a string when the
/// existing value is a string, so a numeric-looking secret stays a string.
fn merge_value(target: &mut Value, overlay: Value) {
	match overlay {
		Value::Object(overlay) if target.is_object() => {
			let Value::Object(target) = target else {
				return;
			};
			for (key, value) in overlay {
				match target.get_mut(&key) {
					Some(existing) => merge_value(existing, value),
					None => {
						target.insert(key, value);
					}
				}
			}
		}
		Value::Number(n) if target.is_string() => *target = Value::String(n.to_string()),
		Value::Bool(b) if target.is_string() => *target = Value::String(b.to_string()),
		other => *target = other,
	}
}
