//! Logging setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::settings::{LoggingSettings, SettingsError};

/// Builds the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}

/// Installs a global fmt subscriber.
///
/// Fails when a global subscriber is already installed.
pub fn init(settings: &LoggingSettings) -> Result<(), SettingsError> {
	tracing_subscriber::registry()
		.with(env_filter(settings))
		.with(tracing_subscriber::fmt::layer())
		.try_init()
		.map_err(|e| SettingsError::Logging(e.to_string()))
}
