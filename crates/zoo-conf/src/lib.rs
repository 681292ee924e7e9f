//! # zoo-conf
//!
//! Layered settings for the ZOO content store.
//!
//! Settings are assembled from built-in defaults, an optional TOML file and
//! `ZOO_`-prefixed environment variables, in that order of increasing
//! priority. The [`logging`] module turns the logging section into a
//! `tracing` subscriber.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zoo_conf::{ZooSettings, logging};
//!
//! let settings = ZooSettings::load(Some("zoo.toml".as_ref()))?;
//! logging::init(&settings.logging)?;
//! ```
//!
//! ## Example file
//!
//! ```toml
//! [database]
//! url = "sqlite://zoo.db"
//!
//! [submission]
//! time_between_public_submissions = 300
//! secret = "change-me"
//!
//! [thumbnail]
//! quality = 85
//! ```

pub mod logging;
pub mod settings;
pub mod sources;

pub use settings::{
	DatabaseSettings, LoggingSettings, SettingsBuilder, SettingsError, SubmissionSettings,
	ThumbnailSettings, ZooSettings,
};
pub use sources::{ConfigSource, EnvSource, SourceError, TomlFileSource};
