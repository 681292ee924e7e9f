//! # ZOO
//!
//! A content repository: applications hold typed items filed under category
//! trees, tagged, commented and searchable through per-element values.
//! Visitors submit and edit items through configured front-end forms.
//!
//! ## Feature Flags
//!
//! ### Presets
//!
//! - `minimal` - Domain types, listings and repositories
//! - `standard` - Adds layered settings and logging
//! - `full` (default) - Adds front-end submissions and thumbnails
//!
//! ### Fine-grained Control
//!
//! - `core` - Items, categories, comments, tags, users and signals
//! - `conf` - `ZooSettings` from defaults, TOML and `ZOO_` environment variables
//! - `database` - Order resolution, listing queries and repositories over `sqlx`
//! - `submission` - The submission workflow
//! - `thumbnail` - Cached image thumbnails
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use zoo::prelude::*;
//!
//! let settings = ZooSettings::load(Some("zoo.toml".as_ref()))?;
//! zoo::conf::logging::init(&settings.logging)?;
//! let store = zoo::connect(&settings.database).await?;
//!
//! let articles = store
//!     .items
//!     .by_type("article", None, &Scope::all(), &OrderSpec::parse("_itemname"), Page::all(), false)
//!     .await?;
//! ```

#[cfg(feature = "core")]
pub use zoo_core as core;

#[cfg(feature = "conf")]
pub use zoo_conf as conf;

#[cfg(feature = "database")]
pub use zoo_db as db;

#[cfg(feature = "submission")]
pub use zoo_submission as submission;

#[cfg(feature = "thumbnail")]
pub use zoo_thumbnail as thumbnail;

#[cfg(feature = "conf")]
pub use zoo_conf::{SettingsError, ZooSettings};

#[cfg(feature = "database")]
pub use zoo_db::{ContentStore, DbError, DbResult};

/// Opens the configured database and installs the schema when missing.
#[cfg(all(feature = "conf", feature = "database"))]
pub async fn connect(settings: &zoo_conf::DatabaseSettings) -> DbResult<ContentStore> {
	let store = ContentStore::connect(&settings.url, settings.max_connections).await?;
	store.install().await?;
	tracing::info!(backend = ?store.database().backend(), "content store ready");
	Ok(store)
}

/// Prelude module for convenient imports
pub mod prelude {
	#[cfg(feature = "core")]
	pub use zoo_core::prelude::*;

	#[cfg(feature = "conf")]
	pub use zoo_conf::{SubmissionSettings, ThumbnailSettings, ZooSettings};

	#[cfg(feature = "database")]
	pub use zoo_db::prelude::*;

	#[cfg(feature = "submission")]
	pub use zoo_submission::prelude::*;

	#[cfg(feature = "thumbnail")]
	pub use zoo_thumbnail::{Thumbnail, Thumbnailer};
}
