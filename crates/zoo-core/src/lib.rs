//! # zoo-core
//!
//! Domain types shared by every ZOO crate.
//!
//! ## Features
//!
//! - `Item`, `Category`, `Comment`, `Application` and tag value objects
//! - Element data helpers producing the per-element search values
//! - `sluggify` and `truncate` string helpers
//! - `Signal<T>`: typed, explicitly owned observer lists for lifecycle events
//! - `User` and `AccessLevels` describing the caller of a listing or workflow
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zoo_core::prelude::*;
//!
//! let item = Item::new(1, "article", "Hello World").with_alias(sluggify("Hello World"));
//! assert_eq!(item.alias, "hello-world");
//!
//! let saved = Signal::<SaveEvent<Item>>::new("item.saved");
//! saved.connect(|event| async move {
//!     tracing::info!(item = %event.instance.name, new = event.is_new, "item saved");
//!     Ok(())
//! });
//! ```

pub mod elements;
pub mod events;
pub mod models;
pub mod params;
pub mod signals;
pub mod strings;
pub mod user;

pub use elements::{ElementData, search_value};
pub use events::{
	CommentSaveEvent, DeleteEvent, SaveEvent, TagsDeletedEvent, TagsSavedEvent,
};
pub use models::{
	Application, Category, Comment, CommentAuthor, CommentState, DATETIME_FORMAT, Item,
	ItemState, TagCount, format_datetime, parse_datetime,
};
pub use params::Params;
pub use signals::{Signal, SignalError};
pub use strings::{is_slug, sluggify, truncate};
pub use user::{AccessLevels, User};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::elements::ElementData;
	pub use crate::events::{CommentSaveEvent, DeleteEvent, SaveEvent};
	pub use crate::models::{
		Application, Category, Comment, CommentAuthor, CommentState, Item, ItemState, TagCount,
	};
	pub use crate::params::Params;
	pub use crate::signals::{Signal, SignalError};
	pub use crate::strings::{is_slug, sluggify, truncate};
	pub use crate::user::{AccessLevels, User};
}
