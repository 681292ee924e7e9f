//! # zoo-db
//!
//! Persistence for the ZOO content store.
//!
//! ## Features
//!
//! - **Order resolution**: [`OrderSpec`] tokens become a join against the
//!   search table plus backend-specific ORDER BY terms
//! - **Listings**: items by ids, first character, tag, type, category and
//!   owner; category trees with item counts; tag clouds; comment threads
//! - **Repositories**: validation, cascading deletes and typed lifecycle
//!   signals for items, categories, comments and tags
//! - **Backends**: SQLite, MySQL and PostgreSQL through `sqlx::AnyPool`,
//!   statements built with `sea-query`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zoo_db::prelude::*;
//! use zoo_core::{Application, Item, sluggify};
//!
//! let store = ContentStore::connect("sqlite::memory:", 1).await?;
//! store.install().await?;
//!
//! let mut blog = Application::new("Blog", "blog");
//! store.applications.save(&mut blog).await?;
//!
//! let mut item = Item::new(blog.id, "article", "Hello").with_alias(sluggify("Hello"));
//! store.items.save(&mut item).await?;
//!
//! let latest = store
//!     .items
//!     .by_type("article", Some(blog.id), &Scope::all(), &OrderSpec::parse("rdate"), Page::all(), false)
//!     .await?;
//! ```

pub mod backend;
pub mod error;
pub mod order;
pub mod query;
pub mod repository;
pub mod schema;
pub mod scope;
pub mod store;

pub use backend::{Database, DatabaseBackend};
pub use error::{CategoryError, CommentError, DbError, DbResult, ItemError, TagError};
pub use order::{OrderHook, OrderSpec, ResolvedOrder};
pub use query::item::{UserItemFilter, UserOrder};
pub use query::tag::{TagOrder, TagQuery};
pub use repository::{
	ApplicationRepository, CategoryRepository, CommentRepository, ItemRepository, TagRepository,
	normalize_tags,
};
pub use scope::{Page, Scope};
pub use store::ContentStore;

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::backend::{Database, DatabaseBackend};
	pub use crate::error::{CategoryError, CommentError, DbError, ItemError, TagError};
	pub use crate::order::{OrderHook, OrderSpec};
	pub use crate::query::item::{UserItemFilter, UserOrder};
	pub use crate::query::tag::{TagOrder, TagQuery};
	pub use crate::scope::{Page, Scope};
	pub use crate::store::ContentStore;
}
