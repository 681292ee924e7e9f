//! Lifecycle-aware repositories.
//!
//! Each repository validates before it persists, removes dependent rows on
//! delete and owns the [`Signal`](zoo_core::Signal)s other components connect
//! to. Repositories are cheap to clone; clones share the pool and receivers.

mod application;
mod category;
mod comment;
mod item;
mod tag;

pub use application::ApplicationRepository;
pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use item::ItemRepository;
pub use tag::{TagRepository, normalize_tags};
