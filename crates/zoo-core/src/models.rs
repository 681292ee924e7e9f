//! Persistent value objects of the content store.

pub mod application;
pub mod category;
pub mod comment;
pub mod item;
pub mod tag;

pub use application::Application;
pub use category::Category;
pub use comment::{Comment, CommentAuthor, CommentState};
pub use item::{Item, ItemState};
pub use tag::TagCount;

use chrono::NaiveDateTime;

/// Storage format for every timestamp column (UTC).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_datetime(value: &NaiveDateTime) -> String {
	value.format(DATETIME_FORMAT).to_string()
}

/// Parses a stored timestamp, accepting an optional fractional part.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
	let text = text.trim();
	NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
		.or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
		.or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
		.ok()
}
