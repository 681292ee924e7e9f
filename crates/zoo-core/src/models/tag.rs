use serde::{Deserialize, Serialize};

/// A tag name with the number of items carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
	pub name: String,
	pub items: i64,
}
