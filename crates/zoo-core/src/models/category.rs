use serde::{Deserialize, Serialize};

use crate::params::Params;

/// A node of an application's category tree.
///
/// `parent == 0` marks a root category. `item_ids` is only filled by listings
/// that aggregate category membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
	pub id: i64,
	pub application_id: i64,
	pub name: String,
	pub alias: String,
	pub description: String,
	pub parent: i64,
	pub ordering: i64,
	pub published: bool,
	pub params: Params,
	#[serde(default)]
	pub item_ids: Vec<i64>,
}

impl Category {
	pub fn new(application_id: i64, name: impl Into<String>) -> Self {
		Self {
			id: 0,
			application_id,
			name: name.into(),
			alias: String::new(),
			description: String::new(),
			parent: 0,
			ordering: 0,
			published: true,
			params: Params::new(),
			item_ids: Vec::new(),
		}
	}

	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = alias.into();
		self
	}

	pub fn with_parent(mut self, parent: i64) -> Self {
		self.parent = parent;
		self
	}

	pub fn with_ordering(mut self, ordering: i64) -> Self {
		self.ordering = ordering;
		self
	}

	pub fn with_published(mut self, published: bool) -> Self {
		self.published = published;
		self
	}

	pub fn is_new(&self) -> bool {
		self.id == 0
	}

	pub fn is_root(&self) -> bool {
		self.parent == 0
	}

	pub fn item_count(&self) -> usize {
		self.item_ids.len()
	}
}
