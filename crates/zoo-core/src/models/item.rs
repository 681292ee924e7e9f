use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::elements::ElementData;
use crate::params::Params;
use crate::user::AccessLevels;

/// Publication state of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemState {
	#[default]
	Unpublished,
	Published,
}

impl ItemState {
	pub fn as_i64(self) -> i64 {
		match self {
			ItemState::Unpublished => 0,
			ItemState::Published => 1,
		}
	}

	pub fn from_i64(value: i64) -> Self {
		if value == 1 {
			ItemState::Published
		} else {
			ItemState::Unpublished
		}
	}
}

/// A content item of some application type.
///
/// `id == 0` marks an item that has not been persisted yet. Element data is
/// kept in declaration order so search rows are written deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
	pub id: i64,
	pub application_id: i64,
	pub type_id: String,
	pub name: String,
	pub alias: String,
	pub created: NaiveDateTime,
	pub modified: NaiveDateTime,
	pub modified_by: i64,
	pub publish_up: Option<NaiveDateTime>,
	pub publish_down: Option<NaiveDateTime>,
	pub priority: i64,
	pub hits: i64,
	pub state: ItemState,
	pub access: i64,
	pub created_by: i64,
	pub created_by_alias: String,
	pub searchable: bool,
	pub params: Params,
	pub elements: IndexMap<String, ElementData>,
	pub tags: Vec<String>,
}

impl Item {
	/// Creates an unsaved, unpublished item stamped with the current time.
	pub fn new(application_id: i64, type_id: impl Into<String>, name: impl Into<String>) -> Self {
		let now = chrono::Utc::now().naive_utc();
		Self {
			id: 0,
			application_id,
			type_id: type_id.into(),
			name: name.into(),
			alias: String::new(),
			created: now,
			modified: now,
			modified_by: 0,
			publish_up: None,
			publish_down: None,
			priority: 0,
			hits: 0,
			state: ItemState::Unpublished,
			access: 1,
			created_by: 0,
			created_by_alias: String::new(),
			searchable: true,
			params: Params::new(),
			elements: IndexMap::new(),
			tags: Vec::new(),
		}
	}

	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = alias.into();
		self
	}

	pub fn with_state(mut self, state: ItemState) -> Self {
		self.state = state;
		self
	}

	pub fn with_priority(mut self, priority: i64) -> Self {
		self.priority = priority;
		self
	}

	pub fn with_access(mut self, access: i64) -> Self {
		self.access = access;
		self
	}

	pub fn with_created_by(mut self, user_id: i64) -> Self {
		self.created_by = user_id;
		self
	}

	pub fn with_created(mut self, created: NaiveDateTime) -> Self {
		self.created = created;
		self.modified = created;
		self
	}

	pub fn with_publish_window(
		mut self,
		publish_up: Option<NaiveDateTime>,
		publish_down: Option<NaiveDateTime>,
	) -> Self {
		self.publish_up = publish_up;
		self.publish_down = publish_down;
		self
	}

	pub fn with_element(mut self, element_id: impl Into<String>, data: impl Into<ElementData>) -> Self {
		self.elements.insert(element_id.into(), data.into());
		self
	}

	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}

	pub fn is_new(&self) -> bool {
		self.id == 0
	}

	/// Published state and a publish window containing `now`.
	pub fn is_published(&self, now: NaiveDateTime) -> bool {
		self.state == ItemState::Published
			&& self.publish_up.is_none_or(|up| up <= now)
			&& self.publish_down.is_none_or(|down| down >= now)
	}

	pub fn can_access(&self, levels: &AccessLevels) -> bool {
		levels.allows(self.access)
	}

	pub fn element(&self, element_id: &str) -> Option<&ElementData> {
		self.elements.get(element_id)
	}

	pub fn set_element(&mut self, element_id: impl Into<String>, data: impl Into<ElementData>) {
		self.elements.insert(element_id.into(), data.into());
	}

	/// `(element_id, value)` pairs for every element with search data.
	pub fn search_rows(&self) -> Vec<(String, String)> {
		self.elements
			.iter()
			.filter_map(|(id, data)| data.search_data().map(|value| (id.clone(), value)))
			.collect()
	}

	/// Category the item is filed under first, or 0.
	pub fn primary_category(&self) -> i64 {
		self.params.get_i64("config.primary_category").unwrap_or(0)
	}

	pub fn set_primary_category(&mut self, category_id: i64) {
		self.params.set("config.primary_category", category_id);
	}

	pub fn comments_enabled(&self) -> bool {
		self.params.get_bool("config.enable_comments").unwrap_or(true)
	}
}
