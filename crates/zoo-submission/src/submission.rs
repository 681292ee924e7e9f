//! Configured submission forms.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zoo_core::{Item, User, sluggify};

/// Element id that lets submitters choose the item state themselves.
pub const STATE_ELEMENT: &str = "_itemstate";
pub const NAME_ELEMENT: &str = "_itemname";
pub const TAG_ELEMENT: &str = "_itemtag";
pub const CATEGORY_ELEMENT: &str = "_itemcategory";

/// One element placed on a submission form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
	/// Element identifier on the item type, or a core element (`_itemname`, ...)
	pub element: String,
	#[serde(default)]
	pub position: String,
	#[serde(default)]
	pub required: bool,
	#[serde(default)]
	pub params: Map<String, Value>,
}

impl ElementConfig {
	pub fn new(element: impl Into<String>) -> Self {
		Self {
			element: element.into(),
			..Default::default()
		}
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}
}

/// Form of one item type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionForm {
	/// Layout rendering the form; a form without one is unusable
	pub layout: String,
	/// Category new items are filed under
	#[serde(default)]
	pub category: Option<i64>,
	#[serde(default)]
	pub elements: Vec<ElementConfig>,
}

impl SubmissionForm {
	pub fn new(layout: impl Into<String>) -> Self {
		Self {
			layout: layout.into(),
			..Default::default()
		}
	}

	pub fn with_category(mut self, category_id: i64) -> Self {
		self.category = Some(category_id);
		self
	}

	pub fn with_element(mut self, element: ElementConfig) -> Self {
		self.elements.push(element);
		self
	}

	pub fn has_element(&self, element_id: &str) -> bool {
		self.elements.iter().any(|e| e.element == element_id)
	}
}

/// A front-end submission of an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
	pub id: i64,
	pub application_id: i64,
	pub name: String,
	#[serde(default)]
	pub alias: String,
	pub enabled: bool,
	/// Access level a user needs to submit
	pub access: i64,
	/// Trusted submissions are published as submitted and skip throttling
	pub trusted_mode: bool,
	/// Items one user may own; 0 means unlimited
	pub max_submissions: i64,
	/// Forms keyed by item type
	pub forms: IndexMap<String, SubmissionForm>,
}

impl Submission {
	pub fn new(id: i64, application_id: i64, name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			id,
			application_id,
			alias: sluggify(&name),
			name,
			enabled: true,
			access: 1,
			trusted_mode: false,
			max_submissions: 0,
			forms: IndexMap::new(),
		}
	}

	pub fn with_form(mut self, type_id: impl Into<String>, form: SubmissionForm) -> Self {
		self.forms.insert(type_id.into(), form);
		self
	}

	pub fn with_trusted_mode(mut self, trusted: bool) -> Self {
		self.trusted_mode = trusted;
		self
	}

	pub fn with_max_submissions(mut self, max: i64) -> Self {
		self.max_submissions = max;
		self
	}

	pub fn with_access(mut self, access: i64) -> Self {
		self.access = access;
		self
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn can_access(&self, user: &User) -> bool {
		user.can_access(self.access)
	}

	pub fn form(&self, type_id: &str) -> Option<&SubmissionForm> {
		self.forms.get(type_id)
	}

	pub fn submittable_types(&self) -> Vec<String> {
		self.forms.keys().cloned().collect()
	}
}

/// Whether `user` may edit `item` through the item edit form.
pub fn can_edit(user: &User, item: &Item) -> bool {
	if user.is_admin {
		return true;
	}
	!user.is_guest() && item.created_by == user.id && item.can_access(&user.access)
}
