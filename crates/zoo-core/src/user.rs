//! The caller of a listing or workflow.
//!
//! User management lives outside the content store; callers describe the
//! current user with this value type.

use serde::{Deserialize, Serialize};

/// View levels a user may read. Content carries a single `access` level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLevels(Vec<i64>);

impl AccessLevels {
	pub fn new<I: IntoIterator<Item = i64>>(levels: I) -> Self {
		let mut levels: Vec<i64> = levels.into_iter().collect();
		levels.sort_unstable();
		levels.dedup();
		Self(levels)
	}

	/// Levels granted to anonymous visitors (public).
	pub fn public() -> Self {
		Self(vec![1])
	}

	pub fn allows(&self, access: i64) -> bool {
		self.0.contains(&access)
	}

	pub fn levels(&self) -> &[i64] {
		&self.0
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: i64,
	pub name: String,
	pub email: String,
	pub access: AccessLevels,
	/// May manage every item of the application (edit and delete).
	pub is_admin: bool,
	pub is_superadmin: bool,
}

impl User {
	pub fn guest() -> Self {
		Self {
			id: 0,
			name: String::new(),
			email: String::new(),
			access: AccessLevels::public(),
			is_admin: false,
			is_superadmin: false,
		}
	}

	pub fn new(id: i64, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			email: String::new(),
			access: AccessLevels::new([1, 2]),
			is_admin: false,
			is_superadmin: false,
		}
	}

	pub fn with_access(mut self, access: AccessLevels) -> Self {
		self.access = access;
		self
	}

	pub fn with_admin(mut self, is_admin: bool) -> Self {
		self.is_admin = is_admin;
		self
	}

	pub fn with_superadmin(mut self, is_superadmin: bool) -> Self {
		self.is_superadmin = is_superadmin;
		if is_superadmin {
			self.is_admin = true;
		}
		self
	}

	pub fn is_guest(&self) -> bool {
		self.id == 0
	}

	pub fn can_access(&self, access: i64) -> bool {
		self.access.allows(access)
	}
}
