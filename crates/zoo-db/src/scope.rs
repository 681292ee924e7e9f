//! Visibility and paging parameters shared by the listings.

use chrono::NaiveDateTime;
use sea_query::{Alias, Condition, Expr, ExprTrait, SelectStatement};
use zoo_core::{AccessLevels, ItemState, User, format_datetime};

/// Which items a listing may return
///
/// ```
/// use zoo_db::Scope;
/// use zoo_core::User;
///
/// let scope = Scope::published().with_user(&User::guest());
/// assert!(scope.published);
/// assert_eq!(scope.access.unwrap().levels(), &[1]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
	/// Only published items whose publish window contains `now`
	pub published: bool,
	/// Only items readable with these levels; `None` skips the check
	pub access: Option<AccessLevels>,
	pub now: NaiveDateTime,
}

impl Scope {
	/// Everything, regardless of state and access.
	pub fn all() -> Self {
		Self {
			published: false,
			access: None,
			now: chrono::Utc::now().naive_utc(),
		}
	}

	pub fn published() -> Self {
		Self {
			published: true,
			..Self::all()
		}
	}

	pub fn with_access(mut self, access: AccessLevels) -> Self {
		self.access = Some(access);
		self
	}

	pub fn with_user(self, user: &User) -> Self {
		self.with_access(user.access.clone())
	}

	pub fn at(mut self, now: NaiveDateTime) -> Self {
		self.now = now;
		self
	}

	/// Conditions on the item table aliased `table`.
	pub fn item_condition(&self, table: &str) -> Condition {
		let mut condition = Condition::all();
		if let Some(access) = &self.access {
			condition = condition.add(access_condition(table, access));
		}
		if self.published {
			condition = condition.add(published_condition(table, self.now));
		}
		condition
	}
}

impl Default for Scope {
	fn default() -> Self {
		Self::all()
	}
}

pub(crate) fn column(table: &str, column: &str) -> Expr {
	Expr::col((Alias::new(table), Alias::new(column)))
}

pub(crate) fn access_condition(table: &str, access: &AccessLevels) -> Condition {
	Condition::all().add(column(table, "access").is_in(access.levels().to_vec()))
}

pub(crate) fn published_condition(table: &str, now: NaiveDateTime) -> Condition {
	let now = format_datetime(&now);
	Condition::all()
		.add(column(table, "state").eq(ItemState::Published.as_i64()))
		.add(
			Condition::any()
				.add(column(table, "publish_up").is_null())
				.add(column(table, "publish_up").lte(now.clone())),
		)
		.add(
			Condition::any()
				.add(column(table, "publish_down").is_null())
				.add(column(table, "publish_down").gte(now)),
		)
}

/// Offset and limit of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
	pub offset: u64,
	pub limit: Option<u64>,
}

impl Page {
	pub fn all() -> Self {
		Self::default()
	}

	pub fn new(offset: u64, limit: u64) -> Self {
		Self {
			offset,
			limit: Some(limit),
		}
	}

	/// One-based page `number` of `per_page` rows. Offsets past the end
	/// saturate at the largest one SQL accepts.
	pub fn number(number: u64, per_page: u64) -> Self {
		let offset = Ord::min(
			number.saturating_sub(1).saturating_mul(per_page),
			i64::MAX as u64,
		);
		Self::new(offset, per_page)
	}

	pub(crate) fn apply(&self, stmt: &mut SelectStatement) {
		if let Some(limit) = self.limit {
			stmt.limit(limit);
		}
		if self.offset > 0 {
			if self.limit.is_none() {
				stmt.limit(i64::MAX as u64);
			}
			stmt.offset(self.offset);
		}
	}
}
