//! Tag listings.

use sea_query::{Alias, Expr, ExprTrait, JoinType, Order, Query, SelectStatement};

use super::{contains_pattern, lower, table};
use crate::schema::{CATEGORY_ITEM, ITEM, TAG};
use crate::scope::{Page, Scope, column};

/// Sort order of a tag listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagOrder {
	#[default]
	Name,
	/// Most used first, then by name
	Items,
}

/// Filters of [`all`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagQuery {
	pub application_id: Option<i64>,
	/// Substring of the tag name
	pub search: Option<String>,
	/// Exact tag name
	pub tag: Option<String>,
	pub order: TagOrder,
	pub page: Page,
	/// Only count published items inside their publish window
	pub published: bool,
	pub category_id: Option<i64>,
	pub type_id: Option<String>,
}

impl TagQuery {
	pub fn new(application_id: i64) -> Self {
		Self {
			application_id: Some(application_id),
			..Self::default()
		}
	}

	pub fn with_search(mut self, search: impl Into<String>) -> Self {
		self.search = Some(search.into());
		self
	}

	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.tag = Some(tag.into());
		self
	}

	pub fn with_order(mut self, order: TagOrder) -> Self {
		self.order = order;
		self
	}

	pub fn with_page(mut self, page: Page) -> Self {
		self.page = page;
		self
	}

	pub fn with_published(mut self, published: bool) -> Self {
		self.published = published;
		self
	}

	pub fn with_category(mut self, category_id: i64) -> Self {
		self.category_id = Some(category_id);
		self
	}

	pub fn with_type(mut self, type_id: impl Into<String>) -> Self {
		self.type_id = Some(type_id.into());
		self
	}
}

fn from_tags() -> SelectStatement {
	Query::select()
		.from_as(table(TAG), table("t"))
		.join_as(
			JoinType::InnerJoin,
			table(ITEM),
			table("a"),
			column("a", "id").equals((table("t"), Alias::new("item_id"))),
		)
		.to_owned()
}

/// Tag names with the number of items carrying them.
pub fn all(query: &TagQuery, scope: &Scope) -> SelectStatement {
	let mut stmt = from_tags();
	stmt.column((table("t"), Alias::new("name")))
		.expr(Expr::cust("COUNT(DISTINCT t.item_id) AS items"));

	if let Some(application_id) = query.application_id {
		stmt.and_where(column("a", "application_id").eq(application_id));
	}
	if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
		stmt.and_where(lower("t.name").like(contains_pattern(search)));
	}
	if let Some(tag) = &query.tag {
		stmt.and_where(column("t", "name").eq(tag.as_str()));
	}
	if query.published {
		stmt.cond_where(Scope { published: true, ..scope.clone() }.item_condition("a"));
	} else {
		stmt.cond_where(scope.item_condition("a"));
	}
	if let Some(type_id) = &query.type_id {
		stmt.and_where(column("a", "type").eq(type_id.as_str()));
	}
	if let Some(category_id) = query.category_id {
		stmt.join_as(
			JoinType::InnerJoin,
			table(CATEGORY_ITEM),
			table("ci"),
			column("ci", "item_id").equals((table("a"), Alias::new("id"))),
		)
		.and_where(column("ci", "category_id").eq(category_id));
	}

	stmt.group_by_col((table("t"), Alias::new("name")));
	match query.order {
		TagOrder::Name => {
			stmt.order_by((table("t"), Alias::new("name")), Order::Asc);
		}
		TagOrder::Items => {
			stmt.order_by_expr(Expr::cust("COUNT(DISTINCT t.item_id)"), Order::Desc)
				.order_by((table("t"), Alias::new("name")), Order::Asc);
		}
	}
	query.page.apply(&mut stmt);
	stmt
}

/// Number of distinct tag names.
pub fn count(application_id: Option<i64>, search: Option<&str>) -> SelectStatement {
	let mut stmt = from_tags();
	stmt.expr(Expr::cust("COUNT(DISTINCT t.name) AS count"));
	if let Some(application_id) = application_id {
		stmt.and_where(column("a", "application_id").eq(application_id));
	}
	if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
		stmt.and_where(lower("t.name").like(contains_pattern(search)));
	}
	stmt
}

pub fn item_tags(item_id: i64) -> SelectStatement {
	Query::select()
		.column(Alias::new("name"))
		.from(table(TAG))
		.and_where(Expr::col(Alias::new("item_id")).eq(item_id))
		.order_by(Alias::new("name"), Order::Asc)
		.to_owned()
}

/// Items of an application carrying any of `names`.
pub fn tagged_item_ids(application_id: i64, names: &[String]) -> SelectStatement {
	let mut stmt = from_tags();
	stmt.distinct()
		.column((table("t"), Alias::new("item_id")))
		.and_where(column("a", "application_id").eq(application_id))
		.and_where(column("t", "name").is_in(names.to_vec()));
	stmt
}
