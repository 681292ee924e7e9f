//! Item listings.

use sea_query::{Alias, Asterisk, Condition, Expr, ExprTrait, JoinType, Order, Query, SelectStatement};
use zoo_core::User;

use super::{contains_pattern, lower, table};
use crate::backend::DatabaseBackend;
use crate::order::ResolvedOrder;
use crate::schema::{APPLICATION, CATEGORY_ITEM, ITEM, SEARCH, TAG};
use crate::scope::{Page, Scope, access_condition, column, published_condition};

/// Sort orders of a user's own item listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserOrder {
	/// Oldest first
	Date,
	/// Newest first
	#[default]
	RDate,
	Alpha,
	RAlpha,
	/// Most viewed first
	Hits,
	RHits,
}

impl UserOrder {
	/// Unknown keywords fall back to newest first.
	pub fn parse(order: &str) -> Self {
		match order.trim() {
			"date" => UserOrder::Date,
			"alpha" => UserOrder::Alpha,
			"ralpha" => UserOrder::RAlpha,
			"hits" => UserOrder::Hits,
			"rhits" => UserOrder::RHits,
			_ => UserOrder::RDate,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			UserOrder::Date => "date",
			UserOrder::RDate => "rdate",
			UserOrder::Alpha => "alpha",
			UserOrder::RAlpha => "ralpha",
			UserOrder::Hits => "hits",
			UserOrder::RHits => "rhits",
		}
	}

	fn sort(self) -> (&'static str, Order) {
		match self {
			UserOrder::Date => ("created", Order::Asc),
			UserOrder::RDate => ("created", Order::Desc),
			UserOrder::Alpha => ("name", Order::Asc),
			UserOrder::RAlpha => ("name", Order::Desc),
			UserOrder::Hits => ("hits", Order::Desc),
			UserOrder::RHits => ("hits", Order::Asc),
		}
	}
}

/// Filters of a user's own item listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserItemFilter {
	/// Restrict to these types; empty means every type
	pub types: Vec<String>,
	/// Matched against item names and tag names
	pub search: Option<String>,
	pub order: UserOrder,
	pub published: bool,
}

impl UserItemFilter {
	pub fn with_types<I, S>(mut self, types: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.types = types.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_search(mut self, search: impl Into<String>) -> Self {
		let search = search.into();
		self.search = (!search.trim().is_empty()).then_some(search);
		self
	}

	pub fn with_order(mut self, order: UserOrder) -> Self {
		self.order = order;
		self
	}

	pub fn with_published(mut self, published: bool) -> Self {
		self.published = published;
		self
	}
}

fn from_items() -> SelectStatement {
	Query::select()
		.from_as(table(ITEM), table("a"))
		.to_owned()
}

fn join_on(
	stmt: &mut SelectStatement,
	join: JoinType,
	target: &str,
	alias: &str,
	target_column: &str,
) {
	stmt.join_as(
		join,
		table(target),
		table(alias),
		column(alias, target_column).equals((table("a"), Alias::new("id"))),
	);
}

/// Selects `a.*`, groups by item and applies order and page.
fn listing(
	mut stmt: SelectStatement,
	order: &ResolvedOrder,
	page: Page,
	backend: DatabaseBackend,
) -> SelectStatement {
	stmt.column((table("a"), Asterisk))
		.group_by_col((table("a"), Alias::new("id")));
	order.apply(&mut stmt, backend, true);
	page.apply(&mut stmt);
	stmt
}

fn count(mut stmt: SelectStatement) -> SelectStatement {
	stmt.expr(Expr::cust("COUNT(DISTINCT a.id) AS count"));
	stmt
}

/// Items with the given ids.
pub fn by_ids(
	ids: &[i64],
	scope: &Scope,
	order: &ResolvedOrder,
	backend: DatabaseBackend,
) -> SelectStatement {
	let mut stmt = from_items();
	stmt.cond_where(column("a", "id").is_in(ids.to_vec()))
		.cond_where(scope.item_condition("a"));
	listing(stmt, order, Page::all(), backend)
}

/// Categorized items whose name starts (or with `not_in`, does not start)
/// with one of `chars`, case-insensitively.
pub fn by_character(
	application_id: i64,
	chars: &[String],
	not_in: bool,
	scope: &Scope,
	order: &ResolvedOrder,
	page: Page,
	backend: DatabaseBackend,
) -> SelectStatement {
	let chars: Vec<String> = chars.iter().map(|c| c.to_lowercase()).collect();
	let first = Expr::cust("LOWER(SUBSTR(a.name, 1, 1))");
	let mut stmt = from_items();
	join_on(&mut stmt, JoinType::InnerJoin, CATEGORY_ITEM, "ci", "item_id");
	stmt.cond_where(column("a", "application_id").eq(application_id))
		.cond_where(if not_in {
			first.is_not_in(chars)
		} else {
			first.is_in(chars)
		})
		.cond_where(scope.item_condition("a"));
	listing(stmt, order, page, backend)
}

pub fn by_tag(
	application_id: i64,
	tag: &str,
	scope: &Scope,
	order: &ResolvedOrder,
	page: Page,
	backend: DatabaseBackend,
) -> SelectStatement {
	let mut stmt = from_items();
	join_on(&mut stmt, JoinType::InnerJoin, TAG, "b", "item_id");
	stmt.cond_where(column("a", "application_id").eq(application_id))
		.cond_where(column("b", "name").eq(tag))
		.cond_where(scope.item_condition("a"));
	listing(stmt, order, page, backend)
}

pub fn by_type(
	type_id: &str,
	application_id: Option<i64>,
	scope: &Scope,
	order: &ResolvedOrder,
	page: Page,
	backend: DatabaseBackend,
) -> SelectStatement {
	let mut stmt = from_items();
	stmt.cond_where(column("a", "type").eq(type_id));
	if let Some(application_id) = application_id {
		stmt.cond_where(column("a", "application_id").eq(application_id));
	}
	stmt.cond_where(scope.item_condition("a"));
	listing(stmt, order, page, backend)
}

fn category_statement(application_id: i64, categories: &[i64], scope: &Scope) -> SelectStatement {
	let mut stmt = from_items();
	join_on(&mut stmt, JoinType::InnerJoin, CATEGORY_ITEM, "b", "item_id");
	stmt.cond_where(column("a", "application_id").eq(application_id))
		.cond_where(column("b", "category_id").is_in(categories.to_vec()))
		.cond_where(scope.item_condition("a"));
	stmt
}

/// Items filed under any of `categories`.
pub fn by_category(
	application_id: i64,
	categories: &[i64],
	scope: &Scope,
	order: &ResolvedOrder,
	page: Page,
	backend: DatabaseBackend,
) -> SelectStatement {
	listing(category_statement(application_id, categories, scope), order, page, backend)
}

pub fn count_from_category(application_id: i64, category_id: i64, scope: &Scope) -> SelectStatement {
	count(category_statement(application_id, &[category_id], scope))
}

fn user_statement(
	application_id: i64,
	user: &User,
	filter: &UserItemFilter,
	scope: &Scope,
) -> SelectStatement {
	let mut stmt = from_items();
	stmt.cond_where(column("a", "application_id").eq(application_id))
		.cond_where(column("a", "created_by").eq(user.id))
		.cond_where(access_condition("a", &user.access));
	if filter.published {
		stmt.cond_where(published_condition("a", scope.now));
	}
	if !filter.types.is_empty() {
		stmt.cond_where(column("a", "type").is_in(filter.types.clone()));
	}
	if let Some(search) = &filter.search {
		let pattern = contains_pattern(search);
		join_on(&mut stmt, JoinType::LeftJoin, TAG, "t", "item_id");
		stmt.cond_where(
			Condition::any()
				.add(lower("a.name").like(pattern.clone()))
				.add(lower("t.name").like(pattern.clone())),
		);
	}
	stmt
}

/// Items created by `user`, readable with the user's own access levels.
pub fn by_user(
	application_id: i64,
	user: &User,
	filter: &UserItemFilter,
	scope: &Scope,
	page: Page,
) -> SelectStatement {
	let mut stmt = user_statement(application_id, user, filter, scope);
	let (sort_column, sort_order) = filter.order.sort();
	stmt.column((table("a"), Asterisk))
		.group_by_col((table("a"), Alias::new("id")))
		.order_by((table("a"), Alias::new(sort_column)), sort_order)
		.order_by((table("a"), Alias::new("id")), Order::Asc);
	page.apply(&mut stmt);
	stmt
}

pub fn count_by_user(
	application_id: i64,
	user: &User,
	filter: &UserItemFilter,
	scope: &Scope,
) -> SelectStatement {
	count(user_statement(application_id, user, filter, scope))
}

/// Searchable items whose name or any search value contains `text`.
pub fn search(
	text: &str,
	application_id: Option<i64>,
	scope: &Scope,
	order: &ResolvedOrder,
	page: Page,
	backend: DatabaseBackend,
) -> SelectStatement {
	let pattern = contains_pattern(text);
	let mut stmt = from_items();
	join_on(&mut stmt, JoinType::LeftJoin, SEARCH, "b", "item_id");
	stmt.cond_where(column("a", "searchable").eq(1))
		.cond_where(
			Condition::any()
				.add(lower("b.value").like(pattern.clone()))
				.add(lower("a.name").like(pattern.clone())),
		);
	if let Some(application_id) = application_id {
		stmt.cond_where(column("a", "application_id").eq(application_id));
	}
	stmt.cond_where(scope.item_condition("a"));
	listing(stmt, order, page, backend)
}

/// Items whose search value of every given element contains the paired text.
pub fn search_elements(
	elements: &[(String, String)],
	application_id: Option<i64>,
	scope: &Scope,
	order: &ResolvedOrder,
	page: Page,
	backend: DatabaseBackend,
) -> SelectStatement {
	let mut stmt = from_items();
	for (index, (element_id, text)) in elements.iter().enumerate() {
		let alias = format!("e{index}");
		stmt.join_as(
			JoinType::LeftJoin,
			table(SEARCH),
			table(&alias),
			column(&alias, "item_id")
				.equals((table("a"), Alias::new("id")))
				.and(column(&alias, "element_id").eq(element_id.as_str())),
		);
		stmt.cond_where(lower(&format!("{alias}.value")).like(contains_pattern(text)));
	}
	if let Some(application_id) = application_id {
		stmt.cond_where(column("a", "application_id").eq(application_id));
	}
	stmt.cond_where(scope.item_condition("a"));
	listing(stmt, order, page, backend)
}

pub fn application_count(application_id: i64) -> SelectStatement {
	let mut stmt = from_items();
	stmt.cond_where(column("a", "application_id").eq(application_id));
	count(stmt)
}

/// Items of `type_id` across every application of `group`.
pub fn type_count(type_id: &str, group: &str) -> SelectStatement {
	let mut stmt = from_items();
	stmt.join_as(
		JoinType::InnerJoin,
		table(APPLICATION),
		table("b"),
		column("b", "id").equals((table("a"), Alias::new("application_id"))),
	)
	.cond_where(column("a", "type").eq(type_id))
	.cond_where(column("b", "application_group").eq(group));
	count(stmt)
}
