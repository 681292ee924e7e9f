//! Category listings.

use sea_query::{Alias, Asterisk, Condition, Expr, ExprTrait, JoinType, Order, Query, SelectStatement};

use super::{distinct_list, table};
use crate::backend::DatabaseBackend;
use crate::schema::{CATEGORY, CATEGORY_ITEM, ITEM};
use crate::scope::{Scope, column};

fn from_categories() -> SelectStatement {
	Query::select()
		.column((table("c"), Asterisk))
		.from_as(table(CATEGORY), table("c"))
		.to_owned()
}

fn by_ordering(stmt: &mut SelectStatement) {
	stmt.order_by((table("c"), Alias::new("ordering")), Order::Asc)
		.order_by((table("c"), Alias::new("id")), Order::Asc);
}

pub fn by_id(id: i64) -> SelectStatement {
	let mut stmt = from_categories();
	stmt.and_where(column("c", "id").eq(id));
	stmt
}

pub fn by_ids(ids: &[i64], published: bool) -> SelectStatement {
	let mut stmt = from_categories();
	stmt.and_where(column("c", "id").is_in(ids.to_vec()));
	if published {
		stmt.and_where(column("c", "published").eq(1));
	}
	by_ordering(&mut stmt);
	stmt
}

pub fn by_name(application_id: i64, name: &str) -> SelectStatement {
	let mut stmt = from_categories();
	stmt.and_where(column("c", "application_id").eq(application_id))
		.and_where(column("c", "name").eq(name))
		.limit(1);
	stmt
}

/// Every category of an application in tree order.
///
/// With `item_count` each row carries `item_ids`, the comma separated ids of
/// the items filed under it; `scope` then restricts which items count.
pub fn all(
	application_id: i64,
	published: bool,
	item_count: bool,
	scope: &Scope,
	backend: DatabaseBackend,
) -> SelectStatement {
	let mut stmt = from_categories();
	stmt.and_where(column("c", "application_id").eq(application_id));
	if published {
		stmt.and_where(column("c", "published").eq(1));
	}

	if item_count {
		stmt.join_as(
			JoinType::LeftJoin,
			table(CATEGORY_ITEM),
			table("ci"),
			column("ci", "category_id").equals((table("c"), Alias::new("id"))),
		);

		let counted = if scope.published || scope.access.is_some() {
			stmt.join_as(
				JoinType::LeftJoin,
				table(ITEM),
				table("i"),
				Condition::all()
					.add(column("i", "id").equals((table("ci"), Alias::new("item_id"))))
					.add(scope.item_condition("i")),
			);
			"i.id"
		} else {
			"ci.item_id"
		};

		stmt.expr(Expr::cust(format!("{} AS item_ids", distinct_list(counted, backend))))
			.group_by_col((table("c"), Alias::new("id")));
	}

	by_ordering(&mut stmt);
	stmt
}

/// Categories an item is filed under.
pub fn by_item(item_id: i64, published: bool) -> SelectStatement {
	let mut stmt = from_categories();
	stmt.join_as(
		JoinType::InnerJoin,
		table(CATEGORY_ITEM),
		table("ci"),
		column("ci", "category_id").equals((table("c"), Alias::new("id"))),
	)
	.and_where(column("ci", "item_id").eq(item_id));
	if published {
		stmt.and_where(column("c", "published").eq(1));
	}
	by_ordering(&mut stmt);
	stmt
}

/// Children of `parent`, in their current order.
pub fn children(application_id: i64, parent: i64) -> SelectStatement {
	let mut stmt = from_categories();
	stmt.and_where(column("c", "application_id").eq(application_id))
		.and_where(column("c", "parent").eq(parent));
	by_ordering(&mut stmt);
	stmt
}

/// Whether another category of the application uses `alias`.
pub fn alias_count(application_id: i64, alias: &str, except_id: i64) -> SelectStatement {
	Query::select()
		.expr(Expr::cust("COUNT(*) AS count"))
		.from(table(CATEGORY))
		.and_where(Expr::col(Alias::new("application_id")).eq(application_id))
		.and_where(Expr::col(Alias::new("alias")).eq(alias))
		.and_where(Expr::col(Alias::new("id")).ne(except_id))
		.to_owned()
}

/// Ids of the categories an item is filed under.
pub fn item_category_ids(item_id: i64) -> SelectStatement {
	Query::select()
		.column(Alias::new("category_id"))
		.from(table(CATEGORY_ITEM))
		.and_where(Expr::col(Alias::new("item_id")).eq(item_id))
		.order_by(Alias::new("category_id"), Order::Asc)
		.to_owned()
}
