//! Comment listings.

use chrono::NaiveDateTime;
use sea_query::{Alias, Asterisk, Condition, Expr, ExprTrait, JoinType, Order, Query, SelectStatement};
use zoo_core::{CommentAuthor, CommentState};

use super::table;
use crate::schema::{CATEGORY_ITEM, COMMENT, ITEM};
use crate::scope::{column, published_condition};

fn from_comments() -> SelectStatement {
	Query::select()
		.column((table("c"), Asterisk))
		.from_as(table(COMMENT), table("c"))
		.to_owned()
}

/// Comments written by `author`.
fn written_by(author: &CommentAuthor) -> Condition {
	Condition::all()
		.add(column("c", "author").eq(author.name.as_str()))
		.add(column("c", "email").eq(author.email.as_str()))
		.add(column("c", "user_id").eq(author.user_id))
		.add(column("c", "user_type").eq(author.user_type.as_str()))
}

pub fn by_id(id: i64) -> SelectStatement {
	let mut stmt = from_comments();
	stmt.and_where(column("c", "id").eq(id));
	stmt
}

/// Comments on an item in `state`, plus, when `author` is given, that
/// author's own comments in any state.
pub fn for_item(
	item_id: i64,
	ascending: bool,
	author: Option<&CommentAuthor>,
	state: CommentState,
) -> SelectStatement {
	let mut stmt = from_comments();
	stmt.and_where(column("c", "item_id").eq(item_id));

	let mut visible = Condition::any().add(column("c", "state").eq(state.as_i64()));
	if let Some(author) = author {
		visible = visible.add(written_by(author));
	}
	stmt.cond_where(visible);

	let order = if ascending { Order::Asc } else { Order::Desc };
	stmt.order_by((table("c"), Alias::new("created")), order.clone())
		.order_by((table("c"), Alias::new("id")), order);
	stmt
}

/// Most recent comment from `ip`, narrowed to the author unless a guest.
pub fn last_comment(ip: &str, author: Option<&CommentAuthor>) -> SelectStatement {
	let mut stmt = from_comments();
	stmt.and_where(column("c", "ip").eq(ip));
	if let Some(author) = author.filter(|author| !author.is_guest()) {
		stmt.and_where(column("c", "user_id").eq(author.user_id))
			.and_where(column("c", "user_type").eq(author.user_type.as_str()));
	}
	stmt.order_by((table("c"), Alias::new("created")), Order::Desc)
		.order_by((table("c"), Alias::new("id")), Order::Desc)
		.limit(1);
	stmt
}

/// Approved comments on published items of an application, newest first.
pub fn latest(
	application_id: i64,
	categories: &[i64],
	limit: u64,
	now: NaiveDateTime,
) -> SelectStatement {
	let mut stmt = from_comments();
	stmt.join_as(
		JoinType::InnerJoin,
		table(ITEM),
		table("a"),
		column("a", "id").equals((table("c"), Alias::new("item_id"))),
	);
	if !categories.is_empty() {
		stmt.join_as(
			JoinType::InnerJoin,
			table(CATEGORY_ITEM),
			table("ci"),
			column("ci", "item_id").equals((table("a"), Alias::new("id"))),
		)
		.and_where(column("ci", "category_id").is_in(categories.to_vec()));
	}
	stmt.and_where(column("a", "application_id").eq(application_id))
		.and_where(column("c", "state").eq(CommentState::Approved.as_i64()))
		.cond_where(published_condition("a", now))
		.group_by_col((table("c"), Alias::new("id")))
		.order_by((table("c"), Alias::new("created")), Order::Desc)
		.order_by((table("c"), Alias::new("id")), Order::Desc)
		.limit(limit);
	stmt
}

/// Approved comments by `author`; guests are matched on name and email.
pub fn approved_count(author: &CommentAuthor) -> SelectStatement {
	let mut stmt = Query::select()
		.expr(Expr::cust("COUNT(*) AS count"))
		.from_as(table(COMMENT), table("c"))
		.and_where(column("c", "state").eq(CommentState::Approved.as_i64()))
		.to_owned();
	if author.is_guest() {
		stmt.and_where(column("c", "user_id").eq(0))
			.and_where(column("c", "author").eq(author.name.as_str()))
			.and_where(column("c", "email").eq(author.email.as_str()));
	} else {
		stmt.and_where(column("c", "user_id").eq(author.user_id))
			.and_where(column("c", "user_type").eq(author.user_type.as_str()));
	}
	stmt
}
