//! Listing statements.
//!
//! Builders here only assemble `sea_query` statements; the repositories run
//! them. Item listings select from the item table aliased `a` and group by
//! `a.id`, so joins never duplicate an item.

pub mod category;
pub mod comment;
pub mod item;
pub mod tag;

use sea_query::{Alias, Expr, LikeExpr};

use crate::backend::DatabaseBackend;

const LIKE_ESCAPE: char = '!';

/// `%text%` in lower case, for matching against `LOWER(column)`. Wildcards
/// in `text` match literally.
pub(crate) fn contains_pattern(text: &str) -> LikeExpr {
	let mut pattern = String::from("%");
	for c in text.trim().to_lowercase().chars() {
		if matches!(c, '%' | '_' | LIKE_ESCAPE) {
			pattern.push(LIKE_ESCAPE);
		}
		pattern.push(c);
	}
	pattern.push('%');
	LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

pub(crate) fn lower(column: &str) -> Expr {
	Expr::cust(format!("LOWER({column})"))
}

pub(crate) fn table(name: &str) -> Alias {
	Alias::new(name)
}

/// Comma separated, distinct values of `column` within a group.
pub(crate) fn distinct_list(column: &str, backend: DatabaseBackend) -> String {
	match backend {
		DatabaseBackend::Postgres => {
			format!("STRING_AGG(DISTINCT CAST({column} AS TEXT), ',')")
		}
		DatabaseBackend::MySql | DatabaseBackend::Sqlite => {
			format!("GROUP_CONCAT(DISTINCT {column})")
		}
	}
}
