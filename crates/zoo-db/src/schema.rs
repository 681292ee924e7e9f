//! Table names and schema installation.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text in UTC so the same
//! string comparisons work on every backend; an absent publish date is NULL.
//! JSON payloads (params, element data) are stored as text.

use sea_query::{Alias, ColumnDef, Index, Table, TableCreateStatement};

use crate::backend::Database;
use crate::error::DbResult;

pub const APPLICATION: &str = "zoo_application";
pub const ITEM: &str = "zoo_item";
pub const CATEGORY: &str = "zoo_category";
pub const CATEGORY_ITEM: &str = "zoo_category_item";
pub const COMMENT: &str = "zoo_comment";
pub const TAG: &str = "zoo_tag";
pub const SEARCH: &str = "zoo_search_index";
pub const RATING: &str = "zoo_rating";

fn id_column() -> ColumnDef {
	ColumnDef::new(Alias::new("id"))
		.integer()
		.not_null()
		.auto_increment()
		.primary_key()
		.to_owned()
}

fn datetime_column(name: &'static str) -> ColumnDef {
	ColumnDef::new(Alias::new(name)).string_len(32).to_owned()
}

fn tables() -> Vec<TableCreateStatement> {
	vec![
		Table::create()
			.table(Alias::new(APPLICATION))
			.if_not_exists()
			.col(id_column())
			.col(ColumnDef::new(Alias::new("name")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("alias")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("application_group")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("params")).text().not_null())
			.to_owned(),
		Table::create()
			.table(Alias::new(ITEM))
			.if_not_exists()
			.col(id_column())
			.col(ColumnDef::new(Alias::new("application_id")).integer().not_null())
			.col(ColumnDef::new(Alias::new("type")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("name")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("alias")).string_len(255).not_null())
			.col(datetime_column("created").not_null())
			.col(datetime_column("modified").not_null())
			.col(ColumnDef::new(Alias::new("modified_by")).integer().not_null().default(0))
			.col(datetime_column("publish_up").null())
			.col(datetime_column("publish_down").null())
			.col(ColumnDef::new(Alias::new("priority")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("hits")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("state")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("access")).integer().not_null().default(1))
			.col(ColumnDef::new(Alias::new("created_by")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("created_by_alias")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("searchable")).integer().not_null().default(1))
			.col(ColumnDef::new(Alias::new("params")).text().not_null())
			.col(ColumnDef::new(Alias::new("elements")).text().not_null())
			.to_owned(),
		Table::create()
			.table(Alias::new(CATEGORY))
			.if_not_exists()
			.col(id_column())
			.col(ColumnDef::new(Alias::new("application_id")).integer().not_null())
			.col(ColumnDef::new(Alias::new("name")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("alias")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("description")).text().not_null())
			.col(ColumnDef::new(Alias::new("parent")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("ordering")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("published")).integer().not_null().default(1))
			.col(ColumnDef::new(Alias::new("params")).text().not_null())
			.to_owned(),
		Table::create()
			.table(Alias::new(CATEGORY_ITEM))
			.if_not_exists()
			.col(ColumnDef::new(Alias::new("category_id")).integer().not_null())
			.col(ColumnDef::new(Alias::new("item_id")).integer().not_null())
			.primary_key(
				Index::create()
					.col(Alias::new("category_id"))
					.col(Alias::new("item_id")),
			)
			.to_owned(),
		Table::create()
			.table(Alias::new(COMMENT))
			.if_not_exists()
			.col(id_column())
			.col(ColumnDef::new(Alias::new("parent_id")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("item_id")).integer().not_null())
			.col(ColumnDef::new(Alias::new("user_id")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("user_type")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("author")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("email")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("url")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("ip")).string_len(64).not_null())
			.col(datetime_column("created").not_null())
			.col(ColumnDef::new(Alias::new("content")).text().not_null())
			.col(ColumnDef::new(Alias::new("state")).integer().not_null().default(0))
			.to_owned(),
		Table::create()
			.table(Alias::new(TAG))
			.if_not_exists()
			.col(ColumnDef::new(Alias::new("item_id")).integer().not_null())
			.col(ColumnDef::new(Alias::new("name")).string_len(255).not_null())
			.primary_key(Index::create().col(Alias::new("item_id")).col(Alias::new("name")))
			.to_owned(),
		Table::create()
			.table(Alias::new(SEARCH))
			.if_not_exists()
			.col(ColumnDef::new(Alias::new("item_id")).integer().not_null())
			.col(ColumnDef::new(Alias::new("element_id")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("value")).text().not_null())
			.primary_key(
				Index::create()
					.col(Alias::new("item_id"))
					.col(Alias::new("element_id")),
			)
			.to_owned(),
		Table::create()
			.table(Alias::new(RATING))
			.if_not_exists()
			.col(id_column())
			.col(ColumnDef::new(Alias::new("item_id")).integer().not_null())
			.col(ColumnDef::new(Alias::new("element_id")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("user_id")).integer().not_null().default(0))
			.col(ColumnDef::new(Alias::new("value")).integer().not_null())
			.col(ColumnDef::new(Alias::new("ip")).string_len(64).not_null())
			.col(datetime_column("created").not_null())
			.to_owned(),
	]
}

/// Creates every table and index that does not exist yet.
pub async fn install(db: &Database) -> DbResult<()> {
	for table in tables() {
		let sql = db.backend().build_schema(&table);
		db.execute_raw(&sql).await?;
	}

	let indexes = [
		Index::create()
			.if_not_exists()
			.name("idx_zoo_item_application")
			.table(Alias::new(ITEM))
			.col(Alias::new("application_id"))
			.col(Alias::new("type"))
			.to_owned(),
		Index::create()
			.if_not_exists()
			.name("idx_zoo_item_alias")
			.table(Alias::new(ITEM))
			.col(Alias::new("alias"))
			.to_owned(),
		Index::create()
			.if_not_exists()
			.name("idx_zoo_category_parent")
			.table(Alias::new(CATEGORY))
			.col(Alias::new("application_id"))
			.col(Alias::new("parent"))
			.to_owned(),
		Index::create()
			.if_not_exists()
			.name("idx_zoo_category_item_item")
			.table(Alias::new(CATEGORY_ITEM))
			.col(Alias::new("item_id"))
			.to_owned(),
		Index::create()
			.if_not_exists()
			.name("idx_zoo_comment_item")
			.table(Alias::new(COMMENT))
			.col(Alias::new("item_id"))
			.col(Alias::new("state"))
			.to_owned(),
	];
	for index in indexes {
		let sql = db.backend().build_schema(&index);
		db.execute_raw(&sql).await?;
	}

	tracing::info!(backend = ?db.backend(), "content store schema installed");
	Ok(())
}
