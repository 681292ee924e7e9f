use indexmap::IndexMap;
use sea_query::{Alias, Expr, ExprTrait, Query};
use sqlx::any::AnyRow;
use zoo_core::{Category, DeleteEvent, Params, SaveEvent, Signal, is_slug};

use crate::backend::{Database, DatabaseBackend, get_bool, get_i64, get_opt_string, get_string};
use crate::error::{CategoryError, DbResult};
use crate::query::category as category_query;
use crate::schema::{CATEGORY, CATEGORY_ITEM};
use crate::scope::Scope;

/// Raised so aggregated item id lists are not truncated.
const GROUP_CONCAT_SETUP: &str = "SET SESSION group_concat_max_len = 1048576";

fn category_from_row(row: &AnyRow, with_items: bool) -> DbResult<Category> {
	let item_ids = if with_items {
		parse_ids(get_opt_string(row, "item_ids")?.as_deref().unwrap_or_default())
	} else {
		Vec::new()
	};
	Ok(Category {
		id: get_i64(row, "id")?,
		application_id: get_i64(row, "application_id")?,
		name: get_string(row, "name")?,
		alias: get_string(row, "alias")?,
		description: get_string(row, "description")?,
		parent: get_i64(row, "parent")?,
		ordering: get_i64(row, "ordering")?,
		published: get_bool(row, "published")?,
		params: Params::from_json(&get_string(row, "params")?),
		item_ids,
	})
}

fn parse_ids(list: &str) -> Vec<i64> {
	let mut ids: Vec<i64> = list
		.split(',')
		.filter_map(|id| id.trim().parse().ok())
		.collect();
	ids.sort_unstable();
	ids.dedup();
	ids
}

/// Category tree of an application
#[derive(Clone)]
pub struct CategoryRepository {
	db: Database,
	saved: Signal<SaveEvent<Category>>,
	deleted: Signal<DeleteEvent<Category>>,
}

impl CategoryRepository {
	pub fn new(db: Database) -> Self {
		Self {
			db,
			saved: Signal::new("category.saved"),
			deleted: Signal::new("category.deleted"),
		}
	}

	pub fn saved(&self) -> &Signal<SaveEvent<Category>> {
		&self.saved
	}

	pub fn deleted(&self) -> &Signal<DeleteEvent<Category>> {
		&self.deleted
	}

	async fn fetch(&self, stmt: &sea_query::SelectStatement) -> DbResult<Vec<Category>> {
		let rows = self.db.fetch_all(stmt).await?;
		rows.iter().map(|row| category_from_row(row, false)).collect()
	}

	pub async fn get(&self, id: i64) -> DbResult<Option<Category>> {
		self.db
			.fetch_optional(&category_query::by_id(id))
			.await?
			.map(|row| category_from_row(&row, false))
			.transpose()
	}

	/// Categories with the given ids in tree order; empty input yields nothing.
	pub async fn by_ids(&self, ids: &[i64], published: bool) -> DbResult<Vec<Category>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}
		self.fetch(&category_query::by_ids(ids, published)).await
	}

	pub async fn by_name(&self, application_id: i64, name: &str) -> DbResult<Option<Category>> {
		if application_id == 0 || name.is_empty() {
			return Ok(None);
		}
		Ok(self
			.fetch(&category_query::by_name(application_id, name))
			.await?
			.into_iter()
			.next())
	}

	/// Every category of the application; with `item_count` each one carries
	/// the ids of the items in `scope` filed under it.
	pub async fn all(
		&self,
		application_id: i64,
		published: bool,
		item_count: bool,
		scope: &Scope,
	) -> DbResult<Vec<Category>> {
		let backend = self.db.backend();
		let stmt = category_query::all(application_id, published, item_count, scope, backend);
		let rows = if item_count && backend == DatabaseBackend::MySql {
			self.db.fetch_all_after(GROUP_CONCAT_SETUP, &stmt).await?
		} else {
			self.db.fetch_all(&stmt).await?
		};
		rows.iter().map(|row| category_from_row(row, item_count)).collect()
	}

	pub async fn by_item(&self, item_id: i64, published: bool) -> DbResult<Vec<Category>> {
		self.fetch(&category_query::by_item(item_id, published)).await
	}

	pub async fn alias_exists(&self, application_id: i64, alias: &str, except_id: i64) -> DbResult<bool> {
		Ok(self
			.db
			.fetch_count(&category_query::alias_count(application_id, alias, except_id))
			.await? > 0)
	}

	/// Validates and writes the category.
	pub async fn save(&self, category: &mut Category) -> Result<(), CategoryError> {
		if category.name.trim().is_empty() {
			return Err(CategoryError::InvalidName);
		}
		if !is_slug(&category.alias) {
			return Err(CategoryError::InvalidAlias);
		}
		if self
			.alias_exists(category.application_id, &category.alias, category.id)
			.await?
		{
			return Err(CategoryError::AliasExists);
		}
		if category.parent < 0 || (!category.is_new() && category.parent == category.id) {
			return Err(CategoryError::InvalidParent);
		}

		let is_new = category.is_new();
		let values: [(&str, Expr); 8] = [
			("application_id", category.application_id.into()),
			("name", category.name.as_str().into()),
			("alias", category.alias.as_str().into()),
			("description", category.description.as_str().into()),
			("parent", category.parent.into()),
			("ordering", category.ordering.into()),
			("published", i64::from(category.published).into()),
			("params", category.params.to_json().into()),
		];
		if is_new {
			let stmt = Query::insert()
				.into_table(Alias::new(CATEGORY))
				.columns(values.iter().map(|(column, _)| Alias::new(*column)))
				.values_panic(values.into_iter().map(|(_, value)| value))
				.to_owned();
			category.id = self.db.insert(&stmt, CATEGORY).await?;
		} else {
			let stmt = Query::update()
				.table(Alias::new(CATEGORY))
				.values(values.into_iter().map(|(column, value)| (Alias::new(column), value)))
				.and_where(Expr::col(Alias::new("id")).eq(category.id))
				.to_owned();
			self.db.execute(&stmt).await?;
		}

		tracing::info!(id = category.id, alias = %category.alias, is_new, "saved category");
		self.saved.notify(SaveEvent::new(category.clone(), is_new)).await;
		Ok(())
	}

	/// Moves the children up to the category's parent, drops its item links
	/// and deletes it.
	pub async fn delete(&self, category: &Category) -> Result<(), CategoryError> {
		if category.is_new() {
			return Err(CategoryError::NotFound(category.id));
		}

		let reparent = Query::update()
			.table(Alias::new(CATEGORY))
			.value(Alias::new("parent"), category.parent)
			.and_where(Expr::col(Alias::new("parent")).eq(category.id))
			.and_where(Expr::col(Alias::new("application_id")).eq(category.application_id))
			.to_owned();
		self.db.execute(&reparent).await?;

		let relations = Query::delete()
			.from_table(Alias::new(CATEGORY_ITEM))
			.and_where(Expr::col(Alias::new("category_id")).eq(category.id))
			.to_owned();
		self.db.execute(&relations).await?;

		let stmt = Query::delete()
			.from_table(Alias::new(CATEGORY))
			.and_where(Expr::col(Alias::new("id")).eq(category.id))
			.to_owned();
		if self.db.execute(&stmt).await? == 0 {
			return Err(CategoryError::NotFound(category.id));
		}

		tracing::info!(id = category.id, "deleted category");
		self.deleted.notify(DeleteEvent::new(category.clone())).await;
		Ok(())
	}

	/// Compacts the ordering below each distinct parent.
	pub async fn update_order(&self, application_id: i64, parents: &[i64]) -> DbResult<()> {
		let mut done = Vec::with_capacity(parents.len());
		for parent in parents {
			if done.contains(parent) {
				continue;
			}
			done.push(*parent);
			self.reorder(application_id, *parent).await?;
		}
		Ok(())
	}

	/// Renumbers the children of `parent` as 1..n, keeping their order.
	///
	/// Rows that move by the same amount are updated together.
	pub async fn reorder(&self, application_id: i64, parent: i64) -> DbResult<()> {
		let children = self.fetch(&category_query::children(application_id, parent)).await?;

		let mut shifts: IndexMap<i64, Vec<i64>> = IndexMap::new();
		for (position, child) in children.iter().enumerate() {
			let diff = position as i64 + 1 - child.ordering;
			if diff != 0 {
				shifts.entry(diff).or_default().push(child.id);
			}
		}

		for (diff, ids) in shifts {
			let stmt = Query::update()
				.table(Alias::new(CATEGORY))
				.value(Alias::new("ordering"), Expr::col(Alias::new("ordering")).add(diff))
				.and_where(Expr::col(Alias::new("id")).is_in(ids))
				.to_owned();
			self.db.execute(&stmt).await?;
		}

		tracing::debug!(application_id, parent, children = children.len(), "reordered categories");
		Ok(())
	}

	/// Files an item under exactly `categories`.
	pub async fn save_item_relations(&self, item_id: i64, categories: &[i64]) -> DbResult<()> {
		let delete = Query::delete()
			.from_table(Alias::new(CATEGORY_ITEM))
			.and_where(Expr::col(Alias::new("item_id")).eq(item_id))
			.to_owned();
		self.db.execute(&delete).await?;

		let mut unique: Vec<i64> = categories.to_vec();
		unique.sort_unstable();
		unique.dedup();
		if unique.is_empty() {
			return Ok(());
		}

		let mut insert = Query::insert()
			.into_table(Alias::new(CATEGORY_ITEM))
			.columns([Alias::new("category_id"), Alias::new("item_id")])
			.to_owned();
		for category_id in unique {
			insert.values_panic([category_id.into(), item_id.into()]);
		}
		self.db.execute(&insert).await?;
		Ok(())
	}

	/// Ids of the categories an item is filed under, including 0 for the
	/// frontpage.
	pub async fn item_category_ids(&self, item_id: i64) -> DbResult<Vec<i64>> {
		let rows = self
			.db
			.fetch_all(&category_query::item_category_ids(item_id))
			.await?;
		rows.iter().map(|row| get_i64(row, "category_id")).collect()
	}
}
