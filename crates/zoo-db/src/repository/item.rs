use parking_lot::RwLock;
use sea_query::{Alias, Asterisk, Expr, ExprTrait, Query, SelectStatement};
use sqlx::any::AnyRow;
use std::sync::Arc;
use zoo_core::{
	DeleteEvent, Item, ItemState, Params, SaveEvent, Signal, User, format_datetime, is_slug,
	sluggify,
};

use super::ApplicationRepository;
use super::TagRepository;
use crate::backend::{
	Database, get_bool, get_datetime, get_i64, get_opt_datetime, get_string,
};
use crate::error::{DbResult, ItemError};
use crate::order::{OrderHook, OrderSpec, ResolvedOrder};
use crate::query::item::{self as item_query, UserItemFilter};
use crate::schema::{CATEGORY_ITEM, COMMENT, ITEM, RATING, SEARCH, TAG};
use crate::scope::{Page, Scope};

fn item_from_row(row: &AnyRow) -> DbResult<Item> {
	let elements = get_string(row, "elements")?;
	Ok(Item {
		id: get_i64(row, "id")?,
		application_id: get_i64(row, "application_id")?,
		type_id: get_string(row, "type")?,
		name: get_string(row, "name")?,
		alias: get_string(row, "alias")?,
		created: get_datetime(row, "created")?,
		modified: get_datetime(row, "modified")?,
		modified_by: get_i64(row, "modified_by")?,
		publish_up: get_opt_datetime(row, "publish_up")?,
		publish_down: get_opt_datetime(row, "publish_down")?,
		priority: get_i64(row, "priority")?,
		hits: get_i64(row, "hits")?,
		state: ItemState::from_i64(get_i64(row, "state")?),
		access: get_i64(row, "access")?,
		created_by: get_i64(row, "created_by")?,
		created_by_alias: get_string(row, "created_by_alias")?,
		searchable: get_bool(row, "searchable")?,
		params: Params::from_json(&get_string(row, "params")?),
		elements: if elements.trim().is_empty() {
			Default::default()
		} else {
			serde_json::from_str(&elements)?
		},
		tags: Vec::new(),
	})
}

fn item_values(item: &Item) -> DbResult<Vec<(&'static str, Expr)>> {
	Ok(vec![
		("application_id", item.application_id.into()),
		("type", item.type_id.as_str().into()),
		("name", item.name.as_str().into()),
		("alias", item.alias.as_str().into()),
		("created", format_datetime(&item.created).into()),
		("modified", format_datetime(&item.modified).into()),
		("modified_by", item.modified_by.into()),
		("publish_up", item.publish_up.as_ref().map(format_datetime).into()),
		("publish_down", item.publish_down.as_ref().map(format_datetime).into()),
		("priority", item.priority.into()),
		("hits", item.hits.into()),
		("state", item.state.as_i64().into()),
		("access", item.access.into()),
		("created_by", item.created_by.into()),
		("created_by_alias", item.created_by_alias.as_str().into()),
		("searchable", i64::from(item.searchable).into()),
		("params", item.params.to_json().into()),
		("elements", serde_json::to_string(&item.elements)?.into()),
	])
}

/// Items with their search rows, tags and relations
///
/// Listings return items without their tags; [`ItemRepository::get`] loads
/// them.
#[derive(Clone)]
pub struct ItemRepository {
	db: Database,
	applications: ApplicationRepository,
	tags: TagRepository,
	hooks: Arc<RwLock<Vec<Arc<dyn OrderHook>>>>,
	saving: Signal<SaveEvent<Item>>,
	saved: Signal<SaveEvent<Item>>,
	deleted: Signal<DeleteEvent<Item>>,
}

impl ItemRepository {
	pub fn new(db: Database, applications: ApplicationRepository, tags: TagRepository) -> Self {
		Self {
			db,
			applications,
			tags,
			hooks: Arc::new(RwLock::new(Vec::new())),
			saving: Signal::new("item.saving"),
			saved: Signal::new("item.saved"),
			deleted: Signal::new("item.deleted"),
		}
	}

	/// Fired after validation and before the row is written; a failing
	/// receiver aborts the save.
	pub fn saving(&self) -> &Signal<SaveEvent<Item>> {
		&self.saving
	}

	pub fn saved(&self) -> &Signal<SaveEvent<Item>> {
		&self.saved
	}

	pub fn deleted(&self) -> &Signal<DeleteEvent<Item>> {
		&self.deleted
	}

	pub fn tags(&self) -> &TagRepository {
		&self.tags
	}

	pub fn add_order_hook(&self, hook: Arc<dyn OrderHook>) {
		self.hooks.write().push(hook);
	}

	/// Resolves `order` through the registered hooks.
	pub fn resolve_order(&self, order: &OrderSpec, ignore_priority: bool) -> ResolvedOrder {
		let hooks = self.hooks.read().clone();
		order.resolve_with_hooks(ignore_priority, &hooks)
	}

	async fn fetch_items(&self, stmt: &SelectStatement) -> DbResult<Vec<Item>> {
		let rows = self.db.fetch_all(stmt).await?;
		rows.iter().map(item_from_row).collect()
	}

	/// Loads an item with its tags.
	pub async fn get(&self, id: i64) -> DbResult<Option<Item>> {
		let stmt = Query::select()
			.column(Asterisk)
			.from(Alias::new(ITEM))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned();
		let Some(row) = self.db.fetch_optional(&stmt).await? else {
			return Ok(None);
		};
		let mut item = item_from_row(&row)?;
		item.tags = self.tags.item_tags(id).await?;
		Ok(Some(item))
	}

	/// Whether an item other than `except_id` uses `alias`.
	pub async fn alias_exists(&self, alias: &str, except_id: i64) -> DbResult<bool> {
		let stmt = Query::select()
			.expr(Expr::cust("COUNT(*) AS count"))
			.from(Alias::new(ITEM))
			.and_where(Expr::col(Alias::new("alias")).eq(alias))
			.and_where(Expr::col(Alias::new("id")).ne(except_id))
			.to_owned();
		Ok(self.db.fetch_count(&stmt).await? > 0)
	}

	/// `base` sluggified, suffixed with `-2`, `-3`, ... until no other item
	/// uses it.
	pub async fn unique_alias(&self, id: i64, base: &str) -> DbResult<String> {
		let mut base = sluggify(base);
		if base.is_empty() {
			base = "item".to_string();
		}
		let mut alias = base.clone();
		let mut suffix = 2;
		while self.alias_exists(&alias, id).await? {
			alias = format!("{base}-{suffix}");
			suffix += 1;
		}
		Ok(alias)
	}

	async fn validate(&self, item: &Item) -> Result<(), ItemError> {
		if !self.applications.exists(item.application_id).await? {
			return Err(ItemError::InvalidApplication);
		}
		if item.type_id.trim().is_empty() {
			return Err(ItemError::InvalidType);
		}
		if item.name.trim().is_empty() {
			return Err(ItemError::InvalidName);
		}
		if !is_slug(&item.alias) {
			return Err(ItemError::InvalidAlias);
		}
		if self.alias_exists(&item.alias, item.id).await? {
			return Err(ItemError::AliasExists);
		}
		Ok(())
	}

	/// Validates and writes the item, its search rows and its tags.
	///
	/// A new item gets its id assigned. Nothing is written when validation or
	/// a `saving` receiver fails.
	pub async fn save(&self, item: &mut Item) -> Result<(), ItemError> {
		self.validate(item).await?;

		let is_new = item.is_new();
		self.saving.send(SaveEvent::new(item.clone(), is_new)).await?;

		let values = item_values(item)?;
		if is_new {
			let stmt = Query::insert()
				.into_table(Alias::new(ITEM))
				.columns(values.iter().map(|(column, _)| Alias::new(*column)))
				.values_panic(values.into_iter().map(|(_, value)| value))
				.to_owned();
			item.id = self.db.insert(&stmt, ITEM).await?;
		} else {
			let stmt = Query::update()
				.table(Alias::new(ITEM))
				.values(values.into_iter().map(|(column, value)| (Alias::new(column), value)))
				.and_where(Expr::col(Alias::new("id")).eq(item.id))
				.to_owned();
			self.db.execute(&stmt).await?;
		}

		self.write_search_rows(item).await?;
		item.tags = self.tags.save(item.id, &item.tags).await?;

		tracing::info!(id = item.id, alias = %item.alias, is_new, "saved item");
		self.saved.notify(SaveEvent::new(item.clone(), is_new)).await;
		Ok(())
	}

	async fn write_search_rows(&self, item: &Item) -> DbResult<()> {
		let delete = Query::delete()
			.from_table(Alias::new(SEARCH))
			.and_where(Expr::col(Alias::new("item_id")).eq(item.id))
			.to_owned();
		self.db.execute(&delete).await?;

		let rows = item.search_rows();
		if rows.is_empty() {
			return Ok(());
		}
		let mut insert = Query::insert()
			.into_table(Alias::new(SEARCH))
			.columns([Alias::new("item_id"), Alias::new("element_id"), Alias::new("value")])
			.to_owned();
		for (element_id, value) in rows {
			insert.values_panic([item.id.into(), element_id.into(), value.into()]);
		}
		self.db.execute(&insert).await?;
		Ok(())
	}

	/// Deletes the item after its category links, comments, search rows,
	/// ratings and tags.
	pub async fn delete(&self, item: &Item) -> Result<(), ItemError> {
		if item.is_new() {
			return Err(ItemError::NotFound(item.id));
		}

		for table in [CATEGORY_ITEM, COMMENT, SEARCH, RATING, TAG] {
			let stmt = Query::delete()
				.from_table(Alias::new(table))
				.and_where(Expr::col(Alias::new("item_id")).eq(item.id))
				.to_owned();
			self.db.execute(&stmt).await?;
		}

		let stmt = Query::delete()
			.from_table(Alias::new(ITEM))
			.and_where(Expr::col(Alias::new("id")).eq(item.id))
			.to_owned();
		if self.db.execute(&stmt).await? == 0 {
			return Err(ItemError::NotFound(item.id));
		}

		tracing::info!(id = item.id, "deleted item");
		self.deleted.notify(DeleteEvent::new(item.clone())).await;
		Ok(())
	}

	/// Counts a view.
	pub async fn hit(&self, id: i64) -> DbResult<()> {
		let stmt = Query::update()
			.table(Alias::new(ITEM))
			.value(Alias::new("hits"), Expr::col(Alias::new("hits")).add(1))
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned();
		self.db.execute(&stmt).await?;
		Ok(())
	}

	pub async fn by_ids(
		&self,
		ids: &[i64],
		scope: &Scope,
		order: &OrderSpec,
		ignore_priority: bool,
	) -> DbResult<Vec<Item>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}
		let order = self.resolve_order(order, ignore_priority);
		self.fetch_items(&item_query::by_ids(ids, scope, &order, self.db.backend()))
			.await
	}

	#[allow(clippy::too_many_arguments)]
	pub async fn by_character(
		&self,
		application_id: i64,
		chars: &[String],
		not_in: bool,
		scope: &Scope,
		order: &OrderSpec,
		page: Page,
		ignore_priority: bool,
	) -> DbResult<Vec<Item>> {
		let order = self.resolve_order(order, ignore_priority);
		self.fetch_items(&item_query::by_character(
			application_id,
			chars,
			not_in,
			scope,
			&order,
			page,
			self.db.backend(),
		))
		.await
	}

	pub async fn by_tag(
		&self,
		application_id: i64,
		tag: &str,
		scope: &Scope,
		order: &OrderSpec,
		page: Page,
		ignore_priority: bool,
	) -> DbResult<Vec<Item>> {
		let order = self.resolve_order(order, ignore_priority);
		self.fetch_items(&item_query::by_tag(
			application_id,
			tag,
			scope,
			&order,
			page,
			self.db.backend(),
		))
		.await
	}

	pub async fn by_type(
		&self,
		type_id: &str,
		application_id: Option<i64>,
		scope: &Scope,
		order: &OrderSpec,
		page: Page,
		ignore_priority: bool,
	) -> DbResult<Vec<Item>> {
		let order = self.resolve_order(order, ignore_priority);
		self.fetch_items(&item_query::by_type(
			type_id,
			application_id,
			scope,
			&order,
			page,
			self.db.backend(),
		))
		.await
	}

	pub async fn by_category(
		&self,
		application_id: i64,
		categories: &[i64],
		scope: &Scope,
		order: &OrderSpec,
		page: Page,
		ignore_priority: bool,
	) -> DbResult<Vec<Item>> {
		if categories.is_empty() {
			return Ok(Vec::new());
		}
		let order = self.resolve_order(order, ignore_priority);
		self.fetch_items(&item_query::by_category(
			application_id,
			categories,
			scope,
			&order,
			page,
			self.db.backend(),
		))
		.await
	}

	pub async fn item_count_from_category(
		&self,
		application_id: i64,
		category_id: i64,
		scope: &Scope,
	) -> DbResult<i64> {
		self.db
			.fetch_count(&item_query::count_from_category(application_id, category_id, scope))
			.await
	}

	/// Neighbours of `item_id` in the ordered listing of `categories`.
	pub async fn prev_next(
		&self,
		application_id: i64,
		categories: &[i64],
		item_id: i64,
		scope: &Scope,
		order: &OrderSpec,
		ignore_priority: bool,
	) -> DbResult<(Option<Item>, Option<Item>)> {
		let items = self
			.by_category(application_id, categories, scope, order, Page::all(), ignore_priority)
			.await?;
		let Some(position) = items.iter().position(|item| item.id == item_id) else {
			return Ok((None, None));
		};
		let prev = position.checked_sub(1).and_then(|index| items.get(index)).cloned();
		let next = items.get(position + 1).cloned();
		Ok((prev, next))
	}

	/// Items the user created, readable with the user's own access levels.
	pub async fn by_user(
		&self,
		application_id: i64,
		user: &User,
		filter: &UserItemFilter,
		page: Page,
	) -> DbResult<Vec<Item>> {
		self.fetch_items(&item_query::by_user(
			application_id,
			user,
			filter,
			&Scope::all(),
			page,
		))
		.await
	}

	pub async fn item_count_by_user(
		&self,
		application_id: i64,
		user: &User,
		filter: &UserItemFilter,
	) -> DbResult<i64> {
		self.db
			.fetch_count(&item_query::count_by_user(application_id, user, filter, &Scope::all()))
			.await
	}

	pub async fn application_item_count(&self, application_id: i64) -> DbResult<i64> {
		self.db.fetch_count(&item_query::application_count(application_id)).await
	}

	/// Items of a type across every application of the group.
	pub async fn type_item_count(&self, type_id: &str, group: &str) -> DbResult<i64> {
		self.db.fetch_count(&item_query::type_count(type_id, group)).await
	}

	/// Searchable items whose name or search data contains `text`.
	pub async fn search(
		&self,
		text: &str,
		application_id: Option<i64>,
		scope: &Scope,
		page: Page,
	) -> DbResult<Vec<Item>> {
		if text.trim().is_empty() {
			return Ok(Vec::new());
		}
		let order = self.resolve_order(&OrderSpec::default(), false);
		self.fetch_items(&item_query::search(
			text,
			application_id,
			scope,
			&order,
			page,
			self.db.backend(),
		))
		.await
	}

	/// Items matching every `(element_id, text)` pair.
	pub async fn search_elements(
		&self,
		elements: &[(String, String)],
		application_id: Option<i64>,
		scope: &Scope,
		page: Page,
	) -> DbResult<Vec<Item>> {
		let order = self.resolve_order(&OrderSpec::default(), false);
		self.fetch_items(&item_query::search_elements(
			elements,
			application_id,
			scope,
			&order,
			page,
			self.db.backend(),
		))
		.await
	}
}
