use sea_query::{Alias, Expr, ExprTrait, Query};
use zoo_core::{Signal, TagCount, TagsDeletedEvent, TagsSavedEvent};

use crate::backend::{Database, get_i64, get_string};
use crate::error::{DbResult, TagError};
use crate::query::tag::{self as tag_query, TagQuery};
use crate::schema::{ITEM, TAG};
use crate::scope::Scope;

/// Cleans a tag list for storage.
///
/// Names are trimmed, `.` and `/` become `_`, empty names are dropped and
/// names equal ignoring case keep their first spelling.
///
/// ```
/// use zoo_db::normalize_tags;
///
/// let tags = normalize_tags(["Rust", " rust ", "v1.0", "a/b", ""]);
/// assert_eq!(tags, vec!["Rust", "v1_0", "a_b"]);
/// ```
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen: Vec<String> = Vec::new();
	let mut result = Vec::new();
	for tag in tags {
		let tag = tag.as_ref().trim().replace(['.', '/'], "_");
		if tag.is_empty() {
			continue;
		}
		let key = tag.to_lowercase();
		if !seen.contains(&key) {
			seen.push(key);
			result.push(tag);
		}
	}
	result
}

/// Tag rows of items
#[derive(Clone)]
pub struct TagRepository {
	db: Database,
	saved: Signal<TagsSavedEvent>,
	deleted: Signal<TagsDeletedEvent>,
}

impl TagRepository {
	pub fn new(db: Database) -> Self {
		Self {
			db,
			saved: Signal::new("tag.saved"),
			deleted: Signal::new("tag.deleted"),
		}
	}

	/// Fired after an item's tags were replaced.
	pub fn saved(&self) -> &Signal<TagsSavedEvent> {
		&self.saved
	}

	/// Fired after tags were removed from an application.
	pub fn deleted(&self) -> &Signal<TagsDeletedEvent> {
		&self.deleted
	}

	/// Replaces every tag of an item and returns the stored names.
	pub async fn save<S: AsRef<str>>(&self, item_id: i64, tags: &[S]) -> Result<Vec<String>, TagError> {
		let tags = normalize_tags(tags);

		let delete = Query::delete()
			.from_table(Alias::new(TAG))
			.and_where(Expr::col(Alias::new("item_id")).eq(item_id))
			.to_owned();
		self.db.execute(&delete).await?;

		if !tags.is_empty() {
			let mut insert = Query::insert()
				.into_table(Alias::new(TAG))
				.columns([Alias::new("item_id"), Alias::new("name")])
				.to_owned();
			for tag in &tags {
				insert.values_panic([item_id.into(), tag.as_str().into()]);
			}
			self.db.execute(&insert).await?;
		}

		tracing::debug!(item_id, count = tags.len(), "saved item tags");
		self.saved
			.notify(TagsSavedEvent {
				item_id,
				tags: tags.clone(),
			})
			.await;
		Ok(tags)
	}

	/// Renames `old` to `new` on every item of the application.
	///
	/// Items already carrying `new` keep a single row.
	pub async fn update(&self, application_id: i64, old: &str, new: &str) -> Result<(), TagError> {
		let new = new.trim().replace('.', "_");
		if new.is_empty() {
			return Err(TagError::InvalidName);
		}
		if old == new {
			return Ok(());
		}

		let names = vec![old.to_string(), new.clone()];
		let rows = self
			.db
			.fetch_all(&tag_query::tagged_item_ids(application_id, &names))
			.await?;
		let item_ids = rows
			.iter()
			.map(|row| get_i64(row, "item_id"))
			.collect::<DbResult<Vec<_>>>()?;
		if item_ids.is_empty() {
			return Ok(());
		}

		let delete = Query::delete()
			.from_table(Alias::new(TAG))
			.and_where(Expr::col(Alias::new("name")).is_in(names))
			.and_where(Expr::col(Alias::new("item_id")).is_in(item_ids.clone()))
			.to_owned();
		self.db.execute(&delete).await?;

		let mut insert = Query::insert()
			.into_table(Alias::new(TAG))
			.columns([Alias::new("item_id"), Alias::new("name")])
			.to_owned();
		for item_id in &item_ids {
			insert.values_panic([(*item_id).into(), new.as_str().into()]);
		}
		self.db.execute(&insert).await?;

		tracing::info!(application_id, old, new = %new, items = item_ids.len(), "renamed tag");
		Ok(())
	}

	/// Removes `tags` from every item of the application.
	///
	/// Does nothing for an empty list or application 0.
	pub async fn delete<S: AsRef<str>>(&self, application_id: i64, tags: &[S]) -> Result<(), TagError> {
		let tags: Vec<String> = tags
			.iter()
			.map(|tag| tag.as_ref().to_string())
			.filter(|tag| !tag.is_empty())
			.collect();
		if tags.is_empty() || application_id == 0 {
			return Ok(());
		}

		let application_items = Query::select()
			.column(Alias::new("id"))
			.from(Alias::new(ITEM))
			.and_where(Expr::col(Alias::new("application_id")).eq(application_id))
			.to_owned();
		let delete = Query::delete()
			.from_table(Alias::new(TAG))
			.and_where(Expr::col(Alias::new("name")).is_in(tags.clone()))
			.and_where(Expr::col(Alias::new("item_id")).in_subquery(application_items))
			.to_owned();
		let removed = self.db.execute(&delete).await?;

		tracing::info!(application_id, removed, "deleted tags");
		self.deleted
			.notify(TagsDeletedEvent {
				application_id,
				tags,
			})
			.await;
		Ok(())
	}

	pub async fn all(&self, query: &TagQuery, scope: &Scope) -> DbResult<Vec<TagCount>> {
		let rows = self.db.fetch_all(&tag_query::all(query, scope)).await?;
		rows.iter()
			.map(|row| {
				Ok(TagCount {
					name: get_string(row, "name")?,
					items: get_i64(row, "items")?,
				})
			})
			.collect()
	}

	/// Number of distinct tag names, optionally narrowed to an application and
	/// a name substring.
	pub async fn count(&self, application_id: Option<i64>, search: Option<&str>) -> DbResult<i64> {
		self.db.fetch_count(&tag_query::count(application_id, search)).await
	}

	pub async fn item_tags(&self, item_id: i64) -> DbResult<Vec<String>> {
		let rows = self.db.fetch_all(&tag_query::item_tags(item_id)).await?;
		rows.iter().map(|row| get_string(row, "name")).collect()
	}
}
