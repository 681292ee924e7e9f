use sea_query::{Alias, Expr, ExprTrait, Order, Query};
use sqlx::any::AnyRow;
use zoo_core::{
	Comment, CommentAuthor, CommentSaveEvent, CommentState, DeleteEvent, Signal, format_datetime,
};

use crate::backend::{Database, get_datetime, get_i64, get_string};
use crate::error::{CommentError, DbResult};
use crate::query::comment as comment_query;
use crate::schema::{COMMENT, ITEM};

fn comment_from_row(row: &AnyRow) -> DbResult<Comment> {
	Ok(Comment {
		id: get_i64(row, "id")?,
		parent_id: get_i64(row, "parent_id")?,
		item_id: get_i64(row, "item_id")?,
		user_id: get_i64(row, "user_id")?,
		user_type: get_string(row, "user_type")?,
		author: get_string(row, "author")?,
		email: get_string(row, "email")?,
		url: get_string(row, "url")?,
		ip: get_string(row, "ip")?,
		created: get_datetime(row, "created")?,
		content: get_string(row, "content")?,
		state: CommentState::from_i64(get_i64(row, "state")?),
	})
}

/// Item comments and their moderation state
#[derive(Clone)]
pub struct CommentRepository {
	db: Database,
	saved: Signal<CommentSaveEvent>,
	deleted: Signal<DeleteEvent<Comment>>,
}

impl CommentRepository {
	pub fn new(db: Database) -> Self {
		Self {
			db,
			saved: Signal::new("comment.saved"),
			deleted: Signal::new("comment.deleted"),
		}
	}

	/// Fired after every save with the state the comment had before.
	pub fn saved(&self) -> &Signal<CommentSaveEvent> {
		&self.saved
	}

	pub fn deleted(&self) -> &Signal<DeleteEvent<Comment>> {
		&self.deleted
	}

	async fn fetch(&self, stmt: &sea_query::SelectStatement) -> DbResult<Vec<Comment>> {
		let rows = self.db.fetch_all(stmt).await?;
		rows.iter().map(comment_from_row).collect()
	}

	pub async fn get(&self, id: i64) -> DbResult<Option<Comment>> {
		self.db
			.fetch_optional(&comment_query::by_id(id))
			.await?
			.map(|row| comment_from_row(&row))
			.transpose()
	}

	/// Keeps every comment of a registered user in line with the name and
	/// email of this one.
	async fn sync_author(&self, comment: &Comment) -> DbResult<()> {
		let first = Query::select()
			.columns([Alias::new("author"), Alias::new("email")])
			.from(Alias::new(COMMENT))
			.and_where(Expr::col(Alias::new("user_id")).eq(comment.user_id))
			.and_where(Expr::col(Alias::new("user_type")).eq(comment.user_type.as_str()))
			.order_by(Alias::new("id"), Order::Asc)
			.limit(1)
			.to_owned();
		let Some(row) = self.db.fetch_optional(&first).await? else {
			return Ok(());
		};
		if get_string(&row, "author")? == comment.author && get_string(&row, "email")? == comment.email {
			return Ok(());
		}

		let update = Query::update()
			.table(Alias::new(COMMENT))
			.values([
				(Alias::new("author"), comment.author.as_str().into()),
				(Alias::new("email"), comment.email.as_str().into()),
			])
			.and_where(Expr::col(Alias::new("user_id")).eq(comment.user_id))
			.and_where(Expr::col(Alias::new("user_type")).eq(comment.user_type.as_str()))
			.to_owned();
		let updated = self.db.execute(&update).await?;
		tracing::debug!(user_id = comment.user_id, updated, "synced comment author");
		Ok(())
	}

	pub async fn save(&self, comment: &mut Comment) -> Result<(), CommentError> {
		let item_exists = Query::select()
			.expr(Expr::cust("COUNT(*) AS count"))
			.from(Alias::new(ITEM))
			.and_where(Expr::col(Alias::new("id")).eq(comment.item_id))
			.to_owned();
		if self.db.fetch_count(&item_exists).await? == 0 {
			return Err(CommentError::InvalidItem);
		}

		let is_new = comment.is_new();
		let old_state = if is_new {
			None
		} else {
			match self.get(comment.id).await? {
				Some(existing) => Some(existing.state),
				None => return Err(CommentError::NotFound(comment.id)),
			}
		};

		if !comment.is_guest() {
			self.sync_author(comment).await?;
		}

		let values: [(&str, Expr); 11] = [
			("parent_id", comment.parent_id.into()),
			("item_id", comment.item_id.into()),
			("user_id", comment.user_id.into()),
			("user_type", comment.user_type.as_str().into()),
			("author", comment.author.as_str().into()),
			("email", comment.email.as_str().into()),
			("url", comment.url.as_str().into()),
			("ip", comment.ip.as_str().into()),
			("created", format_datetime(&comment.created).into()),
			("content", comment.content.as_str().into()),
			("state", comment.state.as_i64().into()),
		];
		if is_new {
			let stmt = Query::insert()
				.into_table(Alias::new(COMMENT))
				.columns(values.iter().map(|(column, _)| Alias::new(*column)))
				.values_panic(values.into_iter().map(|(_, value)| value))
				.to_owned();
			comment.id = self.db.insert(&stmt, COMMENT).await?;
		} else {
			let stmt = Query::update()
				.table(Alias::new(COMMENT))
				.values(values.into_iter().map(|(column, value)| (Alias::new(column), value)))
				.and_where(Expr::col(Alias::new("id")).eq(comment.id))
				.to_owned();
			self.db.execute(&stmt).await?;
		}

		tracing::info!(id = comment.id, item_id = comment.item_id, is_new, "saved comment");
		self.saved
			.notify(CommentSaveEvent {
				comment: comment.clone(),
				is_new,
				old_state,
			})
			.await;
		Ok(())
	}

	/// Deletes the comment; its replies move up to its parent.
	pub async fn delete(&self, comment: &Comment) -> Result<(), CommentError> {
		let stmt = Query::delete()
			.from_table(Alias::new(COMMENT))
			.and_where(Expr::col(Alias::new("id")).eq(comment.id))
			.to_owned();
		if self.db.execute(&stmt).await? == 0 {
			return Err(CommentError::NotFound(comment.id));
		}

		let reparent = Query::update()
			.table(Alias::new(COMMENT))
			.value(Alias::new("parent_id"), comment.parent_id)
			.and_where(Expr::col(Alias::new("parent_id")).eq(comment.id))
			.to_owned();
		self.db.execute(&reparent).await?;

		tracing::info!(id = comment.id, "deleted comment");
		self.deleted.notify(DeleteEvent::new(comment.clone())).await;
		Ok(())
	}

	/// Comments of an item in `state`, plus the author's own in any state.
	pub async fn for_item(
		&self,
		item_id: i64,
		ascending: bool,
		author: Option<&CommentAuthor>,
		state: CommentState,
	) -> DbResult<Vec<Comment>> {
		self.fetch(&comment_query::for_item(item_id, ascending, author, state))
			.await
	}

	/// The latest comment sent from `ip` (by `author`, unless a guest).
	pub async fn last_comment(
		&self,
		ip: &str,
		author: Option<&CommentAuthor>,
	) -> DbResult<Option<Comment>> {
		Ok(self
			.fetch(&comment_query::last_comment(ip, author))
			.await?
			.into_iter()
			.next())
	}

	pub async fn latest(
		&self,
		application_id: i64,
		categories: &[i64],
		limit: u64,
	) -> DbResult<Vec<Comment>> {
		let now = chrono::Utc::now().naive_utc();
		self.fetch(&comment_query::latest(application_id, categories, limit, now))
			.await
	}

	pub async fn approved_count(&self, author: &CommentAuthor) -> DbResult<i64> {
		self.db.fetch_count(&comment_query::approved_count(author)).await
	}
}
