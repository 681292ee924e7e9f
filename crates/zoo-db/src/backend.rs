//! Connection handling and per-backend SQL rendering.

use chrono::NaiveDateTime;
use sea_query::{
	MysqlQueryBuilder, PostgresQueryBuilder, QueryStatementWriter, SchemaStatementBuilder,
	SqliteQueryBuilder,
};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};
use std::sync::{Arc, Once};

use zoo_core::parse_datetime;

use crate::error::{DbError, DbResult};

static INSTALL_DRIVERS: Once = Once::new();

/// SQL dialect of the connected database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
	Postgres,
	MySql,
	Sqlite,
}

impl DatabaseBackend {
	/// Detects the dialect from a connection URL.
	pub fn from_url(url: &str) -> DbResult<Self> {
		let scheme = url.split(':').next().unwrap_or_default();
		match scheme {
			"sqlite" => Ok(DatabaseBackend::Sqlite),
			"mysql" | "mariadb" => Ok(DatabaseBackend::MySql),
			"postgres" | "postgresql" => Ok(DatabaseBackend::Postgres),
			other => Err(DbError::UnsupportedBackend(other.to_string())),
		}
	}

	/// Renders a DML statement with inlined, escaped values.
	pub fn build<T: QueryStatementWriter>(&self, stmt: &T) -> String {
		match self {
			DatabaseBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
			DatabaseBackend::MySql => stmt.to_string(MysqlQueryBuilder),
			DatabaseBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
		}
	}

	/// Renders a DDL statement.
	pub fn build_schema<T: SchemaStatementBuilder>(&self, stmt: &T) -> String {
		match self {
			DatabaseBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
			DatabaseBackend::MySql => stmt.to_string(MysqlQueryBuilder),
			DatabaseBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
		}
	}
}

/// A pooled connection to the content store database
///
/// Cloning is cheap; clones share the pool.
#[derive(Clone, Debug)]
pub struct Database {
	pool: Arc<AnyPool>,
	backend: DatabaseBackend,
}

impl Database {
	/// Connects to `url` (`sqlite:`, `mysql://` or `postgres://`).
	pub async fn connect(url: &str, max_connections: u32) -> DbResult<Self> {
		INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
		let backend = DatabaseBackend::from_url(url)?;

		// In-memory SQLite lives and dies with its connection
		let in_memory = url.contains(":memory:");
		let max_connections = if in_memory { 1 } else { max_connections.max(1) };

		let pool = AnyPoolOptions::new()
			.min_connections(if in_memory { 1 } else { 0 })
			.max_connections(max_connections)
			.idle_timeout(if in_memory { None } else { Some(std::time::Duration::from_secs(600)) })
			.max_lifetime(if in_memory { None } else { Some(std::time::Duration::from_secs(1800)) })
			.connect(url)
			.await?;

		tracing::debug!(?backend, max_connections, "connected to database");
		Ok(Self {
			pool: Arc::new(pool),
			backend,
		})
	}

	/// Wraps an existing pool.
	pub fn from_pool(pool: Arc<AnyPool>, backend: DatabaseBackend) -> Self {
		Self { pool, backend }
	}

	pub fn pool(&self) -> &AnyPool {
		&self.pool
	}

	pub fn backend(&self) -> DatabaseBackend {
		self.backend
	}

	pub fn build<T: QueryStatementWriter>(&self, stmt: &T) -> String {
		self.backend.build(stmt)
	}

	/// Executes a statement and returns the number of affected rows.
	pub async fn execute<T: QueryStatementWriter>(&self, stmt: &T) -> DbResult<u64> {
		let sql = self.build(stmt);
		tracing::trace!(%sql, "execute");
		let result = sqlx::query(&sql).execute(&*self.pool).await?;
		Ok(result.rows_affected())
	}

	pub async fn execute_raw(&self, sql: &str) -> DbResult<u64> {
		tracing::trace!(%sql, "execute");
		let result = sqlx::query(sql).execute(&*self.pool).await?;
		Ok(result.rows_affected())
	}

	pub async fn fetch_all<T: QueryStatementWriter>(&self, stmt: &T) -> DbResult<Vec<AnyRow>> {
		let sql = self.build(stmt);
		tracing::trace!(%sql, "fetch_all");
		Ok(sqlx::query(&sql).fetch_all(&*self.pool).await?)
	}

	pub async fn fetch_optional<T: QueryStatementWriter>(
		&self,
		stmt: &T,
	) -> DbResult<Option<AnyRow>> {
		let sql = self.build(stmt);
		tracing::trace!(%sql, "fetch_optional");
		Ok(sqlx::query(&sql).fetch_optional(&*self.pool).await?)
	}

	/// Runs `setup` and then `stmt` on the same pooled connection, for
	/// session-scoped settings the query depends on.
	pub async fn fetch_all_after<T: QueryStatementWriter>(
		&self,
		setup: &str,
		stmt: &T,
	) -> DbResult<Vec<AnyRow>> {
		let sql = self.build(stmt);
		let mut conn = self.pool.acquire().await?;
		tracing::trace!(%setup, %sql, "fetch_all_after");
		sqlx::query(setup).execute(&mut *conn).await?;
		Ok(sqlx::query(&sql).fetch_all(&mut *conn).await?)
	}

	/// Runs a `SELECT COUNT(...) AS count` style statement.
	pub async fn fetch_count<T: QueryStatementWriter>(&self, stmt: &T) -> DbResult<i64> {
		match self.fetch_optional(stmt).await? {
			Some(row) => get_i64(&row, "count"),
			None => Ok(0),
		}
	}

	/// Inserts one row and returns its generated `id`.
	///
	/// PostgreSQL and SQLite report the id through `RETURNING`; the Any
	/// driver only carries a last insert id for MySQL.
	pub async fn insert(&self, stmt: &sea_query::InsertStatement, table: &str) -> DbResult<i64> {
		match self.backend {
			DatabaseBackend::Postgres | DatabaseBackend::Sqlite => {
				let mut stmt = stmt.clone();
				stmt.returning_col(sea_query::Alias::new("id"));
				let sql = self.build(&stmt);
				let row = sqlx::query(&sql).fetch_one(&*self.pool).await?;
				get_i64(&row, "id")
			}
			_ => {
				let sql = self.build(stmt);
				let result = sqlx::query(&sql).execute(&*self.pool).await?;
				result
					.last_insert_id()
					.ok_or_else(|| DbError::MissingInsertId(table.to_string()))
			}
		}
	}
}

/// Reads an integer column, tolerating drivers that report it as text.
pub(crate) fn get_i64(row: &AnyRow, column: &str) -> DbResult<i64> {
	if let Ok(value) = row.try_get::<i64, _>(column) {
		return Ok(value);
	}
	if let Ok(value) = row.try_get::<i32, _>(column) {
		return Ok(i64::from(value));
	}
	let text: String = row.try_get(column).map_err(|e| DbError::decode(column, e))?;
	text.trim()
		.parse()
		.map_err(|_| DbError::decode(column, format!("'{text}' is not an integer")))
}

pub(crate) fn get_opt_string(row: &AnyRow, column: &str) -> DbResult<Option<String>> {
	row.try_get::<Option<String>, _>(column)
		.map_err(|e| DbError::decode(column, e))
}

pub(crate) fn get_string(row: &AnyRow, column: &str) -> DbResult<String> {
	Ok(get_opt_string(row, column)?.unwrap_or_default())
}

pub(crate) fn get_bool(row: &AnyRow, column: &str) -> DbResult<bool> {
	Ok(get_i64(row, column)? != 0)
}

/// Reads a nullable timestamp column; empty text counts as NULL.
pub(crate) fn get_opt_datetime(row: &AnyRow, column: &str) -> DbResult<Option<NaiveDateTime>> {
	match get_opt_string(row, column)? {
		Some(text) if !text.trim().is_empty() => parse_datetime(&text)
			.map(Some)
			.ok_or_else(|| DbError::decode(column, format!("'{text}' is not a timestamp"))),
		_ => Ok(None),
	}
}

pub(crate) fn get_datetime(row: &AnyRow, column: &str) -> DbResult<NaiveDateTime> {
	get_opt_datetime(row, column)?.ok_or_else(|| DbError::decode(column, "missing timestamp"))
}
