use thiserror::Error;
use zoo_core::SignalError;

/// Storage-level errors
#[derive(Debug, Error)]
pub enum DbError {
	/// Error reported by the database driver
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	/// A column could not be decoded into the expected type
	#[error("Invalid value in column '{column}': {message}")]
	Decode { column: String, message: String },

	/// The connection URL names a database we cannot talk to
	#[error("Unsupported database backend: {0}")]
	UnsupportedBackend(String),

	/// The driver did not report the id of an inserted row
	#[error("Insert into {0} did not return an id")]
	MissingInsertId(String),

	/// Stored JSON could not be read
	#[error("Invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

impl DbError {
	pub(crate) fn decode(column: &str, message: impl ToString) -> Self {
		DbError::Decode {
			column: column.to_string(),
			message: message.to_string(),
		}
	}
}

pub type DbResult<T> = std::result::Result<T, DbError>;

/// Item save and delete failures
#[derive(Debug, Error)]
pub enum ItemError {
	/// The item's application does not exist
	#[error("Invalid application id")]
	InvalidApplication,

	/// The item has no type
	#[error("Invalid type id")]
	InvalidType,

	/// The item has no name
	#[error("Invalid name")]
	InvalidName,

	/// The alias is empty or not in sluggified form
	#[error("Invalid slug")]
	InvalidAlias,

	/// Another item already uses the alias
	#[error("Alias already exists, please choose a unique alias")]
	AliasExists,

	/// No item with this id
	#[error("Item not found: {0}")]
	NotFound(i64),

	/// A lifecycle receiver rejected the operation
	#[error(transparent)]
	Signal(#[from] SignalError),

	/// Saving the item's tags failed
	#[error(transparent)]
	Tag(#[from] TagError),

	#[error(transparent)]
	Database(#[from] DbError),
}

impl From<sqlx::Error> for ItemError {
	fn from(error: sqlx::Error) -> Self {
		ItemError::Database(DbError::Sqlx(error))
	}
}

/// Category save and delete failures
#[derive(Debug, Error)]
pub enum CategoryError {
	#[error("Invalid name")]
	InvalidName,

	#[error("Invalid slug")]
	InvalidAlias,

	#[error("Slug already exists, please choose a unique slug")]
	AliasExists,

	#[error("Invalid parent id")]
	InvalidParent,

	#[error("Category not found: {0}")]
	NotFound(i64),

	#[error(transparent)]
	Database(#[from] DbError),
}

impl From<sqlx::Error> for CategoryError {
	fn from(error: sqlx::Error) -> Self {
		CategoryError::Database(DbError::Sqlx(error))
	}
}

/// Comment save and delete failures
#[derive(Debug, Error)]
pub enum CommentError {
	#[error("Invalid item id")]
	InvalidItem,

	#[error("Comment not found: {0}")]
	NotFound(i64),

	#[error(transparent)]
	Database(#[from] DbError),
}

impl From<sqlx::Error> for CommentError {
	fn from(error: sqlx::Error) -> Self {
		CommentError::Database(DbError::Sqlx(error))
	}
}

/// Tag failures
#[derive(Debug, Error)]
pub enum TagError {
	#[error("Invalid tag name")]
	InvalidName,

	#[error(transparent)]
	Database(#[from] DbError),
}

impl From<sqlx::Error> for TagError {
	fn from(error: sqlx::Error) -> Self {
		TagError::Database(DbError::Sqlx(error))
	}
}
