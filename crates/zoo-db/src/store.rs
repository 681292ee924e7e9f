use crate::backend::Database;
use crate::error::DbResult;
use crate::repository::{
	ApplicationRepository, CategoryRepository, CommentRepository, ItemRepository, TagRepository,
};
use crate::schema;

/// Every repository over one database
///
/// The item repository shares its tag repository (and that repository's
/// signals) with [`ContentStore::tags`].
#[derive(Clone)]
pub struct ContentStore {
	db: Database,
	pub applications: ApplicationRepository,
	pub items: ItemRepository,
	pub categories: CategoryRepository,
	pub comments: CommentRepository,
	pub tags: TagRepository,
}

impl ContentStore {
	pub fn new(db: Database) -> Self {
		let applications = ApplicationRepository::new(db.clone());
		let tags = TagRepository::new(db.clone());
		Self {
			items: ItemRepository::new(db.clone(), applications.clone(), tags.clone()),
			categories: CategoryRepository::new(db.clone()),
			comments: CommentRepository::new(db.clone()),
			applications,
			tags,
			db,
		}
	}

	pub async fn connect(url: &str, max_connections: u32) -> DbResult<Self> {
		Ok(Self::new(Database::connect(url, max_connections).await?))
	}

	/// Creates the schema if it is missing.
	pub async fn install(&self) -> DbResult<()> {
		schema::install(&self.db).await
	}

	pub fn database(&self) -> &Database {
		&self.db
	}
}
