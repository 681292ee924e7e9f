//! Database fixture for zoo-db tests
//!
//! Every test gets its own in-memory SQLite database with the schema
//! installed. The pool holds a single connection so the database lives as
//! long as the store.

use chrono::{Duration, NaiveDateTime};
use rstest::fixture;
use zoo_core::{Application, Category, Item, ItemState, sluggify};
use zoo_db::ContentStore;

/// Fresh store over an empty in-memory database
#[fixture]
pub async fn store() -> ContentStore {
	let store = ContentStore::connect("sqlite::memory:", 1)
		.await
		.expect("Failed to open in-memory database");
	store.install().await.expect("Failed to install schema");
	store
}

/// Current time truncated to whole seconds, as stored
pub fn now() -> NaiveDateTime {
	let now = chrono::Utc::now().naive_utc();
	now - Duration::nanoseconds(i64::from(now.and_utc().timestamp_subsec_nanos()))
}

pub async fn create_application(store: &ContentStore, name: &str) -> Application {
	let mut application = Application::new(name, "blog");
	store
		.applications
		.save(&mut application)
		.await
		.expect("Failed to save application");
	application
}

/// Published item of type `article` with an alias derived from its name
pub fn article(application_id: i64, name: &str) -> Item {
	Item::new(application_id, "article", name)
		.with_alias(sluggify(name))
		.with_state(ItemState::Published)
}

pub async fn create_item(store: &ContentStore, item: Item) -> Item {
	let mut item = item;
	store.items.save(&mut item).await.expect("Failed to save item");
	item
}

pub async fn create_category(store: &ContentStore, category: Category) -> Category {
	let mut category = category;
	store
		.categories
		.save(&mut category)
		.await
		.expect("Failed to save category");
	category
}

/// Files the item under the categories.
pub async fn file_under(store: &ContentStore, item: &Item, categories: &[i64]) {
	store
		.categories
		.save_item_relations(item.id, categories)
		.await
		.expect("Failed to save category relations");
}
