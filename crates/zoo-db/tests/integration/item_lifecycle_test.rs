//! Item validation, save and cascading delete

use crate::fixtures::{article, create_application, create_category, create_item, file_under, store};
use parking_lot::Mutex;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use zoo_core::{Category, Comment, CommentAuthor, SignalError};
use zoo_db::{ContentStore, ItemError, Page, Scope, TagQuery};

#[rstest]
#[tokio::test]
async fn test_save_assigns_id_and_loads_back(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let mut item = article(blog.id, "First Post").with_tags(["rust", " Rust ", "web"]);

	// Act
	store.items.save(&mut item).await.unwrap();
	let loaded = store.items.get(item.id).await.unwrap().unwrap();

	// Assert
	assert!(item.id > 0);
	assert_eq!(loaded.name, "First Post");
	assert_eq!(loaded.alias, "first-post");
	assert_eq!(loaded.tags, vec!["rust".to_string(), "web".to_string()]);
}

#[rstest]
#[case::unknown_application("application")]
#[case::empty_type("type")]
#[case::empty_name("name")]
#[case::bad_alias("alias")]
#[tokio::test]
async fn test_invalid_item_is_not_persisted(#[future] store: ContentStore, #[case] field: &str) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let mut item = article(blog.id, "Broken");
	match field {
		"application" => item.application_id = blog.id + 100,
		"type" => item.type_id = String::new(),
		"name" => item.name = "  ".to_string(),
		_ => item.alias = "Not A Slug".to_string(),
	}

	// Act
	let result = store.items.save(&mut item).await;

	// Assert
	let error = result.unwrap_err();
	let expected = match field {
		"application" => matches!(error, ItemError::InvalidApplication),
		"type" => matches!(error, ItemError::InvalidType),
		"name" => matches!(error, ItemError::InvalidName),
		_ => matches!(error, ItemError::InvalidAlias),
	};
	assert!(expected, "unexpected error {error:?}");
	assert_eq!(item.id, 0);
	assert_eq!(store.items.application_item_count(blog.id).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_duplicate_alias_is_rejected(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	create_item(&store, article(blog.id, "Same")).await;
	let mut duplicate = article(blog.id, "Same");

	// Act
	let result = store.items.save(&mut duplicate).await;

	// Assert
	assert!(matches!(result, Err(ItemError::AliasExists)));
	assert_eq!(store.items.application_item_count(blog.id).await.unwrap(), 1);
}

#[rstest]
#[tokio::test]
async fn test_unique_alias_appends_counter(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let first = create_item(&store, article(blog.id, "Hello World")).await;
	create_item(&store, article(blog.id, "Hello World 2").with_alias("hello-world-2")).await;

	// Act
	let fresh = store.items.unique_alias(0, "Hello World").await.unwrap();
	let own = store.items.unique_alias(first.id, "Hello World").await.unwrap();
	let fallback = store.items.unique_alias(0, "!!!").await.unwrap();

	// Assert
	assert_eq!(fresh, "hello-world-3");
	assert_eq!(own, "hello-world");
	assert_eq!(fallback, "item");
}

#[rstest]
#[tokio::test]
async fn test_saving_receiver_can_veto(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	store
		.items
		.saving()
		.connect(|_| async { Err(SignalError::failed("read only")) });
	let mut item = article(blog.id, "Vetoed");

	// Act
	let result = store.items.save(&mut item).await;

	// Assert
	assert!(matches!(result, Err(ItemError::Signal(_))));
	assert_eq!(store.items.application_item_count(blog.id).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_update_keeps_id_and_reports_not_new(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let mut item = create_item(&store, article(blog.id, "Draft")).await;
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = events.clone();
	store.items.saved().connect(move |event| {
		let sink = sink.clone();
		async move {
			sink.lock().push(event.is_new);
			Ok(())
		}
	});

	// Act
	item.name = "Final".to_string();
	let id = item.id;
	store.items.save(&mut item).await.unwrap();

	// Assert
	assert_eq!(item.id, id);
	assert_eq!(*events.lock(), vec![false]);
	assert_eq!(store.items.get(id).await.unwrap().unwrap().name, "Final");
}

#[rstest]
#[tokio::test]
async fn test_delete_removes_dependents(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let news = create_category(&store, Category::new(blog.id, "News").with_alias("news")).await;
	let item = create_item(
		&store,
		article(blog.id, "Doomed")
			.with_element("body", json!("some searchable text"))
			.with_tags(["gone"]),
	)
	.await;
	file_under(&store, &item, &[news.id]).await;
	let mut comment = Comment::new(item.id, &CommentAuthor::guest("Ann", "ann@example.com"), "Hi");
	store.comments.save(&mut comment).await.unwrap();
	let deleted = Arc::new(Mutex::new(Vec::new()));
	let sink = deleted.clone();
	store.items.deleted().connect(move |event| {
		let sink = sink.clone();
		async move {
			sink.lock().push(event.instance.id);
			Ok(())
		}
	});

	// Act
	store.items.delete(&item).await.unwrap();

	// Assert
	assert!(store.items.get(item.id).await.unwrap().is_none());
	assert!(store.comments.get(comment.id).await.unwrap().is_none());
	assert!(store.categories.item_category_ids(item.id).await.unwrap().is_empty());
	assert!(store.tags.item_tags(item.id).await.unwrap().is_empty());
	assert!(
		store
			.tags
			.all(&TagQuery::new(blog.id), &Scope::all())
			.await
			.unwrap()
			.is_empty()
	);
	assert!(
		store
			.items
			.search("searchable", Some(blog.id), &Scope::all(), Page::all())
			.await
			.unwrap()
			.is_empty()
	);
	assert_eq!(*deleted.lock(), vec![item.id]);
}

#[rstest]
#[tokio::test]
async fn test_delete_unsaved_item_fails(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let item = article(1, "Never saved");

	// Act
	let result = store.items.delete(&item).await;

	// Assert
	assert!(matches!(result, Err(ItemError::NotFound(0))));
}

#[rstest]
#[tokio::test]
async fn test_hit_counts_views(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let item = create_item(&store, article(blog.id, "Popular")).await;

	// Act
	store.items.hit(item.id).await.unwrap();
	store.items.hit(item.id).await.unwrap();

	// Assert
	assert_eq!(store.items.get(item.id).await.unwrap().unwrap().hits, 2);
}
