//! Tag clouds, renames and removals

use crate::fixtures::{article, create_application, create_category, create_item, file_under, store};
use parking_lot::Mutex;
use rstest::rstest;
use std::sync::Arc;
use zoo_core::{Category, ItemState, TagCount};
use zoo_db::{ContentStore, Scope, TagError, TagOrder, TagQuery};

fn cloud(tags: &[TagCount]) -> Vec<(&str, i64)> {
	tags.iter().map(|tag| (tag.name.as_str(), tag.items)).collect()
}

#[rstest]
#[tokio::test]
async fn test_cloud_counts_items_per_tag(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	create_item(&store, article(blog.id, "One").with_tags(["rust", "web"])).await;
	create_item(&store, article(blog.id, "Two").with_tags(["rust"])).await;
	create_item(
		&store,
		article(blog.id, "Three")
			.with_tags(["draft"])
			.with_state(ItemState::Unpublished),
	)
	.await;

	// Act
	let by_name = store.tags.all(&TagQuery::new(blog.id), &Scope::all()).await.unwrap();
	let by_items = store
		.tags
		.all(
			&TagQuery::new(blog.id).with_order(TagOrder::Items).with_published(true),
			&Scope::all(),
		)
		.await
		.unwrap();
	let searched = store
		.tags
		.all(&TagQuery::new(blog.id).with_search("RU"), &Scope::all())
		.await
		.unwrap();

	// Assert
	assert_eq!(cloud(&by_name), vec![("draft", 1), ("rust", 2), ("web", 1)]);
	assert_eq!(cloud(&by_items), vec![("rust", 2), ("web", 1)]);
	assert_eq!(cloud(&searched), vec![("rust", 2)]);
	assert_eq!(store.tags.count(Some(blog.id), None).await.unwrap(), 3);
}

#[rstest]
#[tokio::test]
async fn test_cloud_by_category(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let news = create_category(&store, Category::new(blog.id, "News").with_alias("news")).await;
	let filed = create_item(&store, article(blog.id, "Filed").with_tags(["inside"])).await;
	create_item(&store, article(blog.id, "Loose").with_tags(["outside"])).await;
	file_under(&store, &filed, &[news.id]).await;

	// Act
	let tags = store
		.tags
		.all(&TagQuery::new(blog.id).with_category(news.id), &Scope::all())
		.await
		.unwrap();

	// Assert
	assert_eq!(cloud(&tags), vec![("inside", 1)]);
}

#[rstest]
#[tokio::test]
async fn test_update_renames_and_merges(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let first = create_item(&store, article(blog.id, "One").with_tags(["js"])).await;
	let second = create_item(&store, article(blog.id, "Two").with_tags(["js", "javascript"])).await;

	// Act
	store.tags.update(blog.id, "js", "javascript").await.unwrap();
	let empty = store.tags.update(blog.id, "javascript", " ").await;

	// Assert
	assert_eq!(store.tags.item_tags(first.id).await.unwrap(), vec!["javascript"]);
	assert_eq!(store.tags.item_tags(second.id).await.unwrap(), vec!["javascript"]);
	assert!(matches!(empty, Err(TagError::InvalidName)));
}

#[rstest]
#[tokio::test]
async fn test_delete_is_scoped_to_application(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let shop = create_application(&store, "Shop").await;
	let post = create_item(&store, article(blog.id, "Post").with_tags(["sale", "keep"])).await;
	let product = create_item(&store, article(shop.id, "Product").with_tags(["sale"])).await;
	let events = Arc::new(Mutex::new(Vec::new()));
	let sink = events.clone();
	store.tags.deleted().connect(move |event| {
		let sink = sink.clone();
		async move {
			sink.lock().push((event.application_id, event.tags.clone()));
			Ok(())
		}
	});

	// Act
	store.tags.delete(blog.id, &["sale"]).await.unwrap();
	store.tags.delete(0, &["keep"]).await.unwrap();

	// Assert
	assert_eq!(store.tags.item_tags(post.id).await.unwrap(), vec!["keep"]);
	assert_eq!(store.tags.item_tags(product.id).await.unwrap(), vec!["sale"]);
	assert_eq!(*events.lock(), vec![(blog.id, vec!["sale".to_string()])]);
}
