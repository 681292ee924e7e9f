//! Category validation, tree maintenance and item counts

use crate::fixtures::{article, create_application, create_category, create_item, file_under, store};
use rstest::rstest;
use zoo_core::{Category, ItemState};
use zoo_db::{CategoryError, ContentStore, Scope};

#[rstest]
#[tokio::test]
async fn test_category_validation(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let shop = create_application(&store, "Shop").await;
	create_category(&store, Category::new(blog.id, "News").with_alias("news")).await;

	// Act
	let unnamed = store.categories.save(&mut Category::new(blog.id, " ").with_alias("blank")).await;
	let bad_alias = store.categories.save(&mut Category::new(blog.id, "Bad").with_alias("Bad Alias")).await;
	let taken = store.categories.save(&mut Category::new(blog.id, "News 2").with_alias("news")).await;
	let negative = store
		.categories
		.save(&mut Category::new(blog.id, "Orphan").with_alias("orphan").with_parent(-1))
		.await;
	let other_application = store.categories.save(&mut Category::new(shop.id, "News").with_alias("news")).await;

	// Assert
	assert!(matches!(unnamed, Err(CategoryError::InvalidName)));
	assert!(matches!(bad_alias, Err(CategoryError::InvalidAlias)));
	assert!(matches!(taken, Err(CategoryError::AliasExists)));
	assert!(matches!(negative, Err(CategoryError::InvalidParent)));
	assert!(other_application.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_category_cannot_be_its_own_parent(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let mut news = create_category(&store, Category::new(blog.id, "News").with_alias("news")).await;

	// Act
	news.parent = news.id;
	let result = store.categories.save(&mut news).await;

	// Assert
	assert!(matches!(result, Err(CategoryError::InvalidParent)));
}

#[rstest]
#[tokio::test]
async fn test_delete_moves_children_up_and_unlinks_items(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let root = create_category(&store, Category::new(blog.id, "Root").with_alias("root")).await;
	let middle = create_category(
		&store,
		Category::new(blog.id, "Middle").with_alias("middle").with_parent(root.id),
	)
	.await;
	let leaf = create_category(
		&store,
		Category::new(blog.id, "Leaf").with_alias("leaf").with_parent(middle.id),
	)
	.await;
	let item = create_item(&store, article(blog.id, "Filed")).await;
	file_under(&store, &item, &[middle.id, leaf.id]).await;

	// Act
	store.categories.delete(&middle).await.unwrap();

	// Assert
	assert!(store.categories.get(middle.id).await.unwrap().is_none());
	assert_eq!(store.categories.get(leaf.id).await.unwrap().unwrap().parent, root.id);
	assert_eq!(store.categories.item_category_ids(item.id).await.unwrap(), vec![leaf.id]);
}

#[rstest]
#[tokio::test]
async fn test_delete_missing_category_fails(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let mut ghost = Category::new(1, "Ghost").with_alias("ghost");
	ghost.id = 42;

	// Act
	let result = store.categories.delete(&ghost).await;

	// Assert
	assert!(matches!(result, Err(CategoryError::NotFound(42))));
}

#[rstest]
#[tokio::test]
async fn test_update_order_compacts_siblings(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let mut created = Vec::new();
	for (name, ordering) in [("A", 3), ("B", 7), ("C", 10)] {
		let category = Category::new(blog.id, name)
			.with_alias(name.to_lowercase())
			.with_ordering(ordering);
		created.push(create_category(&store, category).await.id);
	}

	// Act
	store.categories.update_order(blog.id, &[0, 0]).await.unwrap();

	// Assert
	let mut orderings = Vec::new();
	for id in created {
		orderings.push(store.categories.get(id).await.unwrap().unwrap().ordering);
	}
	assert_eq!(orderings, vec![1, 2, 3]);
}

#[rstest]
#[tokio::test]
async fn test_all_with_item_counts_respects_scope(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let news = create_category(&store, Category::new(blog.id, "News").with_alias("news")).await;
	let empty = create_category(
		&store,
		Category::new(blog.id, "Empty").with_alias("empty").with_ordering(1),
	)
	.await;
	let live = create_item(&store, article(blog.id, "Live")).await;
	let draft = create_item(&store, article(blog.id, "Draft").with_state(ItemState::Unpublished)).await;
	file_under(&store, &live, &[news.id]).await;
	file_under(&store, &draft, &[news.id]).await;

	// Act
	let everything = store.categories.all(blog.id, false, true, &Scope::all()).await.unwrap();
	let published = store
		.categories
		.all(blog.id, false, true, &Scope::published())
		.await
		.unwrap();

	// Assert
	let counts = |categories: &[Category]| -> Vec<(i64, Vec<i64>)> {
		categories.iter().map(|c| (c.id, c.item_ids.clone())).collect()
	};
	let mut both = vec![live.id, draft.id];
	both.sort_unstable();
	assert_eq!(counts(&everything), vec![(news.id, both), (empty.id, vec![])]);
	assert_eq!(counts(&published), vec![(news.id, vec![live.id]), (empty.id, vec![])]);
}

#[rstest]
#[tokio::test]
async fn test_by_name_and_by_item(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let news = create_category(&store, Category::new(blog.id, "News").with_alias("news")).await;
	let hidden = create_category(
		&store,
		Category::new(blog.id, "Hidden").with_alias("hidden").with_published(false),
	)
	.await;
	let item = create_item(&store, article(blog.id, "Filed")).await;
	file_under(&store, &item, &[news.id, hidden.id]).await;

	// Act
	let found = store.categories.by_name(blog.id, "News").await.unwrap();
	let no_application = store.categories.by_name(0, "News").await.unwrap();
	let published = store.categories.by_item(item.id, true).await.unwrap();
	let every = store.categories.by_item(item.id, false).await.unwrap();

	// Assert
	assert_eq!(found.map(|c| c.id), Some(news.id));
	assert!(no_application.is_none());
	assert_eq!(published.iter().map(|c| c.id).collect::<Vec<_>>(), vec![news.id]);
	assert_eq!(every.len(), 2);
}
