//! Comment moderation, author sync and reply threading

use crate::fixtures::{article, create_application, create_item, now, store};
use chrono::Duration;
use parking_lot::Mutex;
use rstest::rstest;
use std::sync::Arc;
use zoo_core::{Comment, CommentAuthor, CommentState, ItemState};
use zoo_db::{CommentError, ContentStore};

#[rstest]
#[tokio::test]
async fn test_comment_on_missing_item_is_rejected(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let mut comment = Comment::new(77, &CommentAuthor::guest("Ann", "ann@example.com"), "Hello");

	// Act
	let result = store.comments.save(&mut comment).await;

	// Assert
	assert!(matches!(result, Err(CommentError::InvalidItem)));
	assert_eq!(comment.id, 0);
}

#[rstest]
#[tokio::test]
async fn test_registered_author_details_are_synced(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let item = create_item(&store, article(blog.id, "Post")).await;
	let mut first = Comment::new(item.id, &CommentAuthor::user(5, "Ann", "ann@old.example"), "One");
	store.comments.save(&mut first).await.unwrap();

	// Act
	let renamed = CommentAuthor::user(5, "Annie", "ann@new.example");
	let mut second = Comment::new(item.id, &renamed, "Two");
	store.comments.save(&mut second).await.unwrap();

	// Assert
	let first = store.comments.get(first.id).await.unwrap().unwrap();
	assert_eq!(first.author, "Annie");
	assert_eq!(first.email, "ann@new.example");
}

#[rstest]
#[tokio::test]
async fn test_missing_comment_leaves_author_details_alone(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let item = create_item(&store, article(blog.id, "Post")).await;
	let mut first = Comment::new(item.id, &CommentAuthor::user(5, "Ann", "ann@example.com"), "One");
	store.comments.save(&mut first).await.unwrap();
	let mut ghost = Comment::new(item.id, &CommentAuthor::user(5, "Mallory", "mallory@example.com"), "Two");
	ghost.id = 999;

	// Act
	let result = store.comments.save(&mut ghost).await;

	// Assert
	assert!(matches!(result, Err(CommentError::NotFound(999))));
	let first = store.comments.get(first.id).await.unwrap().unwrap();
	assert_eq!(first.author, "Ann");
	assert_eq!(first.email, "ann@example.com");
}

#[rstest]
#[tokio::test]
async fn test_saved_event_reports_previous_state(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let item = create_item(&store, article(blog.id, "Post")).await;
	let approvals = Arc::new(Mutex::new(Vec::new()));
	let sink = approvals.clone();
	store.comments.saved().connect(move |event| {
		let sink = sink.clone();
		async move {
			sink.lock().push((event.is_new, event.old_state, event.entered(CommentState::Approved)));
			Ok(())
		}
	});
	let mut comment = Comment::new(item.id, &CommentAuthor::guest("Bob", "bob@example.com"), "Hi");

	// Act
	store.comments.save(&mut comment).await.unwrap();
	comment.state = CommentState::Approved;
	store.comments.save(&mut comment).await.unwrap();
	store.comments.save(&mut comment).await.unwrap();

	// Assert
	assert_eq!(
		*approvals.lock(),
		vec![
			(true, None, false),
			(false, Some(CommentState::Unapproved), true),
			(false, Some(CommentState::Approved), false),
		]
	);
}

#[rstest]
#[tokio::test]
async fn test_delete_moves_replies_to_parent(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let item = create_item(&store, article(blog.id, "Post")).await;
	let author = CommentAuthor::guest("Cy", "cy@example.com");
	let mut root = Comment::new(item.id, &author, "Root");
	store.comments.save(&mut root).await.unwrap();
	let mut middle = Comment::new(item.id, &author, "Middle").with_parent(root.id);
	store.comments.save(&mut middle).await.unwrap();
	let mut reply = Comment::new(item.id, &author, "Reply").with_parent(middle.id);
	store.comments.save(&mut reply).await.unwrap();

	// Act
	store.comments.delete(&middle).await.unwrap();
	let again = store.comments.delete(&middle).await;

	// Assert
	assert_eq!(store.comments.get(reply.id).await.unwrap().unwrap().parent_id, root.id);
	assert!(matches!(again, Err(CommentError::NotFound(_))));
}

#[rstest]
#[tokio::test]
async fn test_for_item_shows_own_pending_comments(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let item = create_item(&store, article(blog.id, "Post")).await;
	let ann = CommentAuthor::user(5, "Ann", "ann@example.com");
	let bob = CommentAuthor::user(6, "Bob", "bob@example.com");
	let start = now() - Duration::minutes(10);
	let mut approved = Comment::new(item.id, &bob, "Approved")
		.with_state(CommentState::Approved)
		.with_created(start);
	store.comments.save(&mut approved).await.unwrap();
	let mut pending = Comment::new(item.id, &ann, "Pending").with_created(start + Duration::minutes(1));
	store.comments.save(&mut pending).await.unwrap();
	let mut other = Comment::new(item.id, &bob, "Other pending").with_created(start + Duration::minutes(2));
	store.comments.save(&mut other).await.unwrap();

	// Act
	let for_ann = store
		.comments
		.for_item(item.id, true, Some(&ann), CommentState::Approved)
		.await
		.unwrap();
	let for_guest = store
		.comments
		.for_item(item.id, false, None, CommentState::Approved)
		.await
		.unwrap();

	// Assert
	let ids = |comments: &[Comment]| comments.iter().map(|c| c.id).collect::<Vec<_>>();
	assert_eq!(ids(&for_ann), vec![approved.id, pending.id]);
	assert_eq!(ids(&for_guest), vec![approved.id]);
}

#[rstest]
#[tokio::test]
async fn test_last_comment_and_approved_count(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let item = create_item(&store, article(blog.id, "Post")).await;
	let guest = CommentAuthor::guest("Dee", "dee@example.com");
	let start = now() - Duration::minutes(10);
	for (offset, state) in [(0, CommentState::Approved), (1, CommentState::Approved), (2, CommentState::Spam)] {
		let mut comment = Comment::new(item.id, &guest, format!("Comment {offset}"))
			.with_ip("10.0.0.1")
			.with_state(state)
			.with_created(start + Duration::minutes(offset));
		store.comments.save(&mut comment).await.unwrap();
	}

	// Act
	let last = store.comments.last_comment("10.0.0.1", Some(&guest)).await.unwrap();
	let elsewhere = store.comments.last_comment("10.0.0.2", None).await.unwrap();
	let approved = store.comments.approved_count(&guest).await.unwrap();

	// Assert
	assert_eq!(last.map(|c| c.content), Some("Comment 2".to_string()));
	assert!(elsewhere.is_none());
	assert_eq!(approved, 2);
}

#[rstest]
#[tokio::test]
async fn test_latest_skips_unpublished_items(#[future] store: ContentStore) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store, "Blog").await;
	let live = create_item(&store, article(blog.id, "Live")).await;
	let draft = create_item(&store, article(blog.id, "Draft").with_state(ItemState::Unpublished)).await;
	let author = CommentAuthor::guest("Eve", "eve@example.com");
	let mut on_live = Comment::new(live.id, &author, "Live comment").with_state(CommentState::Approved);
	store.comments.save(&mut on_live).await.unwrap();
	let mut on_draft = Comment::new(draft.id, &author, "Draft comment").with_state(CommentState::Approved);
	store.comments.save(&mut on_draft).await.unwrap();

	// Act
	let latest = store.comments.latest(blog.id, &[], 10).await.unwrap();

	// Assert
	assert_eq!(latest.iter().map(|c| c.id).collect::<Vec<_>>(), vec![on_live.id]);
}
