//! Listing a user's own submissions

use crate::fixtures::{
	article_submission, clock, create_application, member, service, store, submit,
};
use rstest::rstest;
use std::sync::Arc;
use zoo_core::User;
use zoo_db::{ContentStore, UserOrder};
use zoo_submission::{
	MockTimeProvider, MySubmissionsQuery, SubmissionError, SubmissionForm,
};

#[rstest]
#[tokio::test]
async fn test_lists_only_own_items_paged(#[future] store: ContentStore, clock: Arc<MockTimeProvider>) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	for name in ["Alpha", "Bravo", "Charlie"] {
		submit(&service, &submission, &member(), name).await;
	}
	submit(&service, &submission, &User::new(8, "bob"), "Delta").await;
	let query = MySubmissionsQuery {
		order: UserOrder::Alpha,
		page: 2,
		..Default::default()
	};

	// Act
	let listing = service
		.my_submissions(&submission, &member(), &query)
		.await
		.unwrap();

	// Assert
	assert_eq!(listing.total, 3);
	assert_eq!(listing.per_page, 2);
	assert_eq!(listing.pages(), 2);
	let names: Vec<&str> = listing.items.iter().map(|item| item.name.as_str()).collect();
	assert_eq!(names, vec!["Charlie"]);
	assert_eq!(listing.types, vec!["article".to_string()]);
	assert!(listing.show_add);
}

#[rstest]
#[tokio::test]
async fn test_page_far_past_the_end_is_empty(#[future] store: ContentStore, clock: Arc<MockTimeProvider>) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	submit(&service, &submission, &member(), "Alpha").await;
	let query = MySubmissionsQuery {
		page: u64::MAX,
		..Default::default()
	};

	// Act
	let listing = service
		.my_submissions(&submission, &member(), &query)
		.await
		.unwrap();

	// Assert
	assert_eq!(listing.total, 1);
	assert_eq!(listing.page, u64::MAX);
	assert!(listing.items.is_empty());
}

#[rstest]
#[case::by_name("brav", None, vec!["Bravo"])]
#[case::by_type("", Some("page"), vec![])]
#[case::everything("", None, vec!["Alpha", "Bravo"])]
#[tokio::test]
async fn test_filters_submissions(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
	#[case] search: &str,
	#[case] type_filter: Option<&str>,
	#[case] expected: Vec<&str>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission =
		article_submission(blog.id).with_form("page", SubmissionForm::new("default"));
	for name in ["Alpha", "Bravo"] {
		submit(&service, &submission, &member(), name).await;
	}
	let query = MySubmissionsQuery {
		search: search.to_string(),
		type_filter: type_filter.map(str::to_string),
		order: UserOrder::Alpha,
		page: 1,
	};

	// Act
	let listing = service
		.my_submissions(&submission, &member(), &query)
		.await
		.unwrap();

	// Assert
	let names: Vec<&str> = listing.items.iter().map(|item| item.name.as_str()).collect();
	assert_eq!(names, expected);
	assert_eq!(listing.total, expected.len() as i64);
	assert_eq!(listing.types, vec!["article".to_string(), "page".to_string()]);
}

#[rstest]
#[tokio::test]
async fn test_add_hidden_when_limit_reached(#[future] store: ContentStore, clock: Arc<MockTimeProvider>) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id).with_max_submissions(1);
	submit(&service, &submission, &member(), "Only").await;

	// Act
	let listing = service
		.my_submissions(&submission, &member(), &MySubmissionsQuery::default())
		.await
		.unwrap();

	// Assert
	assert_eq!(listing.total, 1);
	assert_eq!(listing.page, 1);
	assert!(!listing.show_add);
}

#[rstest]
#[tokio::test]
async fn test_guest_has_no_submissions(#[future] store: ContentStore, clock: Arc<MockTimeProvider>) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);

	// Act
	let result = service
		.my_submissions(&submission, &User::guest(), &MySubmissionsQuery::default())
		.await;

	// Assert
	assert!(matches!(result, Err(SubmissionError::AccessDenied)));
}
