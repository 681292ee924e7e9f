//! Showing and saving submission forms

use crate::fixtures::{
	SUBMISSION_ID, article_request, article_submission, clock, create_application, member, service,
	store, submit,
};
use chrono::Duration;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use zoo_core::{Category, ItemState, SignalError, User};
use zoo_db::ContentStore;
use zoo_submission::service::{MSG_ITEM_SAVED, MSG_SAVE_FAILED, MSG_SUBMITTED, MSG_SUBMITTED_FOR_REVIEW};
use zoo_submission::{
	ElementConfig, MockTimeProvider, Redirect, Session, Submission, SubmissionForm,
	SubmissionRequest,
};

#[rstest]
#[tokio::test]
async fn test_untrusted_submission_is_saved_unpublished(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	let request = article_request("My First Bike").with_value("body", json!("<b>Fast</b> and red"));
	let mut session = Session::new();

	// Act
	let outcome = service.save(&submission, &request, &member(), &mut session).await;

	// Assert
	assert!(outcome.saved, "refused: {:?}", outcome.warnings);
	assert_eq!(outcome.message.as_deref(), Some(MSG_SUBMITTED_FOR_REVIEW));
	let item = outcome.item.unwrap();
	let stored = store.items.get(item.id).await.unwrap().unwrap();
	assert_eq!(stored.name, "My First Bike");
	assert_eq!(stored.alias, "my-first-bike");
	assert_eq!(stored.state, ItemState::Unpublished);
	assert_eq!(stored.created_by, 7);
	assert_eq!(stored.modified_by, 7);
	assert_eq!(stored.element("body").unwrap().value(), &json!("Fast and red"));
	// A new submission leads back to a fresh form
	assert_eq!(
		outcome.redirect,
		Redirect::Form {
			submission_id: SUBMISSION_ID,
			type_id: "article".to_string(),
			item_id: 0,
			redirect: None,
		}
	);
}

#[rstest]
#[tokio::test]
async fn test_trusted_submission_keeps_state_and_markup(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let mut submission = article_submission(blog.id).with_trusted_mode(true);
	if let Some(form) = submission.forms.get_mut("article") {
		form.elements.push(ElementConfig::new("_itemstate"));
	}
	let request = article_request("Trusted")
		.with_value("body", json!("<b>bold</b>"))
		.with_value("_itemstate", json!("1"));
	let mut session = Session::new();

	// Act
	let outcome = service.save(&submission, &request, &member(), &mut session).await;

	// Assert
	assert!(outcome.saved);
	assert_eq!(outcome.message.as_deref(), Some(MSG_SUBMITTED));
	let stored = store.items.get(outcome.item.unwrap().id).await.unwrap().unwrap();
	assert_eq!(stored.state, ItemState::Published);
	assert_eq!(stored.element("body").unwrap().value(), &json!("<b>bold</b>"));
}

#[rstest]
#[tokio::test]
async fn test_invalid_post_is_stashed_and_shown_again(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	let request = SubmissionRequest::new("article").with_value("body", json!("Kept text"));
	let mut session = Session::new();

	// Act
	let outcome = service.save(&submission, &request, &member(), &mut session).await;
	let view = service
		.form(&submission, &SubmissionRequest::new("article"), &member(), &mut session)
		.await
		.unwrap();

	// Assert
	assert!(!outcome.saved);
	assert_eq!(
		outcome.errors.get("_itemname").map(String::as_str),
		Some("This field is required")
	);
	assert_eq!(store.items.application_item_count(blog.id).await.unwrap(), 0);
	assert_eq!(view.errors.get("_itemname").map(String::as_str), Some("This field is required"));
	assert_eq!(view.item.element("body").unwrap().value(), &json!("Kept text"));
	assert!(!session.contains(&service.form_key(&submission)));
}

#[rstest]
#[tokio::test]
async fn test_new_submissions_are_throttled_per_session(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	let mut session = Session::new();
	let first = service
		.save(&submission, &article_request("One"), &member(), &mut session)
		.await;

	// Act
	clock.advance(Duration::seconds(120));
	let too_fast = service
		.save(&submission, &article_request("Two"), &member(), &mut session)
		.await;
	clock.advance(Duration::seconds(180));
	let later = service
		.save(&submission, &article_request("Two"), &member(), &mut session)
		.await;

	// Assert
	assert!(first.saved);
	assert!(!too_fast.saved);
	assert_eq!(
		too_fast.warnings,
		vec!["You are submitting too fast, please try again in a few moments.".to_string()]
	);
	assert!(later.saved);
	assert_eq!(store.items.application_item_count(blog.id).await.unwrap(), 2);
}

#[rstest]
#[case::disabled("disabled", "Submissions are disabled.")]
#[case::no_rights("access", "Insufficient User Rights.")]
#[case::tampered_hash("hash", "Hashes did not match.")]
#[case::unknown_type("type", "Submissions are not configured correctly.")]
#[case::no_layout("layout", "Submission is not configured correctly.")]
#[tokio::test]
async fn test_refused_submission_reports_reason(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
	#[case] refusal: &str,
	#[case] warning: &str,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let mut submission = article_submission(blog.id);
	let mut request = article_request("Refused");
	match refusal {
		"disabled" => submission.enabled = false,
		"access" => submission.access = 3,
		"hash" => request = request.with_item(5).with_hash("00ff"),
		"type" => request.type_id = "page".to_string(),
		_ => {
			if let Some(form) = submission.forms.get_mut("article") {
				form.layout = String::new();
			}
		}
	}
	let mut session = Session::new();

	// Act
	let outcome = service.save(&submission, &request, &member(), &mut session).await;

	// Assert
	assert!(!outcome.saved);
	assert_eq!(outcome.warnings, vec![warning.to_string()]);
	assert!(matches!(outcome.redirect, Redirect::Form { .. }));
	assert_eq!(store.items.application_item_count(blog.id).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_max_submissions_limits_new_items(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id).with_max_submissions(1);
	submit(&service, &submission, &member(), "Only One").await;
	let mut session = Session::new();

	// Act
	let outcome = service
		.save(&submission, &article_request("One Too Many"), &member(), &mut session)
		.await;

	// Assert
	assert!(!outcome.saved);
	assert_eq!(
		outcome.warnings,
		vec!["You have reached your maximum number of submissions".to_string()]
	);
	assert!(!service.check_max_submissions(&submission, &member()).await.unwrap());
	assert!(
		service
			.check_max_submissions(&submission, &User::new(8, "bob"))
			.await
			.unwrap()
	);
}

#[rstest]
#[case::member(false, 1)]
#[case::superadmin(true, 2)]
#[tokio::test]
async fn test_before_save_receiver_vetoes_submission(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
	#[case] superadmin: bool,
	#[case] warning_count: usize,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	service
		.before_save()
		.connect(|_event| async move { Err(SignalError::failed("spam")) });
	let user = member().with_superadmin(superadmin);
	let mut session = Session::new();

	// Act
	let outcome = service
		.save(&submission, &article_request("Vetoed"), &user, &mut session)
		.await;

	// Assert
	assert!(!outcome.saved);
	assert_eq!(outcome.warnings.len(), warning_count);
	assert_eq!(outcome.warnings[0], MSG_SAVE_FAILED);
	if superadmin {
		assert!(outcome.warnings[1].contains("spam"));
	}
	assert_eq!(store.items.application_item_count(blog.id).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_saved_receiver_rewrites_message(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	service.saved().connect(|event| async move {
		if event.is_new {
			event.set_message(format!("Thanks for {}", event.item.name));
		}
		Ok(())
	});
	let mut session = Session::new();

	// Act
	let outcome = service
		.save(&submission, &article_request("Roses"), &member(), &mut session)
		.await;

	// Assert
	assert!(outcome.saved);
	assert_eq!(outcome.message.as_deref(), Some("Thanks for Roses"));
}

#[rstest]
#[tokio::test]
async fn test_failing_saved_receiver_keeps_stored_submission(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	service
		.saved()
		.connect(|_| async { Err(SignalError::failed("mailer down")) });
	let mut session = Session::new();

	// Act
	let outcome = service
		.save(&submission, &article_request("Tulips"), &member(), &mut session)
		.await;

	// Assert
	assert!(outcome.saved, "refused: {:?}", outcome.warnings);
	assert!(outcome.warnings.is_empty());
	assert_eq!(outcome.message.as_deref(), Some(MSG_SUBMITTED_FOR_REVIEW));
	let item = outcome.item.unwrap();
	assert!(store.items.get(item.id).await.unwrap().is_some());
}

#[rstest]
#[tokio::test]
async fn test_owner_edits_item_through_item_edit_redirect(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	let item_id = submit(&service, &submission, &member(), "Draft Title").await;
	let hash = service.hash(&submission, "article", item_id, true).unwrap();
	let request = article_request("Final Title")
		.with_item(item_id)
		.with_hash(hash)
		.with_redirect("itemedit");
	let mut session = Session::new();

	// Act
	let view = service
		.form(&submission, &request, &member(), &mut session)
		.await
		.unwrap();
	let outcome = service.save(&submission, &request, &member(), &mut session).await;

	// Assert
	assert_eq!(view.item.id, item_id);
	assert_eq!(view.item.name, "Draft Title");
	assert!(outcome.saved, "refused: {:?}", outcome.warnings);
	assert_eq!(outcome.message.as_deref(), Some(MSG_ITEM_SAVED));
	let stored = store.items.get(item_id).await.unwrap().unwrap();
	assert_eq!(stored.name, "Final Title");
	assert_eq!(stored.alias, "final-title");
	// Unpublished items go back to their form instead of their page
	assert_eq!(
		outcome.redirect,
		Redirect::Form {
			submission_id: SUBMISSION_ID,
			type_id: "article".to_string(),
			item_id,
			redirect: None,
		}
	);
}

#[rstest]
#[tokio::test]
async fn test_other_user_cannot_edit_item(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = article_submission(blog.id);
	let item_id = submit(&service, &submission, &member(), "Mine").await;
	let hash = service.hash(&submission, "article", item_id, true).unwrap();
	let request = article_request("Hijacked")
		.with_item(item_id)
		.with_hash(hash)
		.with_redirect("itemedit");
	let mut session = Session::new();

	// Act
	let outcome = service
		.save(&submission, &request, &User::new(8, "bob"), &mut session)
		.await;

	// Assert
	assert!(!outcome.saved);
	assert_eq!(outcome.warnings, vec!["Insufficient User Rights.".to_string()]);
	assert_eq!(store.items.get(item_id).await.unwrap().unwrap().name, "Mine");
}

#[rstest]
#[tokio::test]
async fn test_form_category_files_new_items(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let mut news = Category::new(blog.id, "News").with_alias("news");
	store.categories.save(&mut news).await.unwrap();
	let service = service(&store, &clock);
	let mut submission = article_submission(blog.id);
	if let Some(form) = submission.forms.get_mut("article") {
		form.category = Some(news.id);
	}
	let mut session = Session::new();

	// Act
	let outcome = service
		.save(&submission, &article_request("Filed"), &member(), &mut session)
		.await;

	// Assert
	let item = outcome.item.unwrap();
	assert_eq!(item.primary_category(), news.id);
	assert_eq!(store.categories.item_category_ids(item.id).await.unwrap(), vec![news.id]);
}

#[rstest]
#[tokio::test]
async fn test_form_without_hash_starts_a_new_item(
	#[future] store: ContentStore,
	clock: Arc<MockTimeProvider>,
) {
	// Arrange
	let store = store.await;
	let blog = create_application(&store).await;
	let service = service(&store, &clock);
	let submission = Submission::new(SUBMISSION_ID, blog.id, "Pages")
		.with_form("page", SubmissionForm::new("default"));
	let mut session = Session::new();

	// Act
	let view = service
		.form(&submission, &SubmissionRequest::new("page"), &member(), &mut session)
		.await
		.unwrap();

	// Assert
	assert!(view.item.is_new());
	assert_eq!(view.item.created, crate::fixtures::start());
	assert_eq!(view.item.created_by, 7);
	assert_eq!(view.hash, service.hash(&submission, "page", 0, false).unwrap());
	assert!(view.cancel.is_none());
	assert!(view.item.comments_enabled());
}
