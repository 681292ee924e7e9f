//! The submission workflow: showing, saving and removing submitted items.

use chrono::Duration;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use zoo_conf::SubmissionSettings;
use zoo_core::{DeleteEvent, ElementData, Item, ItemState, Signal, User};
use zoo_db::{ContentStore, Page, UserItemFilter, UserOrder};

use crate::error::{SubmissionError, SubmissionResult};
use crate::events::{SubmissionEvent, SubmissionSavedEvent};
use crate::hash::SubmissionHasher;
use crate::redirect::{Redirect, RedirectTarget, resolve};
use crate::session::Session;
use crate::submission::{
	CATEGORY_ELEMENT, ElementConfig, NAME_ELEMENT, STATE_ELEMENT, Submission, SubmissionForm,
	TAG_ELEMENT, can_edit,
};
use crate::throttle::SubmissionThrottle;
use crate::time_provider::{SystemTimeProvider, TimeProvider};
use crate::validation::{DefaultValidator, ElementValidator, filter_data};

pub const SUBMITTED_ITEM_NAME: &str = "Submitted Item";
pub const MSG_ITEM_SAVED: &str = "Item saved";
pub const MSG_SUBMITTED: &str = "Thanks for your submission.";
pub const MSG_SUBMITTED_FOR_REVIEW: &str =
	"Thanks for your submission. It will be reviewed before being posted on the site.";
pub const MSG_SAVE_FAILED: &str = "There was an error saving your submission, please try again later.";
pub const MSG_DELETED: &str = "Submission Deleted";
pub const MSG_DELETE_FAILED: &str =
	"There was an error deleting your submission, please try again later.";

/// Posted form values keyed by element id
pub type FormData = IndexMap<String, Value>;

/// One submission form request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionRequest {
	pub type_id: String,
	/// Form hash; `None` when the form is opened from a configured entry
	/// point, which never carries an item
	pub hash: Option<String>,
	pub item_id: i64,
	/// Raw `redirect` parameter
	pub redirect: Option<String>,
	pub post: FormData,
}

impl SubmissionRequest {
	pub fn new(type_id: impl Into<String>) -> Self {
		Self {
			type_id: type_id.into(),
			..Default::default()
		}
	}

	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());
		self
	}

	pub fn with_item(mut self, item_id: i64) -> Self {
		self.item_id = item_id;
		self
	}

	pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
		self.redirect = Some(redirect.into());
		self
	}

	pub fn with_value(mut self, element_id: impl Into<String>, value: Value) -> Self {
		self.post.insert(element_id.into(), value);
		self
	}
}

/// What a form displays
#[derive(Debug, Clone)]
pub struct FormView {
	pub item: Item,
	pub hash: String,
	pub elements: Vec<ElementConfig>,
	/// Validation messages of a previously refused post, by element id
	pub errors: IndexMap<String, String>,
	pub cancel: Option<Redirect>,
}

/// Result of [`SubmissionService::save`]
#[derive(Debug, Clone)]
pub struct SaveOutcome {
	pub saved: bool,
	pub item: Option<Item>,
	pub message: Option<String>,
	pub warnings: Vec<String>,
	pub errors: IndexMap<String, String>,
	pub redirect: Redirect,
}

/// Result of [`SubmissionService::remove`]
#[derive(Debug, Clone)]
pub struct RemoveOutcome {
	pub removed: bool,
	pub message: Option<String>,
	pub warnings: Vec<String>,
	pub redirect: Redirect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MySubmissionsQuery {
	/// One item type; `None` lists every submittable type
	pub type_filter: Option<String>,
	/// Matched against item and tag names
	pub search: String,
	pub order: UserOrder,
	/// One-based
	pub page: u64,
}

/// A page of the user's own submissions
#[derive(Debug, Clone)]
pub struct MySubmissions {
	pub items: Vec<Item>,
	pub total: i64,
	pub page: u64,
	pub per_page: u64,
	pub types: Vec<String>,
	/// Whether the user may submit another item
	pub show_add: bool,
}

impl MySubmissions {
	pub fn pages(&self) -> u64 {
		(self.total.max(0) as u64).div_ceil(self.per_page.max(1))
	}
}

struct Context<'a> {
	form: &'a SubmissionForm,
	item: Item,
	target: RedirectTarget,
	hash: String,
}

#[derive(Default)]
struct Binding {
	errors: IndexMap<String, String>,
	categories: Option<Vec<i64>>,
}

enum Saved {
	Valid { item: Item, message: String, redirect: Redirect },
	Invalid { item: Item, errors: IndexMap<String, String> },
}

/// Front-end submission workflow over a [`ContentStore`]
#[derive(Clone)]
pub struct SubmissionService {
	store: ContentStore,
	settings: SubmissionSettings,
	hasher: SubmissionHasher,
	throttle: SubmissionThrottle,
	validator: Arc<dyn ElementValidator>,
	clock: Arc<dyn TimeProvider>,
	before_save: Signal<SubmissionEvent>,
	saved: Signal<SubmissionSavedEvent>,
	deleted: Signal<DeleteEvent<Item>>,
}

impl SubmissionService {
	pub fn new(store: ContentStore, settings: SubmissionSettings) -> Self {
		let clock: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider::new());
		Self {
			hasher: SubmissionHasher::new(&settings.secret),
			throttle: Self::throttle_for(&settings, clock.clone()),
			validator: Arc::new(DefaultValidator),
			clock,
			before_save: Signal::new("submission.before_save"),
			saved: Signal::new("submission.saved"),
			deleted: Signal::new("submission.deleted"),
			store,
			settings,
		}
	}

	fn throttle_for(settings: &SubmissionSettings, clock: Arc<dyn TimeProvider>) -> SubmissionThrottle {
		let interval = i64::try_from(settings.time_between_public_submissions).unwrap_or(i64::MAX);
		SubmissionThrottle::new(
			Duration::seconds(interval),
			format!("{}LAST_SUBMISSION_TIMESTAMP", settings.session_prefix),
			clock,
		)
	}

	pub fn with_time_provider(mut self, clock: Arc<dyn TimeProvider>) -> Self {
		self.throttle = Self::throttle_for(&self.settings, clock.clone());
		self.clock = clock;
		self
	}

	pub fn with_validator(mut self, validator: Arc<dyn ElementValidator>) -> Self {
		self.validator = validator;
		self
	}

	pub fn before_save(&self) -> &Signal<SubmissionEvent> {
		&self.before_save
	}

	pub fn saved(&self) -> &Signal<SubmissionSavedEvent> {
		&self.saved
	}

	pub fn deleted(&self) -> &Signal<DeleteEvent<Item>> {
		&self.deleted
	}

	pub fn store(&self) -> &ContentStore {
		&self.store
	}

	/// Hash a form for these parameters must carry.
	pub fn hash(&self, submission: &Submission, type_id: &str, item_id: i64, edit: bool) -> SubmissionResult<String> {
		self.hasher.hash(submission.id, type_id, item_id, edit)
	}

	/// Session key of the post stashed for a refused submission.
	pub fn form_key(&self, submission: &Submission) -> String {
		format!("{}SUBMISSION_FORM_{}", self.settings.session_prefix, submission.id)
	}

	/// Checks that the submission is usable by `user`; with `edit_item` the
	/// user must be allowed to edit that item instead.
	pub async fn check_config(
		&self,
		submission: &Submission,
		user: &User,
		edit_item: Option<&Item>,
	) -> SubmissionResult<()> {
		if !self.store.applications.exists(submission.application_id).await? {
			return Err(SubmissionError::NotConfigured);
		}
		if !submission.enabled {
			return Err(SubmissionError::Disabled);
		}
		let allowed = match edit_item {
			Some(item) => can_edit(user, item),
			None => submission.can_access(user),
		};
		if !allowed {
			return Err(SubmissionError::AccessDenied);
		}
		Ok(())
	}

	/// Whether the user may still create items under the submission limit.
	pub async fn check_max_submissions(&self, submission: &Submission, user: &User) -> SubmissionResult<bool> {
		if submission.max_submissions <= 0 {
			return Ok(true);
		}
		let current = self
			.store
			.items
			.item_count_by_user(submission.application_id, user, &UserItemFilter::default())
			.await?;
		Ok(current < submission.max_submissions)
	}

	async fn init<'a>(
		&self,
		submission: &'a Submission,
		request: &SubmissionRequest,
		user: &User,
	) -> SubmissionResult<Context<'a>> {
		let target = RedirectTarget::parse(request.redirect.as_deref());
		let edit_mode = target.is_item_edit();

		let edit_item = if edit_mode {
			Some(
				self.store
					.items
					.get(request.item_id)
					.await?
					.ok_or(SubmissionError::AccessDenied)?,
			)
		} else {
			None
		};
		self.check_config(submission, user, edit_item.as_ref()).await?;

		let item_id = match &request.hash {
			Some(hash) => {
				self.hasher
					.verify(hash, submission.id, &request.type_id, request.item_id, edit_mode)?;
				request.item_id
			}
			None if edit_mode => return Err(SubmissionError::HashMismatch),
			None => 0,
		};

		let form = submission
			.form(&request.type_id)
			.ok_or(SubmissionError::NotConfigured)?;
		if form.layout.trim().is_empty() {
			return Err(SubmissionError::LayoutMissing);
		}
		let hash = self.hasher.hash(submission.id, &request.type_id, item_id, edit_mode)?;

		let existing = match edit_item {
			Some(item) => Some(item),
			None if item_id > 0 => self.store.items.get(item_id).await?,
			None => None,
		};
		let item = existing.unwrap_or_else(|| self.new_item(submission, &request.type_id, user));

		Ok(Context {
			form,
			item,
			target,
			hash,
		})
	}

	fn new_item(&self, submission: &Submission, type_id: &str, user: &User) -> Item {
		let now = self.clock.now();
		let mut item = Item::new(submission.application_id, type_id, "")
			.with_created(now)
			.with_created_by(user.id)
			.with_publish_window(Some(now), None)
			.with_state(ItemState::Unpublished)
			.with_access(1);
		item.searchable = true;
		item.params.set("config.enable_comments", true);
		item.set_primary_category(0);
		item
	}

	fn bind(&self, item: &mut Item, form: &SubmissionForm, post: &FormData, trusted: bool) -> Binding {
		let mut binding = Binding::default();
		for config in &form.elements {
			let posted = post.get(&config.element);
			match self.validator.validate(config, posted, trusted) {
				Ok(value) => bind_value(item, &config.element, value, &mut binding),
				Err(error) => {
					binding.errors.insert(config.element.clone(), error.to_string());
					// Keep what was posted so the form can show it again
					if let Some(raw) = posted {
						bind_value(item, &config.element, raw.clone(), &mut binding);
					}
				}
			}
		}
		binding
	}

	fn stash(&self, submission: &Submission, session: &mut Session, post: &FormData) -> SubmissionResult<()> {
		session.set(self.form_key(submission), serde_json::to_value(post)?);
		Ok(())
	}

	fn take_stash(&self, submission: &Submission, session: &mut Session) -> SubmissionResult<Option<FormData>> {
		Ok(session
			.remove(&self.form_key(submission))
			.map(serde_json::from_value)
			.transpose()?)
	}

	/// Prepares the submission form, re-binding a post stashed by a refused
	/// save.
	pub async fn form(
		&self,
		submission: &Submission,
		request: &SubmissionRequest,
		user: &User,
		session: &mut Session,
	) -> SubmissionResult<FormView> {
		let Context {
			form,
			mut item,
			target,
			hash,
		} = self.init(submission, request, user).await?;

		if item.is_new() && !self.check_max_submissions(submission, user).await? {
			return Err(SubmissionError::MaxSubmissions);
		}

		let mut errors = IndexMap::new();
		if let Some(post) = self.take_stash(submission, session)? {
			errors = self.bind(&mut item, form, &post, submission.trusted_mode).errors;
		}

		let cancel = (target != RedirectTarget::Form)
			.then(|| resolve(&target, submission.id, &request.type_id, request.item_id, &item, self.clock.now()));

		Ok(FormView {
			item,
			hash,
			elements: form.elements.clone(),
			errors,
			cancel,
		})
	}

	/// Validates and stores a submitted item.
	///
	/// Never fails: refusals and storage errors become warnings and send the
	/// submitter back to the form.
	pub async fn save(
		&self,
		submission: &Submission,
		request: &SubmissionRequest,
		user: &User,
		session: &mut Session,
	) -> SaveOutcome {
		let target = RedirectTarget::parse(request.redirect.as_deref());
		let back_to_form = Redirect::form(submission.id, &request.type_id, request.item_id, &target);

		match self.try_save(submission, request, user, session).await {
			Ok(Saved::Valid {
				item,
				message,
				redirect,
			}) => SaveOutcome {
				saved: true,
				item: Some(item),
				message: Some(message),
				warnings: Vec::new(),
				errors: IndexMap::new(),
				redirect,
			},
			Ok(Saved::Invalid { item, errors }) => {
				tracing::debug!(submission_id = submission.id, errors = errors.len(), "submission invalid");
				SaveOutcome {
					saved: false,
					item: Some(item),
					message: None,
					warnings: Vec::new(),
					errors,
					redirect: back_to_form,
				}
			}
			Err(error) => {
				tracing::warn!(submission_id = submission.id, %error, "submission refused");
				SaveOutcome {
					saved: false,
					item: None,
					message: None,
					warnings: error.warnings(MSG_SAVE_FAILED, user.is_superadmin),
					errors: IndexMap::new(),
					redirect: back_to_form,
				}
			}
		}
	}

	async fn try_save(
		&self,
		submission: &Submission,
		request: &SubmissionRequest,
		user: &User,
		session: &mut Session,
	) -> SubmissionResult<Saved> {
		let Context {
			form,
			mut item,
			target,
			..
		} = self.init(submission, request, user).await?;
		let trusted = submission.trusted_mode;

		let edit = !item.is_new();
		if !edit {
			item.name = SUBMITTED_ITEM_NAME.to_string();
			if !self.check_max_submissions(submission, user).await? {
				return Err(SubmissionError::MaxSubmissions);
			}
		}

		let post: FormData = if trusted || user.is_admin {
			request.post.clone()
		} else {
			request
				.post
				.iter()
				.map(|(key, value)| (key.clone(), filter_data(value)))
				.collect()
		};

		let item_name = item.name.clone();
		let binding = self.bind(&mut item, form, &post, trusted);
		if !binding.errors.is_empty() {
			self.stash(submission, session, &post)?;
			return Ok(Saved::Invalid {
				item,
				errors: binding.errors,
			});
		}

		if !edit || item_name != item.name {
			item.alias = self.store.items.unique_alias(item.id, &item.name).await?;
		}
		if !trusted && !form.has_element(STATE_ELEMENT) {
			item.state = ItemState::Unpublished;
		}
		item.modified = self.clock.now();
		item.modified_by = user.id;

		if !edit && !trusted {
			if let Err(error) = self.throttle.check(session) {
				self.stash(submission, session, &post)?;
				return Err(error);
			}
		}

		if !edit && item.primary_category() == 0 {
			if let Some(category_id) = form.category {
				item.set_primary_category(category_id);
			}
		}

		self.before_save
			.send(SubmissionEvent {
				submission_id: submission.id,
				item: item.clone(),
				is_new: !edit,
			})
			.await?;

		self.store.items.save(&mut item).await?;

		let mut categories = binding.categories;
		if !edit {
			if let Some(category_id) = form.category {
				let categories = categories.get_or_insert_with(Vec::new);
				if !categories.contains(&category_id) {
					categories.push(category_id);
				}
			}
		}
		if let Some(categories) = categories {
			self.store
				.categories
				.save_item_relations(item.id, &categories)
				.await?;
		}

		let message = Arc::new(Mutex::new(
			if edit {
				MSG_ITEM_SAVED
			} else if trusted {
				MSG_SUBMITTED
			} else {
				MSG_SUBMITTED_FOR_REVIEW
			}
			.to_string(),
		));
		self.saved
			.notify(SubmissionSavedEvent::new(
				submission.id,
				item.clone(),
				!edit,
				message.clone(),
			))
			.await;

		tracing::info!(
			submission_id = submission.id,
			item_id = item.id,
			is_new = !edit,
			trusted,
			"saved submission"
		);
		let redirect = resolve(&target, submission.id, &request.type_id, request.item_id, &item, self.clock.now());
		let message = message.lock().clone();
		Ok(Saved::Valid {
			item,
			message,
			redirect,
		})
	}

	/// Deletes one of the user's own items.
	pub async fn remove(&self, submission: &Submission, item_id: i64, user: &User) -> RemoveOutcome {
		let redirect = Redirect::MySubmissions {
			submission_id: submission.id,
		};
		match self.try_remove(item_id, user).await {
			Ok(()) => RemoveOutcome {
				removed: true,
				message: Some(MSG_DELETED.to_string()),
				warnings: Vec::new(),
				redirect,
			},
			Err(error) => {
				tracing::warn!(submission_id = submission.id, item_id, %error, "submission not removed");
				RemoveOutcome {
					removed: false,
					message: None,
					warnings: error.warnings(MSG_DELETE_FAILED, user.is_superadmin),
					redirect,
				}
			}
		}
	}

	async fn try_remove(&self, item_id: i64, user: &User) -> SubmissionResult<()> {
		let item = self
			.store
			.items
			.get(item_id)
			.await?
			.ok_or(SubmissionError::ItemNotFound(item_id))?;
		if user.is_guest() || !item.can_access(&user.access) || item.created_by != user.id {
			return Err(SubmissionError::NotAllowed);
		}
		self.store.items.delete(&item).await?;
		tracing::info!(item_id, user_id = user.id, "removed submission");
		self.deleted.notify(DeleteEvent::new(item)).await;
		Ok(())
	}

	/// The user's own items, one page at a time.
	pub async fn my_submissions(
		&self,
		submission: &Submission,
		user: &User,
		query: &MySubmissionsQuery,
	) -> SubmissionResult<MySubmissions> {
		self.check_config(submission, user, None).await?;
		if user.is_guest() || !user.can_access(1) {
			return Err(SubmissionError::AccessDenied);
		}

		let types = submission.submittable_types();
		let filter_types = match query.type_filter.as_deref().filter(|t| !t.is_empty()) {
			Some(type_id) => vec![type_id.to_string()],
			None => types.clone(),
		};
		let filter = UserItemFilter::default()
			.with_types(filter_types)
			.with_search(query.search.to_lowercase())
			.with_order(query.order);

		let per_page = self.settings.pagination_limit.max(1);
		let page = query.page.max(1);
		let items = self
			.store
			.items
			.by_user(submission.application_id, user, &filter, Page::number(page, per_page))
			.await?;
		let total = self
			.store
			.items
			.item_count_by_user(submission.application_id, user, &filter)
			.await?;
		let show_add = self.check_max_submissions(submission, user).await?;

		Ok(MySubmissions {
			items,
			total,
			page,
			per_page,
			types,
			show_add,
		})
	}
}

fn bind_value(item: &mut Item, element_id: &str, value: Value, binding: &mut Binding) {
	match element_id {
		NAME_ELEMENT => {
			if let Some(name) = value.as_str() {
				item.name = name.to_string();
			}
		}
		STATE_ELEMENT => {
			let state = value
				.as_i64()
				.or_else(|| value.as_bool().map(i64::from))
				.or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
				.unwrap_or(0);
			item.state = ItemState::from_i64(state);
		}
		TAG_ELEMENT => {
			item.tags = match value {
				Value::Array(tags) => tags
					.iter()
					.filter_map(|tag| tag.as_str().map(str::to_string))
					.collect(),
				Value::String(tags) => tags.split(',').map(str::to_string).collect(),
				_ => Vec::new(),
			};
		}
		CATEGORY_ELEMENT => {
			let ids = match value {
				Value::Array(ids) => ids.iter().filter_map(category_id).collect(),
				other => category_id(&other).into_iter().collect(),
			};
			binding.categories = Some(ids);
		}
		_ => item.set_element(element_id, ElementData::new(value)),
	}
}

fn category_id(value: &Value) -> Option<i64> {
	value
		.as_i64()
		.or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}
