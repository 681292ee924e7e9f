//! Lifecycle event payloads carried by repository signals.

use crate::models::CommentState;

/// Emitted around a save. `is_new` tells inserts from updates.
#[derive(Debug, Clone)]
pub struct SaveEvent<T> {
	pub instance: T,
	pub is_new: bool,
}

impl<T> SaveEvent<T> {
	pub fn new(instance: T, is_new: bool) -> Self {
		Self { instance, is_new }
	}
}

/// Emitted after a row and its dependents are gone.
#[derive(Debug, Clone)]
pub struct DeleteEvent<T> {
	pub instance: T,
}

impl<T> DeleteEvent<T> {
	pub fn new(instance: T) -> Self {
		Self { instance }
	}
}

/// Comment saves also report the moderation state before the save.
#[derive(Debug, Clone)]
pub struct CommentSaveEvent {
	pub comment: crate::models::Comment,
	pub is_new: bool,
	pub old_state: Option<CommentState>,
}

impl CommentSaveEvent {
	/// True when the save moved the comment into `state`.
	pub fn entered(&self, state: CommentState) -> bool {
		self.comment.state == state && self.old_state != Some(state)
	}
}

/// Tags of one item were replaced.
#[derive(Debug, Clone)]
pub struct TagsSavedEvent {
	pub item_id: i64,
	pub tags: Vec<String>,
}

/// Tags were removed from an application.
#[derive(Debug, Clone)]
pub struct TagsDeletedEvent {
	pub application_id: i64,
	pub tags: Vec<String>,
}
