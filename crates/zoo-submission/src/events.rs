use parking_lot::Mutex;
use std::sync::Arc;
use zoo_core::Item;

/// Sent before a submitted item is stored; a failing receiver aborts the
/// submission.
#[derive(Debug, Clone)]
pub struct SubmissionEvent {
	pub submission_id: i64,
	pub item: Item,
	pub is_new: bool,
}

/// Sent after a submitted item is stored
///
/// Receivers may replace the message shown to the submitter.
#[derive(Debug, Clone)]
pub struct SubmissionSavedEvent {
	pub submission_id: i64,
	pub item: Item,
	pub is_new: bool,
	message: Arc<Mutex<String>>,
}

impl SubmissionSavedEvent {
	pub(crate) fn new(submission_id: i64, item: Item, is_new: bool, message: Arc<Mutex<String>>) -> Self {
		Self {
			submission_id,
			item,
			is_new,
			message,
		}
	}

	pub fn message(&self) -> String {
		self.message.lock().clone()
	}

	pub fn set_message(&self, message: impl Into<String>) {
		*self.message.lock() = message.into();
	}
}
