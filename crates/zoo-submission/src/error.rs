use zoo_core::SignalError;
use zoo_db::{DbError, ItemError};

/// Submission workflow errors
///
/// The first group are refusals shown to the submitter as they are; the
/// rest are failures of the store and are reported with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
	#[error("Submissions are not configured correctly.")]
	NotConfigured,

	#[error("Submission is not configured correctly.")]
	LayoutMissing,

	#[error("Submissions are disabled.")]
	Disabled,

	#[error("Insufficient User Rights.")]
	AccessDenied,

	#[error("Hashes did not match.")]
	HashMismatch,

	#[error("You are submitting too fast, please try again in a few moments.")]
	TooFast,

	#[error("You have reached your maximum number of submissions")]
	MaxSubmissions,

	#[error("You are not allowed to make changes to this item.")]
	NotAllowed,

	#[error("Item not found: {0}")]
	ItemNotFound(i64),

	#[error("Invalid submission secret: {0}")]
	Secret(String),

	#[error(transparent)]
	Item(#[from] ItemError),

	#[error(transparent)]
	Database(#[from] DbError),

	#[error(transparent)]
	Signal(#[from] SignalError),

	#[error("Invalid form data: {0}")]
	FormData(#[from] serde_json::Error),
}

impl SubmissionError {
	/// Whether the message is meant for the submitter.
	pub fn is_user_facing(&self) -> bool {
		matches!(
			self,
			SubmissionError::NotConfigured
				| SubmissionError::LayoutMissing
				| SubmissionError::Disabled
				| SubmissionError::AccessDenied
				| SubmissionError::HashMismatch
				| SubmissionError::TooFast
				| SubmissionError::MaxSubmissions
				| SubmissionError::NotAllowed
		)
	}

	/// Warnings to show `is_superadmin` or an ordinary user for this error.
	pub fn warnings(&self, generic: &str, is_superadmin: bool) -> Vec<String> {
		if self.is_user_facing() {
			return vec![self.to_string()];
		}
		let mut warnings = vec![generic.to_string()];
		if is_superadmin {
			warnings.push(self.to_string());
		}
		warnings
	}
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;
