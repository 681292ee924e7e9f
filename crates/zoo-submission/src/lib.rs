//! # zoo-submission
//!
//! Front-end submissions: visitors create and edit items of an application
//! through configured forms.
//!
//! ## Features
//!
//! - **Forms**: one form per submittable item type, bound element by element
//!   through an [`ElementValidator`]
//! - **Integrity**: every form carries an HMAC over its submission, type, item
//!   and edit mode
//! - **Moderation**: untrusted submissions are unpublished, filtered and
//!   throttled per session
//! - **Signals**: `before_save` lets the host veto a submission; `saved` and
//!   `deleted` report stored changes and may rewrite the confirmation message
//! - **My submissions**: paged, searchable list of the user's own items
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zoo_submission::prelude::*;
//! use serde_json::json;
//!
//! let service = SubmissionService::new(store, settings.submission.clone());
//! let submission = Submission::new(1, blog.id, "Write for us").with_form(
//!     "article",
//!     SubmissionForm::new("default").with_element(ElementConfig::new("_itemname").required()),
//! );
//!
//! let request = SubmissionRequest::new("article").with_value("_itemname", json!("Hello"));
//! let outcome = service.save(&submission, &request, &user, &mut session).await;
//! if !outcome.saved {
//!     for warning in &outcome.warnings {
//!         tracing::warn!(%warning, "submission refused");
//!     }
//! }
//! ```

pub mod error;
pub mod events;
pub mod hash;
pub mod redirect;
pub mod service;
pub mod session;
pub mod submission;
pub mod throttle;
pub mod time_provider;
pub mod validation;

pub use error::{SubmissionError, SubmissionResult};
pub use events::{SubmissionEvent, SubmissionSavedEvent};
pub use hash::SubmissionHasher;
pub use redirect::{Redirect, RedirectTarget, encode_redirect};
pub use service::{
	FormData, FormView, MySubmissions, MySubmissionsQuery, RemoveOutcome, SaveOutcome,
	SubmissionRequest, SubmissionService,
};
pub use session::{InMemorySessionStore, Session, SessionStore};
pub use submission::{ElementConfig, Submission, SubmissionForm, can_edit};
pub use throttle::SubmissionThrottle;
pub use time_provider::{MockTimeProvider, SystemTimeProvider, TimeProvider};
pub use validation::{DefaultValidator, ElementValidator, ValidationError};

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::error::{SubmissionError, SubmissionResult};
	pub use crate::events::{SubmissionEvent, SubmissionSavedEvent};
	pub use crate::redirect::{Redirect, RedirectTarget};
	pub use crate::service::{
		MySubmissionsQuery, SaveOutcome, SubmissionRequest, SubmissionService,
	};
	pub use crate::session::{Session, SessionStore};
	pub use crate::submission::{ElementConfig, Submission, SubmissionForm};
	pub use crate::validation::{ElementValidator, ValidationError};
}
