//! Where the submitter goes after a form action.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use zoo_core::Item;

/// The `redirect` parameter of a submission request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RedirectTarget {
	/// Back to the submission form
	#[default]
	Form,
	MySubmissions,
	/// The item edit form: back to the item once it is published
	ItemEdit,
	/// A base64 encoded URL
	Custom(String),
}

impl RedirectTarget {
	/// Parses the raw parameter. A custom target that is not valid base64
	/// UTF-8 falls back to the form.
	pub fn parse(raw: Option<&str>) -> Self {
		match raw.map(str::trim).unwrap_or_default() {
			"" => RedirectTarget::Form,
			"mysubmissions" => RedirectTarget::MySubmissions,
			"itemedit" => RedirectTarget::ItemEdit,
			encoded => match STANDARD
				.decode(encoded)
				.ok()
				.and_then(|bytes| String::from_utf8(bytes).ok())
			{
				Some(url) => RedirectTarget::Custom(url),
				None => {
					tracing::warn!(redirect = encoded, "ignoring undecodable redirect");
					RedirectTarget::Form
				}
			},
		}
	}

	pub fn is_item_edit(&self) -> bool {
		matches!(self, RedirectTarget::ItemEdit)
	}

	/// The raw parameter value that parses back to this target.
	pub fn to_param(&self) -> Option<String> {
		match self {
			RedirectTarget::Form => None,
			RedirectTarget::MySubmissions => Some("mysubmissions".to_string()),
			RedirectTarget::ItemEdit => Some("itemedit".to_string()),
			RedirectTarget::Custom(url) => Some(encode_redirect(url)),
		}
	}
}

/// Encodes a URL for the `redirect` parameter.
pub fn encode_redirect(url: &str) -> String {
	STANDARD.encode(url)
}

/// A resolved destination; turning it into a URL is up to the host's router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Redirect {
	Form {
		submission_id: i64,
		type_id: String,
		item_id: i64,
		redirect: Option<String>,
	},
	MySubmissions {
		submission_id: i64,
	},
	Item {
		item_id: i64,
	},
	Url {
		url: String,
	},
}

impl Redirect {
	pub fn form(submission_id: i64, type_id: &str, item_id: i64, target: &RedirectTarget) -> Self {
		Redirect::Form {
			submission_id,
			type_id: type_id.to_string(),
			item_id,
			redirect: target.to_param(),
		}
	}
}

/// Destination after a successful action on `item`.
///
/// Form targets reopen the form for `request_item_id`, the id the request
/// came in with, so a fresh submission leads to a fresh form.
pub fn resolve(
	target: &RedirectTarget,
	submission_id: i64,
	type_id: &str,
	request_item_id: i64,
	item: &Item,
	now: NaiveDateTime,
) -> Redirect {
	match target {
		RedirectTarget::Form => Redirect::form(submission_id, type_id, request_item_id, &RedirectTarget::Form),
		RedirectTarget::MySubmissions => Redirect::MySubmissions { submission_id },
		RedirectTarget::ItemEdit if item.is_published(now) => Redirect::Item { item_id: item.id },
		RedirectTarget::ItemEdit => Redirect::form(submission_id, type_id, request_item_id, &RedirectTarget::Form),
		RedirectTarget::Custom(url) => Redirect::Url { url: url.clone() },
	}
}
