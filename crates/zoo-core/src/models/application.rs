use serde::{Deserialize, Serialize};

use crate::params::Params;

/// An application instance owning categories, items and submissions.
///
/// `group` names the application group; item types are declared per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
	pub id: i64,
	pub name: String,
	pub alias: String,
	pub group: String,
	pub params: Params,
}

impl Application {
	pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			id: 0,
			alias: crate::strings::sluggify(&name),
			name,
			group: group.into(),
			params: Params::new(),
		}
	}
}
