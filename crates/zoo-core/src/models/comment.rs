use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Moderation state of a comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentState {
	#[default]
	Unapproved,
	Approved,
	Spam,
}

impl CommentState {
	pub fn as_i64(self) -> i64 {
		match self {
			CommentState::Unapproved => 0,
			CommentState::Approved => 1,
			CommentState::Spam => 2,
		}
	}

	pub fn from_i64(value: i64) -> Self {
		match value {
			1 => CommentState::Approved,
			2 => CommentState::Spam,
			_ => CommentState::Unapproved,
		}
	}
}

/// Who wrote a comment. Guests have `user_id == 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
	pub name: String,
	pub email: String,
	pub url: String,
	pub user_id: i64,
	pub user_type: String,
}

impl CommentAuthor {
	pub fn guest(name: impl Into<String>, email: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			email: email.into(),
			..Default::default()
		}
	}

	pub fn user(user_id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			email: email.into(),
			user_id,
			user_type: "site".to_string(),
			..Default::default()
		}
	}

	pub fn is_guest(&self) -> bool {
		self.user_id == 0
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
	pub id: i64,
	pub parent_id: i64,
	pub item_id: i64,
	pub user_id: i64,
	pub user_type: String,
	pub author: String,
	pub email: String,
	pub url: String,
	pub ip: String,
	pub created: NaiveDateTime,
	pub content: String,
	pub state: CommentState,
}

impl Comment {
	pub fn new(item_id: i64, author: &CommentAuthor, content: impl Into<String>) -> Self {
		Self {
			id: 0,
			parent_id: 0,
			item_id,
			user_id: author.user_id,
			user_type: author.user_type.clone(),
			author: author.name.clone(),
			email: author.email.clone(),
			url: author.url.clone(),
			ip: String::new(),
			created: chrono::Utc::now().naive_utc(),
			content: content.into(),
			state: CommentState::Unapproved,
		}
	}

	pub fn with_parent(mut self, parent_id: i64) -> Self {
		self.parent_id = parent_id;
		self
	}

	pub fn with_state(mut self, state: CommentState) -> Self {
		self.state = state;
		self
	}

	pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
		self.ip = ip.into();
		self
	}

	pub fn with_created(mut self, created: NaiveDateTime) -> Self {
		self.created = created;
		self
	}

	pub fn is_new(&self) -> bool {
		self.id == 0
	}

	pub fn is_guest(&self) -> bool {
		self.user_id == 0
	}
}
