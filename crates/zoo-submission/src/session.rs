//! Per-visitor session data the workflow reads and writes.
//!
//! The workflow only needs a key/value bag for the current request. Loading
//! and persisting it between requests is the host's job; [`SessionStore`]
//! describes that seam and [`InMemorySessionStore`] implements it for tests
//! and single-process hosts.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub type SessionId = String;

/// Session data of one visitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
	data: HashMap<String, Value>,
}

impl Session {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.data.get(key)
	}

	pub fn set(&mut self, key: impl Into<String>, value: Value) {
		self.data.insert(key.into(), value);
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.data.remove(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.data.contains_key(key)
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn clear(&mut self) {
		self.data.clear();
	}
}

/// Loads and persists sessions between requests
#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn load(&self, session_id: &str) -> Option<Session>;

	async fn save(&self, session_id: &str, session: &Session);

	async fn delete(&self, session_id: &str);
}

/// Sessions kept in process memory
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
	sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
	async fn load(&self, session_id: &str) -> Option<Session> {
		self.sessions.lock().get(session_id).cloned()
	}

	async fn save(&self, session_id: &str, session: &Session) {
		self.sessions
			.lock()
			.insert(session_id.to_string(), session.clone());
	}

	async fn delete(&self, session_id: &str) {
		self.sessions.lock().remove(session_id);
	}
}
