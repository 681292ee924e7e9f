use chrono::{Duration, NaiveDateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Source of the wall-clock time (UTC) the workflow stamps items with and
/// throttles against. Tests swap in [`MockTimeProvider`].
pub trait TimeProvider: Send + Sync {
	fn now(&self) -> NaiveDateTime;

	fn timestamp(&self) -> i64 {
		self.now().and_utc().timestamp()
	}
}

/// The system clock
#[derive(Clone, Default)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
	pub fn new() -> Self {
		Self
	}
}

impl TimeProvider for SystemTimeProvider {
	fn now(&self) -> NaiveDateTime {
		Utc::now().naive_utc()
	}
}

/// Manually driven clock for tests
#[derive(Clone)]
pub struct MockTimeProvider {
	current_time: Arc<RwLock<NaiveDateTime>>,
}

impl MockTimeProvider {
	pub fn new(start_time: NaiveDateTime) -> Self {
		Self {
			current_time: Arc::new(RwLock::new(start_time)),
		}
	}

	pub fn advance(&self, duration: Duration) {
		let mut time = self.current_time.write();
		*time += duration;
	}

	pub fn set_time(&self, time: NaiveDateTime) {
		*self.current_time.write() = time;
	}
}

impl Default for MockTimeProvider {
	fn default() -> Self {
		Self::new(Utc::now().naive_utc())
	}
}

impl TimeProvider for MockTimeProvider {
	fn now(&self) -> NaiveDateTime {
		*self.current_time.read()
	}
}
