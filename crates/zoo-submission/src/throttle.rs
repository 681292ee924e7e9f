use chrono::Duration;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{SubmissionError, SubmissionResult};
use crate::session::Session;
use crate::time_provider::TimeProvider;

/// Minimum time between two public submissions of one session
///
/// The last submission time lives in the session, so the check is advisory:
/// concurrent requests of one session may both pass.
#[derive(Clone)]
pub struct SubmissionThrottle {
	interval: Duration,
	key: String,
	clock: Arc<dyn TimeProvider>,
}

impl SubmissionThrottle {
	pub fn new(interval: Duration, key: impl Into<String>, clock: Arc<dyn TimeProvider>) -> Self {
		Self {
			interval,
			key: key.into(),
			clock,
		}
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Refuses a submission inside the interval, otherwise records it.
	pub fn check(&self, session: &mut Session) -> SubmissionResult<()> {
		let now = self.clock.timestamp();
		let last = session.get(&self.key).and_then(Value::as_i64);
		if let Some(last) = last {
			if now < last + self.interval.num_seconds() {
				tracing::debug!(last, now, "submission throttled");
				return Err(SubmissionError::TooFast);
			}
		}
		session.set(self.key.clone(), Value::from(now));
		Ok(())
	}
}
