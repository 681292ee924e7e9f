//! Typed observer lists for lifecycle notifications.
//!
//! Every repository owns its signals; there is no global dispatcher. Receivers
//! are async closures taking the event behind an `Arc` and run in priority
//! order (higher first). `send` stops at the first receiver error and returns
//! it, so a `saving` receiver can veto a save. `notify` is for events about
//! work already done: it runs every receiver and only logs failures.

use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxFuture = Pin<Box<dyn Future<Output = Result<(), SignalError>> + Send>>;
type ReceiverFn<T> = Arc<dyn Fn(Arc<T>) -> BoxFuture + Send + Sync>;
type PredicateFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Errors raised by signal receivers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
	/// A receiver refused the event
	#[error("Receiver '{receiver}' rejected {signal}: {message}")]
	Rejected {
		signal: String,
		receiver: String,
		message: String,
	},

	/// A receiver failed while handling the event
	#[error("Receiver failed: {0}")]
	Failed(String),
}

impl SignalError {
	pub fn failed(message: impl Into<String>) -> Self {
		SignalError::Failed(message.into())
	}
}

struct ReceiverInfo<T: Send + Sync + 'static> {
	receiver: ReceiverFn<T>,
	dispatch_uid: Option<String>,
	priority: i32, // Higher values execute first
	predicate: Option<PredicateFn<T>>,
}

impl<T: Send + Sync + 'static> Clone for ReceiverInfo<T> {
	fn clone(&self) -> Self {
		Self {
			receiver: Arc::clone(&self.receiver),
			dispatch_uid: self.dispatch_uid.clone(),
			priority: self.priority,
			predicate: self.predicate.clone(),
		}
	}
}

/// A signal that dispatches events of type `T` to connected receivers
pub struct Signal<T: Send + Sync + 'static> {
	receivers: Arc<RwLock<Vec<ReceiverInfo<T>>>>,
	name: String,
}

impl<T: Send + Sync + 'static> Signal<T> {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			receivers: Arc::new(RwLock::new(Vec::new())),
			name: name.into(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Connect a receiver with all available options
	///
	/// # Arguments
	/// * `receiver` - The receiver function to connect
	/// * `dispatch_uid` - Optional unique identifier; reconnecting with the same uid replaces the receiver
	/// * `priority` - Execution priority (higher values execute first, default: 0)
	/// * `predicate` - Optional condition that must hold for the receiver to run
	pub fn connect_with_options<F, Fut, P>(
		&self,
		receiver: F,
		dispatch_uid: Option<String>,
		priority: i32,
		predicate: Option<P>,
	) where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
		P: Fn(&T) -> bool + Send + Sync + 'static,
	{
		let boxed: ReceiverFn<T> = Arc::new(move |instance| Box::pin(receiver(instance)));
		let predicate = predicate.map(|p| Arc::new(p) as PredicateFn<T>);
		let mut receivers = self.receivers.write();

		if let Some(ref uid) = dispatch_uid {
			receivers.retain(|r| r.dispatch_uid.as_ref() != Some(uid));
		}

		receivers.push(ReceiverInfo {
			receiver: boxed,
			dispatch_uid,
			priority,
			predicate,
		});

		// Stable sort keeps connection order among equal priorities
		receivers.sort_by(|a, b| b.priority.cmp(&a.priority));
	}

	pub fn connect<F, Fut>(&self, receiver: F)
	where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
	{
		self.connect_with_options::<F, Fut, fn(&T) -> bool>(receiver, None, 0, None);
	}

	pub fn connect_with_priority<F, Fut>(&self, receiver: F, priority: i32)
	where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
	{
		self.connect_with_options::<F, Fut, fn(&T) -> bool>(receiver, None, priority, None);
	}

	pub fn connect_with_uid<F, Fut>(&self, receiver: F, dispatch_uid: impl Into<String>)
	where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
	{
		self.connect_with_options::<F, Fut, fn(&T) -> bool>(
			receiver,
			Some(dispatch_uid.into()),
			0,
			None,
		);
	}

	/// Connect a receiver that only runs when `predicate` holds for the event
	pub fn connect_if<F, Fut, P>(&self, receiver: F, predicate: P)
	where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
		P: Fn(&T) -> bool + Send + Sync + 'static,
	{
		self.connect_with_options(receiver, None, 0, Some(predicate));
	}

	/// Disconnect a receiver by dispatch_uid
	pub fn disconnect(&self, dispatch_uid: &str) -> bool {
		let mut receivers = self.receivers.write();
		let original_len = receivers.len();
		receivers.retain(|r| r.dispatch_uid.as_deref() != Some(dispatch_uid));
		receivers.len() < original_len
	}

	pub fn disconnect_all(&self) {
		self.receivers.write().clear();
	}

	pub fn receiver_count(&self) -> usize {
		self.receivers.read().len()
	}

	/// Send the event to every receiver, stopping at the first error
	pub async fn send(&self, instance: T) -> Result<(), SignalError> {
		let instance = Arc::new(instance);
		// Snapshot so receivers may connect or disconnect while we dispatch
		let receivers = self.receivers.read().clone();

		for receiver_info in receivers {
			if let Some(ref predicate) = receiver_info.predicate
				&& !predicate(&instance)
			{
				continue;
			}

			if let Err(error) = (receiver_info.receiver)(Arc::clone(&instance)).await {
				tracing::warn!(signal = %self.name, %error, "signal receiver failed");
				return Err(error);
			}
		}

		Ok(())
	}

	/// Send the event to every receiver, collecting each receiver's result
	pub async fn send_robust(&self, instance: T) -> Vec<Result<(), SignalError>> {
		let instance = Arc::new(instance);
		let receivers = self.receivers.read().clone();
		let mut results = Vec::with_capacity(receivers.len());

		for receiver_info in receivers {
			if let Some(ref predicate) = receiver_info.predicate
				&& !predicate(&instance)
			{
				continue;
			}

			results.push((receiver_info.receiver)(Arc::clone(&instance)).await);
		}

		results
	}

	/// Send an after-the-fact notification: every receiver runs and failures
	/// are logged, never returned. Yields the number of failed receivers.
	pub async fn notify(&self, instance: T) -> usize {
		self.send_robust(instance)
			.await
			.into_iter()
			.filter_map(Result::err)
			.inspect(|error| tracing::warn!(signal = %self.name, %error, "signal receiver failed"))
			.count()
	}
}

impl<T: Send + Sync + 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			receivers: Arc::clone(&self.receivers),
			name: self.name.clone(),
		}
	}
}

impl<T: Send + Sync + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("name", &self.name)
			.field("receiver_count", &self.receiver_count())
			.finish()
	}
}
