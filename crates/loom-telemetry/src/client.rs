// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Telemetry client: session stamping, queueing and scheduled delivery for one
//! app key.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use loom_telemetry_core::{
	normalize_base_url, Environment, Event, Properties, SessionManager, SystemProps,
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{ClientConfig, InitOptions};
use crate::dispatcher::{Dispatcher, FlushSummary};
use crate::error::{Result, TelemetryError};
use crate::scheduler::FlushScheduler;
use crate::transport::{EventTransport, HttpTransport};

/// Builder for constructing a [`TelemetryClient`].
pub struct TelemetryClientBuilder {
	app_key: Option<String>,
	base_url: Option<String>,
	environment: Option<Environment>,
	options: InitOptions,
	transport: Option<Arc<dyn EventTransport>>,
	runtime: Option<Handle>,
}

impl TelemetryClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			app_key: None,
			base_url: None,
			environment: None,
			options: InitOptions::default(),
			transport: None,
			runtime: None,
		}
	}

	/// Sets the app key sent in the `App-Key` header.
	pub fn app_key(mut self, key: impl Into<String>) -> Self {
		self.app_key = Some(key.into());
		self
	}

	/// Sets the resolved base URL of the collection endpoint.
	///
	/// Example: `https://eu.aptabase.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Sets the host environment. Defaults to [`Environment::detect`].
	pub fn environment(mut self, env: Environment) -> Self {
		self.environment = Some(env);
		self
	}

	/// Applies initialization options (flush interval, tracking mode, timeout).
	pub fn options(mut self, options: InitOptions) -> Self {
		self.options = options;
		self
	}

	/// Replaces the HTTP transport.
	pub fn transport(mut self, transport: Arc<dyn EventTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Sets the runtime used for background flushes. Defaults to the runtime
	/// the builder runs on.
	pub fn runtime(mut self, runtime: Handle) -> Self {
		self.runtime = Some(runtime);
		self
	}

	/// Builds the client. Polling is not started; see
	/// [`TelemetryClient::start_polling`].
	pub fn build(self) -> Result<TelemetryClient> {
		let app_key = self.app_key.ok_or(TelemetryError::MissingAppKey)?;
		let base_url = self.base_url.ok_or(TelemetryError::MissingBaseUrl)?;
		let base_url = normalize_base_url(&base_url)?;
		let runtime = match self.runtime {
			Some(runtime) => runtime,
			None => Handle::try_current().map_err(|_| TelemetryError::NoRuntime)?,
		};

		let mut environment = match self.environment {
			Some(env) => env,
			None => Environment::detect(self.options.resolved_tracking_mode()),
		};
		if let Some(mode) = self.options.tracking_mode {
			environment.is_debug = mode.is_debug(environment.is_debug);
		}

		let config = self.options.finalize(app_key, base_url, environment.is_debug);

		let transport: Arc<dyn EventTransport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::new(
				&config.base_url,
				&config.app_key,
				&environment,
				config.request_timeout,
			)?),
		};

		let dispatcher = Arc::new(Dispatcher::with_batch_size(
			transport,
			config.max_batch_size,
		));
		let scheduler = FlushScheduler::new(
			Arc::clone(&dispatcher),
			config.flush_interval,
			runtime.clone(),
		);

		info!(
			base_url = %config.base_url,
			flush_interval_ms = config.flush_interval.as_millis() as u64,
			is_debug = environment.is_debug,
			"Telemetry client initialized"
		);

		Ok(TelemetryClient {
			inner: Arc::new(ClientInner {
				system_props: SystemProps::from_environment(&environment),
				sessions: Mutex::new(SessionManager::new(Instant::now())),
				config,
				dispatcher,
				scheduler,
				runtime,
				closed: AtomicBool::new(false),
			}),
		})
	}
}

impl Default for TelemetryClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct ClientInner {
	config: ClientConfig,
	system_props: SystemProps,
	sessions: Mutex<SessionManager>,
	dispatcher: Arc<Dispatcher>,
	scheduler: FlushScheduler,
	runtime: Handle,
	closed: AtomicBool,
}

/// Client for tracking events against one app key.
///
/// Cloning is cheap; clones share the queue, session and timer.
///
/// # Example
///
/// ```ignore
/// use loom_telemetry::{Properties, TelemetryClient};
///
/// let client = TelemetryClient::builder()
///     .app_key("A-EU-1234567890")
///     .base_url("https://eu.aptabase.com")
///     .build()?;
///
/// client.start_polling();
/// client.track_event("screen_view", Some(Properties::new().insert("name", "Settings")));
///
/// // Before the process is suspended
/// client.stop_polling().await;
/// ```
#[derive(Clone)]
pub struct TelemetryClient {
	inner: Arc<ClientInner>,
}

impl TelemetryClient {
	/// Creates a new builder for constructing a TelemetryClient.
	pub fn builder() -> TelemetryClientBuilder {
		TelemetryClientBuilder::new()
	}

	/// Stamps the event with the current session and queues it. Never blocks
	/// on I/O.
	pub fn track_event(&self, event_name: &str, props: Option<Properties>) {
		self.track_event_at(Instant::now(), event_name, props);
	}

	pub(crate) fn track_event_at(&self, now: Instant, event_name: &str, props: Option<Properties>) {
		if self.is_closed() {
			debug!(event_name, "Client is shut down, dropping event");
			return;
		}

		let session_id = self.sessions().stamp(now);
		let event = Event::new(
			Utc::now(),
			session_id,
			event_name,
			self.inner.system_props.clone(),
			props,
		);
		self.inner.dispatcher.enqueue(event);
	}

	/// Sends everything queued and waits for the result.
	pub async fn flush(&self) -> FlushSummary {
		self.inner.dispatcher.flush().await
	}

	/// Flushes on the client's runtime without waiting.
	pub fn spawn_flush(&self) -> JoinHandle<FlushSummary> {
		let dispatcher = Arc::clone(&self.inner.dispatcher);
		self
			.inner
			.runtime
			.spawn(async move { dispatcher.flush().await })
	}

	/// Starts periodic flushing. Call when the host enters the foreground.
	pub fn start_polling(&self) {
		if self.is_closed() {
			return;
		}
		self.inner.scheduler.start_polling();
	}

	/// Stops periodic flushing and flushes one last time. Call before the
	/// host is suspended or terminated.
	pub async fn stop_polling(&self) -> FlushSummary {
		self.inner.scheduler.stop_polling().await
	}

	/// Stops polling with a final flush and rejects further events.
	pub async fn shutdown(&self) -> FlushSummary {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return FlushSummary::default();
		}

		info!("Shutting down telemetry client");
		let summary = self.inner.scheduler.stop_polling().await;
		info!(
			sent = summary.sent,
			pending = self.queue_len(),
			"Telemetry client shutdown complete"
		);
		summary
	}

	/// Returns the id of the current session.
	pub fn session_id(&self) -> String {
		self.sessions().session_id().to_string()
	}

	/// Returns the number of events currently queued.
	pub fn queue_len(&self) -> usize {
		self.inner.dispatcher.queue_len()
	}

	/// Returns true while periodic flushing is active.
	pub fn is_polling(&self) -> bool {
		self.inner.scheduler.is_polling()
	}

	/// Returns true if the client has been shut down.
	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}

	/// Returns the resolved configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.inner.config
	}

	/// Returns the system properties stamped onto every event.
	pub fn system_props(&self) -> &SystemProps {
		&self.inner.system_props
	}

	fn sessions(&self) -> MutexGuard<'_, SessionManager> {
		self
			.inner
			.sessions
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dispatcher::tests::{test_env, MockTransport};
	use loom_telemetry_core::{CoreError, EventValue, SDK_VERSION, SESSION_TIMEOUT};
	use std::time::Duration;

	fn setup() -> (Arc<MockTransport>, TelemetryClient) {
		let transport = Arc::new(MockTransport::new());
		let client = TelemetryClient::builder()
			.app_key("A-DEV-000")
			.base_url("http://localhost:3000")
			.environment(test_env())
			.transport(transport.clone())
			.build()
			.unwrap();
		(transport, client)
	}

	#[test]
	fn test_builder_requires_app_key() {
		let result = TelemetryClientBuilder::new()
			.base_url("http://localhost:3000")
			.build();
		assert!(matches!(result, Err(TelemetryError::MissingAppKey)));
	}

	#[test]
	fn test_builder_requires_base_url() {
		let result = TelemetryClientBuilder::new().app_key("A-DEV-000").build();
		assert!(matches!(result, Err(TelemetryError::MissingBaseUrl)));
	}

	#[tokio::test]
	async fn test_builder_rejects_malformed_base_url() {
		let result = TelemetryClient::builder()
			.app_key("A-DEV-000")
			.base_url("http://bad host.example")
			.environment(test_env())
			.transport(Arc::new(MockTransport::new()))
			.build();
		assert!(matches!(
			result,
			Err(TelemetryError::Config(CoreError::InvalidBaseUrl(_)))
		));
	}

	#[test]
	fn test_builder_requires_runtime() {
		let result = TelemetryClientBuilder::new()
			.app_key("A-DEV-000")
			.base_url("http://localhost:3000")
			.build();
		assert!(matches!(result, Err(TelemetryError::NoRuntime)));
	}

	#[tokio::test]
	async fn test_builder_uses_debug_flush_interval() {
		let (_transport, client) = setup();
		assert_eq!(client.config().flush_interval, Duration::from_secs(2));
		assert_eq!(client.config().max_batch_size, 25);
	}

	#[tokio::test]
	async fn test_tracking_mode_overrides_environment() {
		let client = TelemetryClient::builder()
			.app_key("A-DEV-000")
			.base_url("http://localhost:3000")
			.environment(test_env())
			.options(InitOptions::new().tracking_mode(loom_telemetry_core::TrackingMode::Release))
			.transport(Arc::new(MockTransport::new()))
			.build()
			.unwrap();

		assert!(!client.system_props().is_debug);
		assert_eq!(client.config().flush_interval, Duration::from_secs(60));
	}

	#[tokio::test]
	async fn test_flush_empty_queue() {
		let (transport, client) = setup();

		client.flush().await;
		assert_eq!(transport.request_count(), 0);
	}

	#[tokio::test]
	async fn test_flush_single_item() {
		let (transport, client) = setup();

		client.track_event("app_started", None);
		client.flush().await;
		assert_eq!(transport.request_count(), 1);
	}

	#[tokio::test]
	async fn test_flush_should_batch_multiple_items() {
		let (transport, client) = setup();

		client.track_event("app_started", None);
		client.track_event("item_created", None);
		client.track_event("item_deleted", None);

		client.flush().await;
		assert_eq!(transport.request_count(), 1);

		client.flush().await;
		assert_eq!(transport.request_count(), 1);
	}

	#[tokio::test]
	async fn test_flush_should_retry_after_server_error() {
		let (transport, client) = setup();

		client.track_event("app_started", None);
		client.track_event("item_created", None);
		client.track_event("item_deleted", None);

		transport.set_status(500);
		client.flush().await;
		assert_eq!(transport.request_count(), 1);
		assert_eq!(client.queue_len(), 3);

		transport.set_status(200);
		client.flush().await;
		assert_eq!(transport.request_count(), 2);
		assert_eq!(client.queue_len(), 0);
	}

	#[tokio::test]
	async fn test_client_error_should_not_retry() {
		let (transport, client) = setup();

		client.track_event("app_started", None);

		transport.set_status(400);
		client.flush().await;
		assert_eq!(transport.request_count(), 1);

		transport.set_status(200);
		client.flush().await;
		assert_eq!(transport.request_count(), 1);
	}

	#[tokio::test]
	async fn test_track_event_stamps_session_and_system_props() {
		let (transport, client) = setup();

		client.track_event(
			"screen_view",
			Some(Properties::new().insert("name", "Settings").insert("count", 42)),
		);
		client.flush().await;

		let batches = transport.batches();
		let event = &batches[0][0];
		assert_eq!(event.event_name, "screen_view");
		assert_eq!(event.session_id, client.session_id());
		assert_eq!(event.system_props.sdk_version, SDK_VERSION);
		assert_eq!(event.system_props.device_model, "iPhone16,2");
		let props = event.props.as_ref().unwrap();
		assert_eq!(props.get("count"), Some(&EventValue::Integer(42)));
	}

	#[tokio::test]
	async fn test_session_rotates_after_inactivity() {
		let (transport, client) = setup();
		let start = Instant::now();

		client.track_event_at(start, "first", None);
		client.track_event_at(start + Duration::from_secs(60), "second", None);
		client.track_event_at(
			start + Duration::from_secs(60) + SESSION_TIMEOUT + Duration::from_secs(1),
			"third",
			None,
		);
		client.flush().await;

		let events = &transport.batches()[0];
		assert_eq!(events[0].session_id, events[1].session_id);
		assert_ne!(events[1].session_id, events[2].session_id);
		assert_eq!(events[2].session_id, client.session_id());
	}

	#[tokio::test]
	async fn test_spawn_flush_runs_in_background() {
		let (transport, client) = setup();

		client.track_event("app_started", None);
		let summary = client.spawn_flush().await.unwrap();

		assert_eq!(summary.sent, 1);
		assert_eq!(transport.request_count(), 1);
	}

	#[tokio::test]
	async fn test_shutdown_flushes_and_rejects_events() {
		let (transport, client) = setup();

		client.track_event("app_started", None);
		client.start_polling();
		let summary = client.shutdown().await;
		assert_eq!(summary.sent, 1);
		assert!(!client.is_polling());

		client.track_event("after_shutdown", None);
		assert_eq!(client.queue_len(), 0);

		client.shutdown().await;
		assert_eq!(transport.request_count(), 1);
	}
}
