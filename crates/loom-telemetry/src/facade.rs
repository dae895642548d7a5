// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-facing entry point.
//!
//! [`Telemetry`] holds at most one [`TelemetryClient`], created by
//! [`Telemetry::initialize`]. Every call made before a successful
//! initialization is a no-op, and no call ever returns an error to the host.

use std::sync::OnceLock;

use loom_telemetry_core::{AppKey, Environment, Properties};
use tracing::{error, warn};

use crate::client::TelemetryClient;
use crate::config::InitOptions;
use crate::dispatcher::FlushSummary;
use crate::error::Result;

static SHARED: Telemetry = Telemetry::new();

/// Fire-and-forget telemetry facade.
///
/// # Example
///
/// ```ignore
/// use loom_telemetry::{InitOptions, Properties, Telemetry};
///
/// let telemetry = Telemetry::shared();
/// telemetry.initialize("A-EU-1234567890", Some(InitOptions::from_env()));
/// telemetry.notify_foreground();
///
/// telemetry.track_event("app_started", None);
/// telemetry.track_event("purchase", Some(Properties::new().insert("amount", 9.99)));
///
/// telemetry.notify_background().await;
/// ```
pub struct Telemetry {
	client: OnceLock<TelemetryClient>,
}

impl Telemetry {
	/// Creates an uninitialized facade.
	pub const fn new() -> Self {
		Self {
			client: OnceLock::new(),
		}
	}

	/// Returns the process-wide facade.
	pub fn shared() -> &'static Telemetry {
		&SHARED
	}

	/// Initializes tracking for `app_key` with the detected host environment.
	///
	/// Must be called from within a Tokio runtime. Invalid keys, unknown
	/// regions and a missing runtime are logged and leave tracking disabled.
	pub fn initialize(&self, app_key: &str, options: Option<InitOptions>) {
		let options = options.unwrap_or_default();
		let environment = Environment::detect(options.resolved_tracking_mode());
		self.initialize_with_environment(app_key, options, environment);
	}

	/// Initializes tracking with a host-supplied environment.
	pub fn initialize_with_environment(
		&self,
		app_key: &str,
		options: InitOptions,
		environment: Environment,
	) {
		if self.is_initialized() {
			warn!("Telemetry is already initialized, ignoring");
			return;
		}

		let client = match build_client(app_key, options, environment) {
			Ok(client) => client,
			Err(e) => {
				error!(error = %e, "Failed to initialize telemetry, tracking is disabled");
				return;
			}
		};

		if self.client.set(client).is_err() {
			warn!("Telemetry is already initialized, ignoring");
		}
	}

	/// Returns true once a client has been created.
	pub fn is_initialized(&self) -> bool {
		self.client.get().is_some()
	}

	/// Returns the underlying client once initialized.
	pub fn client(&self) -> Option<&TelemetryClient> {
		self.client.get()
	}

	/// Records an event. Never blocks on I/O.
	pub fn track_event(&self, event_name: &str, props: Option<Properties>) {
		if let Some(client) = self.client.get() {
			client.track_event(event_name, props);
		}
	}

	/// Requests a flush without waiting for it.
	pub fn flush(&self) {
		if let Some(client) = self.client.get() {
			drop(client.spawn_flush());
		}
	}

	/// The host entered the foreground.
	pub fn notify_foreground(&self) {
		if let Some(client) = self.client.get() {
			client.start_polling();
		}
	}

	/// The host is entering the background or terminating. Returns once the
	/// final flush has finished.
	pub async fn notify_background(&self) -> FlushSummary {
		match self.client.get() {
			Some(client) => client.stop_polling().await,
			None => FlushSummary::default(),
		}
	}
}

impl Default for Telemetry {
	fn default() -> Self {
		Self::new()
	}
}

fn build_client(
	app_key: &str,
	options: InitOptions,
	environment: Environment,
) -> Result<TelemetryClient> {
	let key = AppKey::parse(app_key)?;
	let base_url = key.base_url(options.host.as_deref())?;

	TelemetryClient::builder()
		.app_key(key.as_str())
		.base_url(base_url)
		.environment(environment)
		.options(options)
		.build()
}
