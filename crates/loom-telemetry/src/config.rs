// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client configuration.
//!
//! [`InitOptions`] is a layer of optional overrides that can be merged (for
//! example environment variables over code defaults). [`ClientConfig`] is the
//! resolved, immutable result.

use std::time::Duration;

use loom_telemetry_core::TrackingMode;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dispatcher::MAX_BATCH_SIZE;

const DEBUG_FLUSH_INTERVAL_SECS: f64 = 2.0;
const RELEASE_FLUSH_INTERVAL_SECS: f64 = 60.0;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_HOST: &str = "LOOM_TELEMETRY_HOST";
pub const ENV_FLUSH_INTERVAL_SECS: &str = "LOOM_TELEMETRY_FLUSH_INTERVAL_SECS";
pub const ENV_TRACKING_MODE: &str = "LOOM_TELEMETRY_TRACKING_MODE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "LOOM_TELEMETRY_REQUEST_TIMEOUT_SECS";

/// Optional overrides supplied at initialization (all fields optional for merging).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitOptions {
	/// Collection host, overriding the app key's region.
	pub host: Option<String>,
	/// Seconds between automatic flushes.
	pub flush_interval_secs: Option<f64>,
	/// How to decide whether events are flagged as debug.
	pub tracking_mode: Option<TrackingMode>,
	/// Per-request HTTP timeout in seconds.
	pub request_timeout_secs: Option<u64>,
}

impl InitOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.host = Some(host.into());
		self
	}

	pub fn flush_interval(mut self, interval: Duration) -> Self {
		self.flush_interval_secs = Some(interval.as_secs_f64());
		self
	}

	pub fn tracking_mode(mut self, mode: TrackingMode) -> Self {
		self.tracking_mode = Some(mode);
		self
	}

	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout_secs = Some(timeout.as_secs());
		self
	}

	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: Self) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.flush_interval_secs.is_some() {
			self.flush_interval_secs = other.flush_interval_secs;
		}
		if other.tracking_mode.is_some() {
			self.tracking_mode = other.tracking_mode;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
	}

	/// Reads the `LOOM_TELEMETRY_*` environment variables.
	pub fn from_env() -> Self {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds a layer from an arbitrary variable lookup. Values that do not
	/// parse are skipped with a warning.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let host = lookup(ENV_HOST).filter(|h| !h.trim().is_empty());

		let flush_interval_secs = lookup(ENV_FLUSH_INTERVAL_SECS).and_then(|raw| {
			raw.trim()
				.parse::<f64>()
				.map_err(|e| warn!(var = ENV_FLUSH_INTERVAL_SECS, value = %raw, error = %e, "Ignoring invalid value"))
				.ok()
		});

		let tracking_mode = lookup(ENV_TRACKING_MODE).and_then(|raw| {
			raw.parse::<TrackingMode>()
				.map_err(|e| warn!(var = ENV_TRACKING_MODE, value = %raw, error = %e, "Ignoring invalid value"))
				.ok()
		});

		let request_timeout_secs = lookup(ENV_REQUEST_TIMEOUT_SECS).and_then(|raw| {
			raw.trim()
				.parse::<u64>()
				.map_err(|e| warn!(var = ENV_REQUEST_TIMEOUT_SECS, value = %raw, error = %e, "Ignoring invalid value"))
				.ok()
		});

		Self {
			host,
			flush_interval_secs,
			tracking_mode,
			request_timeout_secs,
		}
	}

	/// Resolves this layer into the client configuration, applying defaults.
	pub fn finalize(
		&self,
		app_key: impl Into<String>,
		base_url: impl Into<String>,
		is_debug: bool,
	) -> ClientConfig {
		ClientConfig::new(app_key, base_url, self, is_debug)
	}

	/// Tracking mode with the default applied.
	pub fn resolved_tracking_mode(&self) -> TrackingMode {
		self.tracking_mode.unwrap_or_default()
	}

	/// Flush interval with defaults applied: 2 s for debug, 60 s otherwise.
	/// Non-positive or non-finite overrides fall back to the default.
	pub fn resolved_flush_interval(&self, is_debug: bool) -> Duration {
		let default = if is_debug {
			DEBUG_FLUSH_INTERVAL_SECS
		} else {
			RELEASE_FLUSH_INTERVAL_SECS
		};

		let default = Duration::from_secs_f64(default);
		match self.flush_interval_secs {
			Some(secs) if secs > 0.0 => Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
				warn!(flush_interval_secs = secs, "Invalid flush interval, using default");
				default
			}),
			Some(secs) => {
				warn!(flush_interval_secs = secs, "Invalid flush interval, using default");
				default
			}
			None => default,
		}
	}

	pub fn resolved_request_timeout(&self) -> Duration {
		Duration::from_secs(
			self
				.request_timeout_secs
				.filter(|secs| *secs > 0)
				.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
		)
	}
}

/// Resolved configuration of one client, immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
	pub app_key: String,
	pub base_url: String,
	pub flush_interval: Duration,
	pub max_batch_size: usize,
	pub request_timeout: Duration,
}

impl ClientConfig {
	pub fn new(
		app_key: impl Into<String>,
		base_url: impl Into<String>,
		options: &InitOptions,
		is_debug: bool,
	) -> Self {
		Self {
			app_key: app_key.into(),
			base_url: base_url.into().trim_end_matches('/').to_string(),
			flush_interval: options.resolved_flush_interval(is_debug),
			max_batch_size: MAX_BATCH_SIZE,
			request_timeout: options.resolved_request_timeout(),
		}
	}
}
