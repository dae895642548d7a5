// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK for Loom event telemetry.
//!
//! Events are stamped with a session id, queued in memory and delivered in
//! batches of up to 25 to `{base_url}/api/v0/events`. Delivery runs on a
//! timer while the host is in the foreground and once more when it is about
//! to be suspended. Telemetry never fails the host: every error is logged
//! through `tracing` and swallowed at the [`Telemetry`] boundary.
//!
//! # Example
//!
//! ```ignore
//! use loom_telemetry::{InitOptions, Properties, Telemetry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let telemetry = Telemetry::shared();
//!     telemetry.initialize("A-EU-1234567890", Some(InitOptions::from_env()));
//!     telemetry.notify_foreground();
//!
//!     telemetry.track_event("app_started", None);
//!     telemetry.track_event(
//!         "screen_view",
//!         Some(Properties::new().insert("name", "Settings").insert("depth", 2)),
//!     );
//!
//!     telemetry.notify_background().await;
//! }
//! ```
//!
//! Use [`TelemetryClient`] directly when errors should be observed or a custom
//! [`EventTransport`] is needed.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod facade;
pub mod scheduler;
pub mod transport;

pub use client::{TelemetryClient, TelemetryClientBuilder};
pub use config::{ClientConfig, InitOptions};
pub use dispatcher::{Dispatcher, FlushSummary, MAX_BATCH_SIZE};
pub use error::{Result, TelemetryError};
pub use facade::Telemetry;
pub use scheduler::FlushScheduler;
pub use transport::{EventTransport, HttpTransport, APP_KEY_HEADER, EVENTS_PATH};

pub use loom_telemetry_core::{
	AppKey, CoreError, Environment, Event, EventValue, Properties, Region, SessionManager,
	SystemProps, TrackingMode, SDK_VERSION,
};
