// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Track a few events and flush them before exiting.
//!
//! Run with:
//!   LOOM_TELEMETRY_APP_KEY=A-DEV-0000000000 cargo run --example track -p loom-telemetry

use std::time::Duration;

use loom_telemetry::{Environment, InitOptions, Properties, Telemetry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loom_telemetry=debug")),
		)
		.init();

	let app_key =
		std::env::var("LOOM_TELEMETRY_APP_KEY").unwrap_or_else(|_| "A-DEV-0000000000".to_string());

	// Environment variables override the defaults set here
	let mut options = InitOptions::new().flush_interval(Duration::from_secs(5));
	options.merge(InitOptions::from_env());

	let environment = Environment::detect(options.resolved_tracking_mode())
		.with_app_version(env!("CARGO_PKG_VERSION"), "1");

	println!("Initializing telemetry...");
	println!("  App key: {}", app_key);

	let telemetry = Telemetry::shared();
	telemetry.initialize_with_environment(&app_key, options, environment);
	if !telemetry.is_initialized() {
		eprintln!("Telemetry is disabled, see the log for details");
		return;
	}

	telemetry.notify_foreground();

	telemetry.track_event("app_started", None);
	telemetry.track_event(
		"screen_view",
		Some(Properties::new().insert("name", "Settings").insert("depth", 2)),
	);
	telemetry.track_event(
		"purchase",
		Some(
			Properties::new()
				.insert("sku", "pro_annual")
				.insert("price", 49.99)
				.insert("trial", false),
		),
	);

	if let Some(client) = telemetry.client() {
		println!("  Session: {}", client.session_id());
		println!("  Queued: {}", client.queue_len());
	}

	tokio::time::sleep(Duration::from_secs(1)).await;

	println!("Entering background, flushing...");
	let summary = telemetry.notify_background().await;
	println!(
		"  Sent: {}, dropped: {}, retained: {}",
		summary.sent, summary.dropped, summary.retained
	);
}
