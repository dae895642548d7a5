// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery of event batches to the collection endpoint.

use std::time::Duration;

use loom_telemetry_core::{CoreError, Environment, Event};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{redirect, Client, Url};
use tracing::debug;

use crate::error::{Result, TelemetryError};

/// Path of the ingestion endpoint, relative to the base URL.
pub const EVENTS_PATH: &str = "/api/v0/events";

/// Header carrying the app key.
pub const APP_KEY_HEADER: &str = "App-Key";

/// Sends one batch of events.
///
/// `Ok(())` means the batch was accepted. Errors are classified with
/// [`TelemetryError::is_retryable`].
#[async_trait::async_trait]
pub trait EventTransport: Send + Sync {
	async fn send(&self, events: &[Event]) -> Result<()>;
}

/// HTTP transport posting JSON arrays to `{base_url}/api/v0/events`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	http_client: Client,
	url: Url,
}

impl HttpTransport {
	/// Builds a transport for the given endpoint.
	///
	/// Redirects are not followed so that a 3xx response is reported as a
	/// rejection instead of being chased.
	pub fn new(
		base_url: &str,
		app_key: &str,
		env: &Environment,
		request_timeout: Duration,
	) -> Result<Self> {
		let mut headers = HeaderMap::new();
		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		headers.insert(
			APP_KEY_HEADER,
			HeaderValue::from_str(app_key).map_err(|_| {
				TelemetryError::Config(loom_telemetry_core::CoreError::InvalidAppKey)
			})?,
		);

		let http_client = Client::builder()
			.user_agent(env.user_agent())
			.default_headers(headers)
			.redirect(redirect::Policy::none())
			.timeout(request_timeout)
			.build()
			.map_err(TelemetryError::RequestFailed)?;

		let base_url = base_url.trim_end_matches('/');
		let url = Url::parse(&format!("{}{}", base_url, EVENTS_PATH))
			.map_err(|_| TelemetryError::Config(CoreError::InvalidBaseUrl(base_url.to_string())))?;

		Ok(Self { http_client, url })
	}

	/// Returns the full ingestion URL.
	pub fn url(&self) -> &str {
		self.url.as_str()
	}
}

#[async_trait::async_trait]
impl EventTransport for HttpTransport {
	async fn send(&self, events: &[Event]) -> Result<()> {
		if events.is_empty() {
			return Ok(());
		}

		let body = serde_json::to_vec(events)?;

		debug!(url = %self.url, count = events.len(), "Sending event batch");

		let response = self.http_client.post(self.url.clone()).body(body).send().await?;

		let status = response.status().as_u16();
		if status < 300 {
			return Ok(());
		}

		let message = response.text().await.unwrap_or_default();
		Err(TelemetryError::from_status(status, message))
	}
}
