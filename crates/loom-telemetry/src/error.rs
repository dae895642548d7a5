// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the telemetry SDK.

use loom_telemetry_core::CoreError;
use thiserror::Error;

/// Telemetry SDK errors.
///
/// None of these ever reach the host through the [`crate::Telemetry`] facade;
/// they drive the dispatcher's retry policy and end up in logs.
#[derive(Debug, Error)]
pub enum TelemetryError {
	/// App key is missing.
	#[error("missing app key")]
	MissingAppKey,

	/// Base URL is missing.
	#[error("missing base URL")]
	MissingBaseUrl,

	/// App key or host could not be resolved.
	#[error(transparent)]
	Config(#[from] CoreError),

	/// The client was built outside a Tokio runtime.
	#[error("no Tokio runtime available to drive background flushes")]
	NoRuntime,

	/// HTTP request failed before a response arrived.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server answered with 5xx.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// Server refused the request with a 3xx or 4xx status.
	#[error("request rejected ({status}): {message}")]
	Rejected { status: u16, message: String },

	/// Serialization error.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl TelemetryError {
	/// Classifies a non-success HTTP status.
	pub fn from_status(status: u16, message: String) -> Self {
		if status >= 500 {
			TelemetryError::ServerError { status, message }
		} else {
			TelemetryError::Rejected { status, message }
		}
	}

	/// Returns true if a later attempt could succeed: transport failures and
	/// 5xx responses. Requests that could not be built, and everything else,
	/// are terminal.
	pub fn is_retryable(&self) -> bool {
		match self {
			TelemetryError::RequestFailed(e) => !e.is_builder(),
			TelemetryError::ServerError { .. } => true,
			_ => false,
		}
	}
}

/// Result type alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_server_error_retryable_statuses() {
		for status in [500, 502, 503, 504, 599] {
			let err = TelemetryError::from_status(status, "test".to_string());
			assert!(err.is_retryable(), "status {status} should be retryable");
		}
	}

	#[test]
	fn test_client_error_statuses_are_terminal() {
		for status in [300, 301, 304, 400, 401, 403, 404, 422, 429, 499] {
			let err = TelemetryError::from_status(status, "test".to_string());
			assert!(
				!err.is_retryable(),
				"status {status} should not be retryable"
			);
			assert!(matches!(err, TelemetryError::Rejected { .. }));
		}
	}

	#[test]
	fn test_config_errors_not_retryable() {
		assert!(!TelemetryError::Config(CoreError::InvalidAppKey).is_retryable());
		assert!(!TelemetryError::MissingAppKey.is_retryable());
		assert!(!TelemetryError::NoRuntime.is_retryable());
		let parse_error = serde_json::from_str::<u8>("x").unwrap_err();
		assert!(!TelemetryError::Serialization(parse_error).is_retryable());
	}

	#[test]
	fn test_request_build_failure_is_terminal() {
		let build_error = reqwest::Client::new()
			.post("http://bad host.example/api/v0/events")
			.build()
			.unwrap_err();
		assert!(build_error.is_builder());
		assert!(!TelemetryError::RequestFailed(build_error).is_retryable());
	}

	#[test]
	fn test_config_error_message_is_transparent() {
		let err = TelemetryError::from(CoreError::MissingSelfHostedUrl);
		assert_eq!(err.to_string(), CoreError::MissingSelfHostedUrl.to_string());
	}
}
