// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the telemetry core.

use thiserror::Error;

/// Errors raised while resolving the client's identity and endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
	#[error("invalid app key format: expected A-<REGION>-<id>")]
	InvalidAppKey,

	#[error("unknown region in app key: {0}")]
	UnknownRegion(String),

	#[error("a host must be provided when using a self-hosted app key")]
	MissingSelfHostedUrl,

	#[error("invalid base URL: {0}")]
	InvalidBaseUrl(String),
}

/// A specialized `Result` type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
