// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! App keys and region routing.
//!
//! App keys have the shape `A-<REGION>-<id>`. The region decides which
//! collection host receives events unless the caller overrides the host.

use url::Url;

use crate::error::{CoreError, Result};

/// Collection region encoded in an app key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
	Us,
	Eu,
	Dev,
	SelfHosted,
}

impl Region {
	pub fn as_str(&self) -> &'static str {
		match self {
			Region::Us => "US",
			Region::Eu => "EU",
			Region::Dev => "DEV",
			Region::SelfHosted => "SH",
		}
	}

	/// Default host for the region. Self-hosted keys have none.
	pub fn default_host(&self) -> Option<&'static str> {
		match self {
			Region::Us => Some("https://us.aptabase.com"),
			Region::Eu => Some("https://eu.aptabase.com"),
			Region::Dev => Some("http://localhost:3000"),
			Region::SelfHosted => None,
		}
	}
}

impl std::fmt::Display for Region {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for Region {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"US" => Ok(Region::Us),
			"EU" => Ok(Region::Eu),
			"DEV" => Ok(Region::Dev),
			"SH" => Ok(Region::SelfHosted),
			other => Err(CoreError::UnknownRegion(other.to_string())),
		}
	}
}

/// A parsed app key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppKey {
	raw: String,
	region: Region,
}

impl AppKey {
	/// Parses a raw key. The key must have exactly three `-` separated parts
	/// and a known region in the middle.
	pub fn parse(raw: &str) -> Result<Self> {
		let parts: Vec<&str> = raw.split('-').collect();
		if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
			return Err(CoreError::InvalidAppKey);
		}

		let region = parts[1].parse()?;
		Ok(Self {
			raw: raw.to_string(),
			region,
		})
	}

	pub fn as_str(&self) -> &str {
		&self.raw
	}

	pub fn region(&self) -> Region {
		self.region
	}

	/// Resolves the base URL: an explicit host always wins, otherwise the
	/// region's default host. The result never ends with `/`.
	pub fn base_url(&self, host: Option<&str>) -> Result<String> {
		let url = match host {
			Some(host) => host,
			None => self
				.region
				.default_host()
				.ok_or(CoreError::MissingSelfHostedUrl)?,
		};

		normalize_base_url(url)
	}
}

/// Validates a collection base URL and strips trailing slashes.
///
/// The URL must parse, use `http` or `https` and name a host.
pub fn normalize_base_url(raw: &str) -> Result<String> {
	let trimmed = raw.trim().trim_end_matches('/');
	let invalid = || CoreError::InvalidBaseUrl(trimmed.to_string());

	let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
	if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
		return Err(invalid());
	}
	Ok(trimmed.to_string())
}

impl std::fmt::Display for AppKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.raw)
	}
}
