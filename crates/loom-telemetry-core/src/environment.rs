// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host environment description supplied by the embedding application.

use serde::{Deserialize, Serialize};

/// Decides whether events are flagged as debug.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
	/// Always report as a debug build.
	Debug,
	/// Always report as a release build.
	Release,
	/// Follow how the host binary was compiled.
	#[default]
	ReadFromEnvironment,
}

impl TrackingMode {
	/// Resolves the debug flag. `build_is_debug` is consulted only for
	/// [`TrackingMode::ReadFromEnvironment`].
	pub fn is_debug(self, build_is_debug: bool) -> bool {
		match self {
			TrackingMode::Debug => true,
			TrackingMode::Release => false,
			TrackingMode::ReadFromEnvironment => build_is_debug,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			TrackingMode::Debug => "debug",
			TrackingMode::Release => "release",
			TrackingMode::ReadFromEnvironment => "auto",
		}
	}
}

impl std::fmt::Display for TrackingMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for TrackingMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"debug" => Ok(TrackingMode::Debug),
			"release" => Ok(TrackingMode::Release),
			"auto" | "env" | "environment" => Ok(TrackingMode::ReadFromEnvironment),
			other => Err(format!("invalid tracking mode: {}", other)),
		}
	}
}

/// Immutable description of the host application and platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
	pub is_debug: bool,
	pub locale: String,
	pub os_name: String,
	pub os_version: String,
	pub app_version: String,
	pub app_build_number: String,
	pub device_model: String,
}

impl Environment {
	/// Best-effort description of the current process for hosts without
	/// platform glue of their own.
	///
	/// The OS name and CPU architecture come from the compile target and the
	/// locale from `LC_ALL`/`LC_MESSAGES`/`LANG`. OS version and app version
	/// stay empty; set them with the `with_*` builders.
	pub fn detect(mode: TrackingMode) -> Self {
		let locale = ["LC_ALL", "LC_MESSAGES", "LANG"]
			.iter()
			.filter_map(|var| std::env::var(var).ok())
			.find_map(|raw| language_code(&raw))
			.unwrap_or_default();

		Self {
			is_debug: mode.is_debug(cfg!(debug_assertions)),
			locale,
			os_name: os_display_name(std::env::consts::OS).to_string(),
			os_version: String::new(),
			app_version: String::new(),
			app_build_number: String::new(),
			device_model: std::env::consts::ARCH.to_string(),
		}
	}

	pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
		self.os_version = version.into();
		self
	}

	pub fn with_app_version(
		mut self,
		version: impl Into<String>,
		build_number: impl Into<String>,
	) -> Self {
		self.app_version = version.into();
		self.app_build_number = build_number.into();
		self
	}

	pub fn with_device_model(mut self, model: impl Into<String>) -> Self {
		self.device_model = model.into();
		self
	}

	/// Value of the `User-Agent` header: `{os_name}/{os_version} {locale}`.
	pub fn user_agent(&self) -> String {
		format!("{}/{} {}", self.os_name, self.os_version, self.locale)
	}
}

/// Extracts the language code from a POSIX locale such as `en_US.UTF-8`.
fn language_code(raw: &str) -> Option<String> {
	let lang = raw.split(['_', '.', '@', '-']).next()?.trim();
	if lang.is_empty() || lang == "C" || lang == "POSIX" {
		return None;
	}
	Some(lang.to_ascii_lowercase())
}

fn os_display_name(os: &str) -> &str {
	match os {
		"macos" => "macOS",
		"ios" => "iOS",
		"linux" => "Linux",
		"windows" => "Windows",
		"android" => "Android",
		"freebsd" => "FreeBSD",
		other => other,
	}
}
