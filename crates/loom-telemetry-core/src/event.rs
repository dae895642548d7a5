// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event types as they travel over the wire.
//!
//! An [`Event`] is immutable once built. The JSON shape is fixed by the
//! collection endpoint: camelCase keys, a second-precision UTC timestamp and a
//! `props` object that is `null` when the caller supplied none.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::properties::Properties;

/// SDK identifier reported in every event's system properties.
pub const SDK_VERSION: &str = concat!("loom-telemetry@", env!("CARGO_PKG_VERSION"));

/// Wire format for event timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Snapshot of the host environment attached to each event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemProps {
	pub is_debug: bool,
	pub locale: String,
	pub os_name: String,
	pub os_version: String,
	pub app_version: String,
	pub app_build_number: String,
	pub sdk_version: String,
	pub device_model: String,
}

impl SystemProps {
	/// Builds the system properties for the given environment and SDK version.
	pub fn new(env: &Environment, sdk_version: impl Into<String>) -> Self {
		Self {
			is_debug: env.is_debug,
			locale: env.locale.clone(),
			os_name: env.os_name.clone(),
			os_version: env.os_version.clone(),
			app_version: env.app_version.clone(),
			app_build_number: env.app_build_number.clone(),
			sdk_version: sdk_version.into(),
			device_model: env.device_model.clone(),
		}
	}

	/// Builds the system properties with this crate's [`SDK_VERSION`].
	pub fn from_environment(env: &Environment) -> Self {
		Self::new(env, SDK_VERSION)
	}
}

/// A single telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
	#[serde(with = "wire_timestamp")]
	pub timestamp: DateTime<Utc>,
	pub session_id: String,
	pub event_name: String,
	pub system_props: SystemProps,
	pub props: Option<Properties>,
}

impl Event {
	/// Creates an event. The timestamp is truncated to whole seconds so the
	/// in-memory value matches what is sent.
	pub fn new(
		timestamp: DateTime<Utc>,
		session_id: impl Into<String>,
		event_name: impl Into<String>,
		system_props: SystemProps,
		props: Option<Properties>,
	) -> Self {
		Self {
			timestamp: timestamp.trunc_subsecs(0),
			session_id: session_id.into(),
			event_name: event_name.into(),
			system_props,
			props,
		}
	}
}

mod wire_timestamp {
	use chrono::{DateTime, NaiveDateTime, Utc};
	use serde::{Deserialize, Deserializer, Serializer};

	use super::TIMESTAMP_FORMAT;

	pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
			.map(|naive| naive.and_utc())
			.map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use serde_json::json;

	fn test_env() -> Environment {
		Environment {
			is_debug: true,
			locale: "en".to_string(),
			os_name: "iOS".to_string(),
			os_version: "17.0".to_string(),
			app_version: "1.0.0".to_string(),
			app_build_number: "1".to_string(),
			device_model: "iPhone16,2".to_string(),
		}
	}

	#[test]
	fn test_event_serializes_to_wire_shape() {
		let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
		let event = Event::new(
			timestamp,
			"170000000012345678",
			"screen_view",
			SystemProps::new(&test_env(), "loom-telemetry@0.0.0"),
			Some(Properties::new().insert("name", "Settings").insert("count", 42)),
		);

		let encoded = serde_json::to_value(&event).unwrap();
		assert_eq!(
			encoded,
			json!({
				"timestamp": "2024-03-09T07:05:01Z",
				"sessionId": "170000000012345678",
				"eventName": "screen_view",
				"systemProps": {
					"isDebug": true,
					"locale": "en",
					"osName": "iOS",
					"osVersion": "17.0",
					"appVersion": "1.0.0",
					"appBuildNumber": "1",
					"sdkVersion": "loom-telemetry@0.0.0",
					"deviceModel": "iPhone16,2"
				},
				"props": {"name": "Settings", "count": 42}
			})
		);
	}

	#[test]
	fn test_missing_props_serialize_as_null() {
		let event = Event::new(
			Utc::now(),
			"1",
			"app_started",
			SystemProps::from_environment(&test_env()),
			None,
		);
		let encoded = serde_json::to_value(&event).unwrap();
		assert!(encoded["props"].is_null());
	}

	#[test]
	fn test_timestamp_drops_subseconds() {
		let timestamp = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()
			+ chrono::Duration::milliseconds(999);
		let event = Event::new(
			timestamp,
			"1",
			"tick",
			SystemProps::from_environment(&test_env()),
			None,
		);
		let encoded = serde_json::to_value(&event).unwrap();
		assert_eq!(encoded["timestamp"], "2024-12-31T23:59:59Z");

		let decoded: Event = serde_json::from_value(encoded).unwrap();
		assert_eq!(decoded, event);
	}

	#[test]
	fn test_sdk_version_names_the_crate() {
		assert!(SDK_VERSION.starts_with("loom-telemetry@"));
		let props = SystemProps::from_environment(&test_env());
		assert_eq!(props.sdk_version, SDK_VERSION);
	}
}
