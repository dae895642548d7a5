// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scalar values that can be attached to an event as properties.

use serde::{Deserialize, Serialize};

/// A single property value.
///
/// Each variant maps onto the matching JSON primitive. When decoding, integral
/// JSON numbers become [`EventValue::Integer`] and all other numbers become
/// [`EventValue::Double`]; [`EventValue::Float`] only exists on the encode side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
	Integer(i64),
	Double(f64),
	Boolean(bool),
	String(String),
	Float(f32),
}

impl EventValue {
	/// Returns the name of the JSON primitive this value encodes to.
	pub fn kind(&self) -> &'static str {
		match self {
			EventValue::Integer(_) | EventValue::Double(_) | EventValue::Float(_) => "number",
			EventValue::Boolean(_) => "boolean",
			EventValue::String(_) => "string",
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			EventValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			EventValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	/// Returns the value as `f64`. Integers beyond 2^53 lose precision.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			EventValue::Double(d) => Some(*d),
			EventValue::Float(f) => Some(f64::from(*f)),
			EventValue::Integer(i) => Some(*i as f64),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			EventValue::Boolean(b) => Some(*b),
			_ => None,
		}
	}
}

impl From<i64> for EventValue {
	fn from(value: i64) -> Self {
		EventValue::Integer(value)
	}
}

impl From<i32> for EventValue {
	fn from(value: i32) -> Self {
		EventValue::Integer(i64::from(value))
	}
}

impl From<u32> for EventValue {
	fn from(value: u32) -> Self {
		EventValue::Integer(i64::from(value))
	}
}

impl From<f64> for EventValue {
	fn from(value: f64) -> Self {
		EventValue::Double(value)
	}
}

impl From<f32> for EventValue {
	fn from(value: f32) -> Self {
		EventValue::Float(value)
	}
}

impl From<bool> for EventValue {
	fn from(value: bool) -> Self {
		EventValue::Boolean(value)
	}
}

impl From<&str> for EventValue {
	fn from(value: &str) -> Self {
		EventValue::String(value.to_string())
	}
}

impl From<String> for EventValue {
	fn from(value: String) -> Self {
		EventValue::String(value)
	}
}

impl From<EventValue> for serde_json::Value {
	fn from(value: EventValue) -> Self {
		match value {
			EventValue::Integer(i) => serde_json::Value::from(i),
			EventValue::Double(d) => serde_json::Value::from(d),
			EventValue::Float(f) => serde_json::Value::from(f),
			EventValue::Boolean(b) => serde_json::Value::Bool(b),
			EventValue::String(s) => serde_json::Value::String(s),
		}
	}
}
