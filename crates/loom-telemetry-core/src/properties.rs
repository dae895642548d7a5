// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helper for building event properties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::EventValue;

/// A builder for the custom properties attached to an event.
///
/// # Example
///
/// ```
/// use loom_telemetry_core::Properties;
///
/// let props = Properties::new()
///     .insert("screen", "Settings")
///     .insert("count", 42)
///     .insert("ratio", 0.75)
///     .insert("is_premium", true);
/// assert_eq!(props.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
	inner: BTreeMap<String, EventValue>,
}

impl Properties {
	/// Creates a new empty Properties builder.
	pub fn new() -> Self {
		Self {
			inner: BTreeMap::new(),
		}
	}

	/// Inserts a key-value pair. A later insert for the same key wins.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<EventValue>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Merges another Properties into this one.
	///
	/// If both contain the same key, the value from `other` takes precedence.
	pub fn merge(mut self, other: Properties) -> Self {
		self.inner.extend(other.inner);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&EventValue> {
		self.inner.get(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &EventValue)> {
		self.inner.iter()
	}
}

impl<K, V> FromIterator<(K, V)> for Properties
where
	K: Into<String>,
	V: Into<EventValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			inner: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl From<Properties> for serde_json::Value {
	fn from(props: Properties) -> Self {
		serde_json::Value::Object(
			props
				.inner
				.into_iter()
				.map(|(k, v)| (k, serde_json::Value::from(v)))
				.collect(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_properties_new_is_empty() {
		let props = Properties::new();
		assert!(props.is_empty());
		assert_eq!(props.len(), 0);
	}

	#[test]
	fn test_properties_insert_mixed_kinds() {
		let props = Properties::new()
			.insert("name", "Settings")
			.insert("count", 42)
			.insert("active", true);

		assert_eq!(props.len(), 3);
		assert_eq!(props.get("name"), Some(&EventValue::String("Settings".into())));
		assert_eq!(props.get("count"), Some(&EventValue::Integer(42)));
		assert_eq!(props.get("active"), Some(&EventValue::Boolean(true)));
	}

	#[test]
	fn test_properties_merge() {
		let props1 = Properties::new().insert("a", 1).insert("b", 2);
		let props2 = Properties::new().insert("b", 20).insert("c", 3);

		let merged = props1.merge(props2);

		assert_eq!(merged.len(), 3);
		assert_eq!(merged.get("a"), Some(&EventValue::Integer(1)));
		assert_eq!(merged.get("b"), Some(&EventValue::Integer(20)));
		assert_eq!(merged.get("c"), Some(&EventValue::Integer(3)));
	}

	#[test]
	fn test_properties_serialize_as_flat_object() {
		let props = Properties::new().insert("screen", "Home").insert("count", 3);
		let encoded = serde_json::to_value(&props).unwrap();
		assert_eq!(encoded, json!({"screen": "Home", "count": 3}));
	}

	#[test]
	fn test_properties_from_iterator() {
		let props: Properties = vec![("a", 1), ("b", 2)].into_iter().collect();
		assert_eq!(props.len(), 2);
		assert_eq!(props.get("b"), Some(&EventValue::Integer(2)));
	}

	#[test]
	fn test_properties_into_json_value() {
		let value = serde_json::Value::from(Properties::new().insert("ok", false));
		assert_eq!(value, json!({"ok": false}));
	}

	proptest! {
		#[test]
		fn properties_len_matches_unique_keys(keys in proptest::collection::vec("[a-z]{1,10}", 0..20)) {
			let unique_keys: std::collections::HashSet<_> = keys.iter().cloned().collect();
			let mut props = Properties::new();
			for key in &keys {
				props = props.insert(key.clone(), "value");
			}
			prop_assert_eq!(props.len(), unique_keys.len());
		}

		#[test]
		fn properties_survive_json(key in "[a-z]{1,20}", value in "[a-zA-Z0-9]{1,50}", n: i64) {
			let props = Properties::new().insert(key.clone(), value.clone()).insert("n", n);
			let encoded = serde_json::to_string(&props).unwrap();
			let decoded: Properties = serde_json::from_str(&encoded).unwrap();
			prop_assert_eq!(decoded, props);
		}
	}
}
