// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Loom event telemetry client.
//!
//! This crate holds the data model shared by the runtime SDK
//! (`loom-telemetry`) and anything that needs to read or produce its wire
//! format. It performs no I/O.
//!
//! # Overview
//!
//! - [`Event`] and [`SystemProps`]: one immutable telemetry record and the
//!   environment snapshot stamped onto it
//! - [`EventValue`] and [`Properties`]: typed scalar properties
//! - [`SessionManager`]: session ids with inactivity rotation
//! - [`AppKey`] and [`Region`]: app key parsing and host routing
//! - [`Environment`] and [`TrackingMode`]: host description
//!
//! # Example
//!
//! ```
//! use loom_telemetry_core::{
//!     Environment, Event, Properties, SessionManager, SystemProps, TrackingMode,
//! };
//! use std::time::Instant;
//!
//! let env = Environment::detect(TrackingMode::Release).with_app_version("1.0.0", "1");
//! let mut sessions = SessionManager::new(Instant::now());
//!
//! let event = Event::new(
//!     chrono::Utc::now(),
//!     sessions.stamp(Instant::now()),
//!     "app_started",
//!     SystemProps::from_environment(&env),
//!     Some(Properties::new().insert("cold_start", true)),
//! );
//! assert_eq!(event.event_name, "app_started");
//! ```

pub mod app_key;
pub mod environment;
pub mod error;
pub mod event;
pub mod properties;
pub mod session;
pub mod value;

pub use app_key::{normalize_base_url, AppKey, Region};
pub use environment::{Environment, TrackingMode};
pub use error::{CoreError, Result};
pub use event::{Event, SystemProps, SDK_VERSION, TIMESTAMP_FORMAT};
pub use properties::Properties;
pub use session::{new_session_id, session_id_at, SessionManager, SESSION_TIMEOUT};
pub use value::EventValue;
