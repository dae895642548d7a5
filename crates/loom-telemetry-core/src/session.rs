// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session identity and inactivity-based rotation.
//!
//! A session groups the events a user produces in one sitting. The id is
//! regenerated once more than [`SESSION_TIMEOUT`] has passed since the last
//! event was stamped.

use std::time::{Duration, Instant};

use chrono::Utc;

/// Inactivity gap after which a new session starts.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Upper bound (inclusive) of the random suffix of a session id.
const SESSION_RANDOM_MAX: u64 = 99_999_999;
const SESSION_EPOCH_MULTIPLIER: u64 = 100_000_000;

/// Generates a session id for the current wall-clock second.
pub fn new_session_id() -> String {
	let epoch_secs = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
	session_id_at(epoch_secs, fastrand::u64(0..=SESSION_RANDOM_MAX))
}

/// `epoch_secs * 10^8 + random`, in decimal. Ids from later seconds always
/// sort after ids from earlier ones.
pub fn session_id_at(epoch_secs: u64, random: u64) -> String {
	let random = random.min(SESSION_RANDOM_MAX);
	(epoch_secs * SESSION_EPOCH_MULTIPLIER + random).to_string()
}

/// Tracks the active session for one client.
#[derive(Debug)]
pub struct SessionManager {
	session_id: String,
	last_touched: Instant,
	timeout: Duration,
}

impl SessionManager {
	/// Starts a fresh session touched at `now`.
	pub fn new(now: Instant) -> Self {
		Self::with_timeout(now, SESSION_TIMEOUT)
	}

	pub fn with_timeout(now: Instant, timeout: Duration) -> Self {
		Self {
			session_id: new_session_id(),
			last_touched: now,
			timeout,
		}
	}

	/// Returns the session id for an event created at `now`, rotating first if
	/// the session has been idle for longer than the timeout.
	pub fn stamp(&mut self, now: Instant) -> String {
		if now.saturating_duration_since(self.last_touched) > self.timeout {
			let previous = std::mem::replace(&mut self.session_id, new_session_id());
			tracing::debug!(
				previous_session_id = %previous,
				session_id = %self.session_id,
				"Session expired, started a new one"
			);
		}
		self.last_touched = now;
		self.session_id.clone()
	}

	/// The current session id without touching the session.
	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	pub fn last_touched(&self) -> Instant {
		self.last_touched
	}
}
