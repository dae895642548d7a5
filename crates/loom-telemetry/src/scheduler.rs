// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Periodic flushing driven by the host's foreground/background lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dispatcher::{Dispatcher, FlushSummary};

struct ActiveTimer {
	token: CancellationToken,
	handle: JoinHandle<()>,
}

/// Two-state scheduler: idle, or polling with exactly one recurring timer.
pub struct FlushScheduler {
	dispatcher: Arc<Dispatcher>,
	interval: Duration,
	runtime: Handle,
	timer: Mutex<Option<ActiveTimer>>,
	ticks: Arc<AtomicU64>,
}

impl FlushScheduler {
	pub fn new(dispatcher: Arc<Dispatcher>, interval: Duration, runtime: Handle) -> Self {
		Self {
			dispatcher,
			interval,
			runtime,
			timer: Mutex::new(None),
			ticks: Arc::new(AtomicU64::new(0)),
		}
	}

	/// Starts flushing once per interval, replacing any running timer.
	///
	/// The first flush happens one full interval after this call.
	pub fn start_polling(&self) {
		let token = CancellationToken::new();
		let handle = self.runtime.spawn(run_ticks(
			Arc::clone(&self.dispatcher),
			self.interval,
			token.clone(),
			Arc::clone(&self.ticks),
		));

		let previous = self.timer().replace(ActiveTimer { token, handle });
		if let Some(previous) = previous {
			previous.token.cancel();
		}

		info!(
			flush_interval_ms = self.interval.as_millis() as u64,
			"Started polling for event flushes"
		);
	}

	/// Cancels the timer, if any, then flushes once and waits for it.
	pub async fn stop_polling(&self) -> FlushSummary {
		let previous = self.timer().take();
		if let Some(previous) = previous {
			previous.token.cancel();
			info!("Stopped polling for event flushes");
		}

		self.dispatcher.flush().await
	}

	/// Returns true while a timer is active.
	pub fn is_polling(&self) -> bool {
		self
			.timer()
			.as_ref()
			.is_some_and(|timer| !timer.handle.is_finished())
	}

	/// Number of timer ticks that triggered a flush since creation.
	pub fn tick_count(&self) -> u64 {
		self.ticks.load(Ordering::SeqCst)
	}

	/// Returns the time between scheduled flushes.
	pub fn interval(&self) -> Duration {
		self.interval
	}

	fn timer(&self) -> MutexGuard<'_, Option<ActiveTimer>> {
		self.timer.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Drop for FlushScheduler {
	fn drop(&mut self) {
		if let Some(timer) = self.timer().take() {
			timer.token.cancel();
		}
	}
}

async fn run_ticks(
	dispatcher: Arc<Dispatcher>,
	interval: Duration,
	token: CancellationToken,
	ticks: Arc<AtomicU64>,
) {
	loop {
		tokio::select! {
			biased;

			_ = token.cancelled() => break,

			_ = tokio::time::sleep(interval) => {
				// A tick that lost the race against cancellation does nothing.
				if token.is_cancelled() {
					break;
				}
				ticks.fetch_add(1, Ordering::SeqCst);
				dispatcher.flush().await;
			}
		}
	}

	debug!("Flush timer stopped");
}
