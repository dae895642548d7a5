// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory event queue and batched delivery.
//!
//! The queue lives behind a single mutex that is only held to push events or
//! to cut a batch off the head. Network sends happen with the lock released,
//! and because a batch is removed atomically, two overlapping flushes never
//! send the same event.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use loom_telemetry_core::Event;
use tracing::{debug, error, warn};

use crate::transport::EventTransport;

/// Maximum number of events sent in one request.
pub const MAX_BATCH_SIZE: usize = 25;

/// Outcome of one [`Dispatcher::flush`] call, counted in events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
	/// Number of requests issued.
	pub batches: usize,
	/// Events accepted by the server.
	pub sent: usize,
	/// Events discarded after a terminal failure.
	pub dropped: usize,
	/// Events put back on the queue after a retryable failure.
	pub retained: usize,
}

impl FlushSummary {
	/// Returns true if the flush issued no requests.
	pub fn is_empty(&self) -> bool {
		self.batches == 0
	}
}

/// Owns the event queue and delivers it in batches.
pub struct Dispatcher {
	queue: Mutex<VecDeque<Event>>,
	transport: Arc<dyn EventTransport>,
	max_batch_size: usize,
}

impl Dispatcher {
	pub fn new(transport: Arc<dyn EventTransport>) -> Self {
		Self::with_batch_size(transport, MAX_BATCH_SIZE)
	}

	pub fn with_batch_size(transport: Arc<dyn EventTransport>, max_batch_size: usize) -> Self {
		Self {
			queue: Mutex::new(VecDeque::new()),
			transport,
			max_batch_size: max_batch_size.max(1),
		}
	}

	/// Appends an event to the tail of the queue.
	pub fn enqueue(&self, event: Event) {
		self.queue().push_back(event);
	}

	/// Appends several events, preserving their order.
	pub fn enqueue_all(&self, events: impl IntoIterator<Item = Event>) {
		self.queue().extend(events);
	}

	/// Returns the number of events waiting to be sent.
	pub fn queue_len(&self) -> usize {
		self.queue().len()
	}

	/// Returns the maximum number of events per request.
	pub fn max_batch_size(&self) -> usize {
		self.max_batch_size
	}

	/// Drains the queue in batches of at most `max_batch_size` events.
	///
	/// Every batch gets exactly one attempt. Accepted batches and batches the
	/// server rejected (3xx/4xx) leave the queue for good; batches that failed
	/// with a retryable error are appended to the tail once the drain is over,
	/// after any events enqueued while the flush was running.
	pub async fn flush(&self) -> FlushSummary {
		let mut summary = FlushSummary::default();
		let mut failed: Vec<Event> = Vec::new();

		while let Some(batch) = self.take_batch() {
			summary.batches += 1;
			let count = batch.len();

			match self.transport.send(&batch).await {
				Ok(()) => {
					summary.sent += count;
				}
				Err(e) if e.is_retryable() => {
					error!(error = %e, count, "Failed to send events, will retry on next flush");
					summary.retained += count;
					failed.extend(batch);
				}
				Err(e) => {
					warn!(error = %e, count, "Failed to send events, will not retry");
					summary.dropped += count;
				}
			}
		}

		if !failed.is_empty() {
			self.enqueue_all(failed);
		}

		if !summary.is_empty() {
			debug!(
				batches = summary.batches,
				sent = summary.sent,
				dropped = summary.dropped,
				retained = summary.retained,
				"Flushed event queue"
			);
		}

		summary
	}

	fn take_batch(&self) -> Option<Vec<Event>> {
		let mut queue = self.queue();
		let count = queue.len().min(self.max_batch_size);
		if count == 0 {
			return None;
		}
		Some(queue.drain(..count).collect())
	}

	// A panic while holding the lock cannot leave the deque half-updated.
	fn queue(&self) -> MutexGuard<'_, VecDeque<Event>> {
		self.queue.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
