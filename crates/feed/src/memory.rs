// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

use carewire_core::{ChangeEvent, ChangeFeed, ChangeSink, ChannelKey, FeedChannelId, Result};
use parking_lot::Mutex;
use tracing::{debug, trace};

struct OpenChannel {
	key: ChannelKey,
	sink: ChangeSink,
}

/// In-process change feed.
///
/// Events handed to [`MemoryFeed::publish`] are routed to every open channel
/// whose key matches, the way the backend would route them.
pub struct MemoryFeed {
	channels: Mutex<BTreeMap<FeedChannelId, OpenChannel>>,
	next_id: AtomicU64,
	opened: AtomicUsize,
	closed: AtomicUsize,
}

impl MemoryFeed {
	pub fn new() -> Self {
		Self {
			channels: Mutex::new(BTreeMap::new()),
			next_id: AtomicU64::new(1),
			opened: AtomicUsize::new(0),
			closed: AtomicUsize::new(0),
		}
	}

	/// Number of `open` calls so far.
	pub fn open_count(&self) -> usize {
		self.opened.load(Ordering::SeqCst)
	}

	/// Number of `close` calls that closed an open channel.
	pub fn close_count(&self) -> usize {
		self.closed.load(Ordering::SeqCst)
	}

	pub fn open_channels(&self) -> Vec<(FeedChannelId, ChannelKey)> {
		self.channels.lock().iter().map(|(id, channel)| (*id, channel.key.clone())).collect()
	}

	pub fn is_open(&self, id: FeedChannelId) -> bool {
		self.channels.lock().contains_key(&id)
	}

	/// Route `event` to every matching open channel. Returns the number of
	/// channels it was delivered to.
	pub fn publish(&self, event: ChangeEvent) -> usize {
		let sinks: Vec<ChangeSink> = self
			.channels
			.lock()
			.values()
			.filter(|channel| channel.key.matches(&event))
			.map(|channel| channel.sink.clone())
			.collect();

		trace!(table = %event.table, kind = %event.event_type, channels = sinks.len(), "publish");

		for sink in &sinks {
			sink(event.clone());
		}
		sinks.len()
	}
}

impl Default for MemoryFeed {
	fn default() -> Self {
		Self::new()
	}
}

impl ChangeFeed for MemoryFeed {
	fn open(&self, key: &ChannelKey, sink: ChangeSink) -> Result<FeedChannelId> {
		let id = FeedChannelId(self.next_id.fetch_add(1, Ordering::SeqCst));
		self.channels.lock().insert(
			id,
			OpenChannel {
				key: key.clone(),
				sink,
			},
		);
		self.opened.fetch_add(1, Ordering::SeqCst);
		debug!(channel = %id, key = %key, "memory feed opened channel");
		Ok(id)
	}

	fn close(&self, channel: FeedChannelId) -> Result<()> {
		if self.channels.lock().remove(&channel).is_some() {
			self.closed.fetch_add(1, Ordering::SeqCst);
			debug!(channel = %channel, "memory feed closed channel");
		}
		Ok(())
	}
}
