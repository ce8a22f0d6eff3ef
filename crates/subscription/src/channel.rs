// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	OnceLock,
	atomic::{AtomicBool, Ordering},
};

use carewire_core::{ChangeEvent, ChannelKey, FeedChannelId};
use parking_lot::RwLock;
use tracing::trace;

use crate::{Callback, SubscriptionId};

pub(crate) struct Subscriber {
	pub(crate) id: SubscriptionId,
	pub(crate) callback: Callback,
}

/// One open backend channel and the callbacks attached to it.
pub(crate) struct Channel {
	pub(crate) key: ChannelKey,
	/// Distinguishes this channel from earlier and later channels for the
	/// same key.
	pub(crate) generation: u64,
	pub(crate) feed_channel: OnceLock<FeedChannelId>,
	subscribers: RwLock<Vec<Subscriber>>,
	open: AtomicBool,
}

impl Channel {
	pub(crate) fn new(key: ChannelKey, generation: u64) -> Self {
		Self {
			key,
			generation,
			feed_channel: OnceLock::new(),
			subscribers: RwLock::new(Vec::new()),
			open: AtomicBool::new(true),
		}
	}

	pub(crate) fn attach(&self, subscriber: Subscriber) {
		self.subscribers.write().push(subscriber);
	}

	pub(crate) fn detach(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.subscribers.write();
		let before = subscribers.len();
		subscribers.retain(|subscriber| subscriber.id != id);
		subscribers.len() != before
	}

	pub(crate) fn len(&self) -> usize {
		self.subscribers.read().len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.subscribers.read().is_empty()
	}

	pub(crate) fn mark_closed(&self) {
		self.open.store(false, Ordering::Release);
	}

	/// Invoke every callback with `event`. Callbacks run without any lock
	/// held, so they may subscribe and unsubscribe.
	pub(crate) fn dispatch(&self, event: &ChangeEvent) {
		if !self.open.load(Ordering::Acquire) {
			trace!(key = %self.key, "dropping event for closed channel");
			return;
		}

		let callbacks: Vec<Callback> =
			self.subscribers.read().iter().map(|subscriber| subscriber.callback.clone()).collect();
		for callback in callbacks {
			callback(event);
		}
	}
}
