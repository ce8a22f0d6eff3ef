// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicU64, Ordering},
};

use carewire_auth::AccessPolicy;
use carewire_core::{ChangeEvent, ChangeFeed, ChangeSink, ChannelKey, Result, SubscriptionConfig};
use dashmap::{DashMap, mapref::entry::Entry};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
	RegistryConfig, Subscription, SubscriptionError, Teardown,
	channel::{Channel, Subscriber},
};

/// Unique identifier of one subscription.
pub type SubscriptionId = Uuid;

/// Callback invoked for every change event on a subscribed channel.
pub type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

pub(crate) struct RegistryInner {
	feed: Arc<dyn ChangeFeed>,
	pub(crate) teardown: Teardown,
	pub(crate) policy: AccessPolicy,
	/// key → open channel. At most one channel per key.
	channels: DashMap<ChannelKey, Arc<Channel>>,
	next_generation: AtomicU64,
	closed: AtomicBool,
}

/// Deduplicating registry of change subscriptions.
///
/// Cloning yields another handle to the same registry. Channels stay open
/// until their subscribers leave or [`SubscriptionRegistry::shutdown`] is
/// called; dropping the last registry handle also closes them.
#[derive(Clone)]
pub struct SubscriptionRegistry {
	pub(crate) inner: Arc<RegistryInner>,
}

impl SubscriptionRegistry {
	pub fn new(feed: Arc<dyn ChangeFeed>) -> Self {
		Self::with_config(feed, RegistryConfig::default())
	}

	pub fn with_config(feed: Arc<dyn ChangeFeed>, config: RegistryConfig) -> Self {
		Self {
			inner: Arc::new(RegistryInner {
				feed,
				teardown: config.teardown,
				policy: config.access_policy,
				channels: DashMap::new(),
				next_generation: AtomicU64::new(1),
				closed: AtomicBool::new(false),
			}),
		}
	}

	/// Subscribe `callback` to the channel described by `config`, opening the
	/// channel if no other subscriber holds it.
	///
	/// The subscription lasts until the returned handle is unsubscribed or
	/// dropped.
	pub fn subscribe<F>(&self, config: &SubscriptionConfig, callback: F) -> Result<Subscription>
	where
		F: Fn(&ChangeEvent) + Send + Sync + 'static,
	{
		self.attach(config.key(), Arc::new(callback))
	}

	fn attach(&self, key: ChannelKey, callback: Callback) -> Result<Subscription> {
		let inner = &self.inner;
		if inner.closed.load(Ordering::SeqCst) {
			return Err(SubscriptionError::Closed.into());
		}

		let id = Uuid::now_v7();
		let subscriber = Subscriber {
			id,
			callback,
		};

		let generation = match inner.channels.entry(key.clone()) {
			Entry::Occupied(entry) => {
				let channel = entry.get();
				channel.attach(subscriber);
				debug!(key = %key, subscription = %id, subscribers = channel.len(), "joined open channel");
				channel.generation
			}
			Entry::Vacant(entry) => {
				let generation = inner.next_generation.fetch_add(1, Ordering::SeqCst);
				let channel = Arc::new(Channel::new(key.clone(), generation));
				channel.attach(subscriber);

				let target = Arc::downgrade(&channel);
				let sink: ChangeSink = Arc::new(move |event| {
					if let Some(channel) = target.upgrade() {
						channel.dispatch(&event);
					}
				});

				let feed_channel = inner.feed.open(&key, sink).map_err(|err| SubscriptionError::OpenFailed {
					key: key.to_string(),
					cause: err.diagnostic(),
				})?;
				let _ = channel.feed_channel.set(feed_channel);
				entry.insert(channel);

				debug!(key = %key, subscription = %id, channel = %feed_channel, "opened channel");
				generation
			}
		};

		if inner.closed.load(Ordering::SeqCst) {
			inner.close_all();
			return Err(SubscriptionError::Closed.into());
		}

		Ok(Subscription::new(Arc::downgrade(inner), key, generation, id))
	}

	/// Close every channel. Subscribing afterwards fails and outstanding
	/// handles become no-ops.
	pub fn shutdown(&self) {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return;
		}
		let closed = self.inner.close_all();
		info!(channels = closed, "subscription registry shut down");
	}

	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}

	/// Number of open channels.
	pub fn channel_count(&self) -> usize {
		self.inner.channels.len()
	}

	/// Number of subscribers attached to the channel for `key`.
	pub fn subscriber_count(&self, key: &ChannelKey) -> usize {
		self.inner.channels.get(key).map(|channel| channel.len()).unwrap_or(0)
	}

	pub fn contains(&self, key: &ChannelKey) -> bool {
		self.inner.channels.contains_key(key)
	}

	pub fn keys(&self) -> Vec<ChannelKey> {
		self.inner.channels.iter().map(|entry| entry.key().clone()).collect()
	}
}

impl RegistryInner {
	/// Remove subscription `id` from the channel of `key`, closing the channel
	/// when the teardown policy says so. Does nothing when the channel of
	/// that key is gone or belongs to a newer generation.
	pub(crate) fn detach(&self, key: &ChannelKey, generation: u64, id: SubscriptionId) {
		let teardown = self.teardown;
		let removed = self.channels.remove_if(key, |_, channel| {
			if channel.generation != generation {
				return false;
			}
			match teardown {
				Teardown::AnyUnsubscribe => true,
				Teardown::LastSubscriber => {
					channel.detach(id);
					channel.is_empty()
				}
			}
		});

		match removed {
			Some((_, channel)) => {
				debug!(key = %key, subscription = %id, "unsubscribed, closing channel");
				if teardown == Teardown::AnyUnsubscribe {
					let orphaned = channel.len().saturating_sub(1);
					if orphaned > 0 {
						warn!(key = %key, orphaned, "channel closed with subscribers still attached");
					}
				}
				self.close(&channel);
			}
			None => debug!(key = %key, subscription = %id, "unsubscribed"),
		}
	}

	fn close(&self, channel: &Channel) {
		channel.mark_closed();
		if let Some(id) = channel.feed_channel.get() {
			if let Err(err) = self.feed.close(*id) {
				warn!(key = %channel.key, channel = %id, "failed to close feed channel: {}", err);
			}
		}
	}

	fn close_all(&self) -> usize {
		let keys: Vec<ChannelKey> = self.channels.iter().map(|entry| entry.key().clone()).collect();
		let mut closed = 0;
		for key in keys {
			if let Some((_, channel)) = self.channels.remove(&key) {
				self.close(&channel);
				closed += 1;
			}
		}
		closed
	}
}

impl Drop for RegistryInner {
	fn drop(&mut self) {
		let closed = self.close_all();
		if closed > 0 {
			debug!(channels = closed, "registry dropped with open channels");
		}
	}
}
