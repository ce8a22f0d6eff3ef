// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Debug, Formatter},
	sync::{
		Weak,
		atomic::{AtomicBool, Ordering},
	},
};

use carewire_core::ChannelKey;

use crate::{SubscriptionId, registry::RegistryInner};

/// Handle of one subscription. Dropping it unsubscribes.
pub struct Subscription {
	registry: Weak<RegistryInner>,
	key: ChannelKey,
	generation: u64,
	id: SubscriptionId,
	active: AtomicBool,
}

impl Subscription {
	pub(crate) fn new(registry: Weak<RegistryInner>, key: ChannelKey, generation: u64, id: SubscriptionId) -> Self {
		Self {
			registry,
			key,
			generation,
			id,
			active: AtomicBool::new(true),
		}
	}

	pub fn id(&self) -> SubscriptionId {
		self.id
	}

	pub fn key(&self) -> &ChannelKey {
		&self.key
	}

	/// Whether [`Subscription::unsubscribe`] has not been called yet.
	///
	/// A subscription can be active while its channel is already gone, e.g.
	/// after the registry shut down.
	pub fn is_active(&self) -> bool {
		self.active.load(Ordering::SeqCst)
	}

	/// Stop receiving events. Calling it again has no effect.
	pub fn unsubscribe(&self) {
		if !self.active.swap(false, Ordering::SeqCst) {
			return;
		}
		if let Some(registry) = self.registry.upgrade() {
			registry.detach(&self.key, self.generation, self.id);
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}

impl Debug for Subscription {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("key", &self.key.to_string())
			.field("generation", &self.generation)
			.field("active", &self.is_active())
			.finish()
	}
}
