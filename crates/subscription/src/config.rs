// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use carewire_auth::AccessPolicy;

/// When a shared channel is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Teardown {
	/// Close when the last subscriber leaves.
	#[default]
	LastSubscriber,
	/// Close on any unsubscribe, leaving the remaining subscribers without
	/// events. Reproduces the behavior of earlier clients.
	AnyUnsubscribe,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
	pub teardown: Teardown,
	/// Consulted by [`crate::SubscriptionRegistry::subscribe_as`].
	pub access_policy: AccessPolicy,
}

impl RegistryConfig {
	pub fn teardown(mut self, teardown: Teardown) -> Self {
		self.teardown = teardown;
		self
	}

	pub fn access_policy(mut self, policy: AccessPolicy) -> Self {
		self.access_policy = policy;
		self
	}
}
