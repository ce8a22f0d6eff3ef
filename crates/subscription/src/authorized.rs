// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use carewire_auth::Session;
use carewire_core::{ChangeEvent, Result, SubscriptionConfig};
use tracing::debug;

use crate::{Subscription, SubscriptionRegistry};

impl SubscriptionRegistry {
	/// Subscribe on behalf of a verified session.
	///
	/// The session's expiry and the registry's access policy are checked on
	/// every call.
	pub fn subscribe_as<F>(&self, session: &Session, config: &SubscriptionConfig, callback: F) -> Result<Subscription>
	where
		F: Fn(&ChangeEvent) + Send + Sync + 'static,
	{
		self.inner.policy.authorize(session, config)?;
		debug!(user = session.user_id(), role = %session.role(), table = %config.table, "authorized subscription");
		self.subscribe(config, callback)
	}
}
