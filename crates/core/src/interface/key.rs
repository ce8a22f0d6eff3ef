// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::interface::{ChangeEvent, EventKind, Filter, Table};

/// Identity of one backend channel.
///
/// Two subscriptions with equal keys share the same channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
	pub schema: String,
	pub table: Table,
	pub event: EventKind,
	pub filter: Option<Filter>,
}

impl ChannelKey {
	/// Whether `event` belongs to the channel identified by this key.
	pub fn matches(&self, event: &ChangeEvent) -> bool {
		if self.schema != event.schema || self.table != event.table || !self.event.matches(event.event_type) {
			return false;
		}

		match &self.filter {
			None => true,
			Some(filter) => event.row().is_some_and(|row| filter.matches(row)),
		}
	}
}

impl Display for ChannelKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}:", self.schema, self.table, self.event)?;
		match &self.filter {
			Some(filter) => write!(f, "{}", filter),
			None => f.write_str("*"),
		}
	}
}
