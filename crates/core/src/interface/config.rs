// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use crate::{
	DEFAULT_SCHEMA,
	error::CoreError,
	interface::{ChannelKey, EventKind, Filter, Table},
};

/// What a caller wants to watch.
///
/// `event` defaults to any event, `filter` to no filter and `schema` to
/// `public`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
	pub table: Table,
	#[serde(default)]
	pub event: EventKind,
	#[serde(default)]
	pub filter: Option<Filter>,
	#[serde(default = "default_schema")]
	pub schema: String,
}

fn default_schema() -> String {
	DEFAULT_SCHEMA.to_string()
}

impl SubscriptionConfig {
	pub fn new(table: Table) -> Self {
		Self {
			table,
			event: EventKind::All,
			filter: None,
			schema: default_schema(),
		}
	}

	pub fn event(mut self, event: EventKind) -> Self {
		self.event = event;
		self
	}

	pub fn filter(mut self, filter: Filter) -> Self {
		self.filter = Some(filter);
		self
	}

	pub fn schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = schema.into();
		self
	}

	/// Build a config from its textual parts, as they arrive from a caller
	/// that only has strings (command line, JSON settings).
	pub fn parse(
		table: &str,
		event: Option<&str>,
		filter: Option<&str>,
		schema: Option<&str>,
	) -> Result<Self, CoreError> {
		let mut config = SubscriptionConfig::new(table.parse()?);
		if let Some(event) = event {
			config.event = event.parse()?;
		}
		config.filter = Filter::parse_optional(filter)?;
		if let Some(schema) = schema.map(str::trim).filter(|s| !s.is_empty()) {
			config.schema = schema.to_string();
		}
		Ok(config)
	}

	pub fn key(&self) -> ChannelKey {
		ChannelKey {
			schema: self.schema.clone(),
			table: self.table,
			event: self.event,
			filter: self.filter.clone(),
		}
	}
}

impl From<&SubscriptionConfig> for ChannelKey {
	fn from(config: &SubscriptionConfig) -> Self {
		config.key()
	}
}
