// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
	DEFAULT_SCHEMA,
	interface::{ChangeKind, Table},
};

/// A row as delivered by the change feed.
pub type Row = Map<String, Value>;

/// An immutable row change pushed by the change feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
	pub event_type: ChangeKind,
	pub schema: String,
	pub table: Table,
	/// Row after the change. `None` for deletes.
	pub new: Option<Row>,
	/// Row before the change, when the backend sends it.
	pub old: Option<Row>,
	pub commit_timestamp: Option<String>,
}

impl ChangeEvent {
	pub fn insert(table: Table, row: Row) -> Self {
		Self::new(ChangeKind::Insert, table, Some(row), None)
	}

	pub fn update(table: Table, new: Row, old: Option<Row>) -> Self {
		Self::new(ChangeKind::Update, table, Some(new), old)
	}

	pub fn delete(table: Table, old: Row) -> Self {
		Self::new(ChangeKind::Delete, table, None, Some(old))
	}

	fn new(event_type: ChangeKind, table: Table, new: Option<Row>, old: Option<Row>) -> Self {
		Self {
			event_type,
			schema: DEFAULT_SCHEMA.to_string(),
			table,
			new,
			old,
			commit_timestamp: None,
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = schema.into();
		self
	}

	pub fn with_commit_timestamp(mut self, timestamp: impl Into<String>) -> Self {
		self.commit_timestamp = Some(timestamp.into());
		self
	}

	/// The row a filter is evaluated against: `new`, or `old` for deletes.
	pub fn row(&self) -> Option<&Row> {
		match self.event_type {
			ChangeKind::Delete => self.old.as_ref(),
			ChangeKind::Insert | ChangeKind::Update => self.new.as_ref().or(self.old.as_ref()),
		}
	}
}
