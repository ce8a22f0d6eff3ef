// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use carewire_core::{ChangeEvent, ChangeKind, Result, Row, SubscriptionConfig, Table};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::{Subscription, SubscriptionRegistry};

/// A change event whose row was decoded into `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedChange<T> {
	pub event_type: ChangeKind,
	pub table: Table,
	/// The new row, or the old row for deletes.
	pub row: T,
	/// The previous row when the backend sent a complete one.
	pub old: Option<T>,
	pub commit_timestamp: Option<String>,
}

impl<T: DeserializeOwned> TypedChange<T> {
	/// Decode the row of `event`. Returns `None` when the event carries no row
	/// or the row does not decode into `T`.
	pub fn decode(event: &ChangeEvent) -> Option<Self> {
		let Some(row) = event.row() else {
			warn!(table = %event.table, kind = %event.event_type, "change event without a row");
			return None;
		};

		let row = match decode_row::<T>(row) {
			Ok(row) => row,
			Err(err) => {
				warn!(table = %event.table, kind = %event.event_type, "skipping undecodable row: {}", err);
				return None;
			}
		};

		let old = match event.event_type {
			ChangeKind::Delete => None,
			ChangeKind::Insert | ChangeKind::Update => {
				event.old.as_ref().and_then(|old| decode_row::<T>(old).ok())
			}
		};

		Some(Self {
			event_type: event.event_type,
			table: event.table,
			row,
			old,
			commit_timestamp: event.commit_timestamp.clone(),
		})
	}
}

fn decode_row<T: DeserializeOwned>(row: &Row) -> serde_json::Result<T> {
	serde_json::from_value(Value::Object(row.clone()))
}

impl SubscriptionRegistry {
	/// Like [`SubscriptionRegistry::subscribe`], with rows decoded into `T`.
	///
	/// Events whose row fails to decode are logged and skipped.
	pub fn subscribe_typed<T, F>(&self, config: &SubscriptionConfig, callback: F) -> Result<Subscription>
	where
		T: DeserializeOwned + 'static,
		F: Fn(TypedChange<T>) + Send + Sync + 'static,
	{
		self.subscribe(config, move |event| {
			if let Some(change) = TypedChange::<T>::decode(event) {
				callback(change);
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use serde::Deserialize;
	use serde_json::json;

	use super::*;

	#[derive(Debug, Clone, PartialEq, Deserialize)]
	struct Task {
		id: i64,
		user_id: String,
		title: String,
	}

	fn row(value: Value) -> Row {
		value.as_object().cloned().unwrap()
	}

	#[test]
	fn test_decode_insert() {
		let event = ChangeEvent::insert(Table::Tasks, row(json!({"id": 1, "user_id": "A", "title": "Mop floor 2"})));
		let change = TypedChange::<Task>::decode(&event).unwrap();
		assert_eq!(
			change.row,
			Task {
				id: 1,
				user_id: "A".to_string(),
				title: "Mop floor 2".to_string()
			}
		);
		assert_eq!(change.old, None);
	}

	#[test]
	fn test_partial_old_row_is_dropped() {
		let event = ChangeEvent::update(
			Table::Tasks,
			row(json!({"id": 1, "user_id": "A", "title": "new"})),
			Some(row(json!({"id": 1}))),
		);
		let change = TypedChange::<Task>::decode(&event).unwrap();
		assert_eq!(change.row.title, "new");
		assert_eq!(change.old, None);
	}

	#[test]
	fn test_delete_decodes_old_row() {
		let event = ChangeEvent::delete(Table::Tasks, row(json!({"id": 5, "user_id": "B", "title": "gone"})));
		let change = TypedChange::<Task>::decode(&event).unwrap();
		assert_eq!(change.row.id, 5);
	}

	#[test]
	fn test_undecodable_row() {
		let event = ChangeEvent::insert(Table::Tasks, row(json!({"id": "not a number"})));
		assert!(TypedChange::<Task>::decode(&event).is_none());
	}
}
