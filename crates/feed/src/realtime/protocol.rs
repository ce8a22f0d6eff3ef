// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Phoenix channel messages (JSON serializer, protocol version 1.0.0).

use carewire_core::{ChangeEvent, ChangeKind, ChannelKey, Row, Table};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::FeedError;

pub const PHOENIX_TOPIC: &str = "phoenix";

pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_LEAVE: &str = "phx_leave";
pub const EVENT_REPLY: &str = "phx_reply";
pub const EVENT_ERROR: &str = "phx_error";
pub const EVENT_CLOSE: &str = "phx_close";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_POSTGRES_CHANGES: &str = "postgres_changes";
pub const EVENT_SYSTEM: &str = "system";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
	pub topic: String,
	pub event: String,
	#[serde(default)]
	pub payload: Value,
	#[serde(rename = "ref", default)]
	pub reference: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub join_ref: Option<String>,
}

impl PhoenixMessage {
	pub fn join(topic: &str, key: &ChannelKey, access_token: Option<&str>, reference: String) -> Self {
		let mut binding = json!({
			"event": key.event.to_string(),
			"schema": key.schema,
			"table": key.table.name(),
		});
		if let Some(filter) = &key.filter {
			binding["filter"] = Value::String(filter.to_string());
		}

		let mut payload = json!({
			"config": {
				"broadcast": { "self": false },
				"presence": { "key": "" },
				"postgres_changes": [binding],
			}
		});
		if let Some(token) = access_token {
			payload["access_token"] = Value::String(token.to_string());
		}

		Self {
			topic: topic.to_string(),
			event: EVENT_JOIN.to_string(),
			payload,
			join_ref: Some(reference.clone()),
			reference: Some(reference),
		}
	}

	pub fn leave(topic: &str, reference: String) -> Self {
		Self {
			topic: topic.to_string(),
			event: EVENT_LEAVE.to_string(),
			payload: json!({}),
			reference: Some(reference),
			join_ref: None,
		}
	}

	pub fn heartbeat(reference: String) -> Self {
		Self {
			topic: PHOENIX_TOPIC.to_string(),
			event: EVENT_HEARTBEAT.to_string(),
			payload: json!({}),
			reference: Some(reference),
			join_ref: None,
		}
	}

	/// Status of a `phx_reply`: `Ok(())` for `ok`, `Err(response)` otherwise.
	pub fn reply_status(&self) -> Option<Result<(), String>> {
		if self.event != EVENT_REPLY {
			return None;
		}
		match self.payload.get("status").and_then(Value::as_str) {
			Some("ok") => Some(Ok(())),
			status => {
				let response = self.payload.get("response").map(Value::to_string).unwrap_or_default();
				Some(Err(format!("{} {}", status.unwrap_or("unknown"), response)))
			}
		}
	}

	pub fn encode(&self) -> Result<String, FeedError> {
		serde_json::to_string(self).map_err(|err| FeedError::protocol(err.to_string()))
	}

	pub fn decode(text: &str) -> Result<Self, FeedError> {
		serde_json::from_str(text).map_err(|err| FeedError::protocol(format!("undecodable message: {}", err)))
	}
}

#[derive(Debug, Deserialize)]
struct ChangePayload {
	data: ChangeData,
}

#[derive(Debug, Deserialize)]
struct ChangeData {
	schema: String,
	table: String,
	#[serde(rename = "type")]
	kind: ChangeKind,
	#[serde(default)]
	record: Option<Row>,
	#[serde(default)]
	old_record: Option<Row>,
	#[serde(default)]
	commit_timestamp: Option<String>,
}

/// Convert the payload of a `postgres_changes` message into a [`ChangeEvent`].
pub fn decode_change(payload: &Value) -> Result<ChangeEvent, FeedError> {
	let ChangePayload {
		data,
	} = ChangePayload::deserialize(payload)
		.map_err(|err| FeedError::protocol(format!("invalid postgres_changes payload: {}", err)))?;

	let table: Table = data.table.parse().map_err(|err| FeedError::protocol(format!("{}", err)))?;
	let non_empty = |row: Option<Row>| row.filter(|row| !row.is_empty());

	let new = match data.kind {
		ChangeKind::Delete => None,
		ChangeKind::Insert | ChangeKind::Update => non_empty(data.record),
	};

	Ok(ChangeEvent {
		event_type: data.kind,
		schema: data.schema,
		table,
		new,
		old: non_empty(data.old_record),
		commit_timestamp: data.commit_timestamp,
	})
}

#[cfg(test)]
mod tests {
	use carewire_core::{EventKind, Filter, SubscriptionConfig};

	use super::*;

	#[test]
	fn test_join_payload() {
		let key = SubscriptionConfig::new(Table::Tasks).event(EventKind::Insert).filter(Filter::eq("user_id", "A")).key();
		let message = PhoenixMessage::join("realtime:tasks:1", &key, Some("jwt"), "1".to_string());

		let value: Value = serde_json::from_str(&message.encode().unwrap()).unwrap();
		assert_eq!(
			value,
			json!({
				"topic": "realtime:tasks:1",
				"event": "phx_join",
				"payload": {
					"config": {
						"broadcast": { "self": false },
						"presence": { "key": "" },
						"postgres_changes": [
							{ "event": "INSERT", "schema": "public", "table": "tasks", "filter": "user_id=eq.A" }
						]
					},
					"access_token": "jwt"
				},
				"ref": "1",
				"join_ref": "1"
			})
		);
	}

	#[test]
	fn test_join_without_filter_or_token() {
		let key = SubscriptionConfig::new(Table::Notifications).key();
		let message = PhoenixMessage::join("realtime:n", &key, None, "2".to_string());

		let binding = &message.payload["config"]["postgres_changes"][0];
		assert_eq!(binding["event"], "*");
		assert!(binding.get("filter").is_none());
		assert!(message.payload.get("access_token").is_none());
	}

	#[test]
	fn test_heartbeat() {
		let value: Value = serde_json::from_str(&PhoenixMessage::heartbeat("7".to_string()).encode().unwrap()).unwrap();
		assert_eq!(value, json!({"topic": "phoenix", "event": "heartbeat", "payload": {}, "ref": "7"}));
	}

	#[test]
	fn test_reply_status() {
		let ok = PhoenixMessage::decode(
			r#"{"topic":"phoenix","event":"phx_reply","payload":{"status":"ok","response":{}},"ref":"3"}"#,
		)
		.unwrap();
		assert_eq!(ok.reply_status(), Some(Ok(())));
		assert_eq!(ok.reference.as_deref(), Some("3"));

		let err = PhoenixMessage::decode(
			r#"{"topic":"realtime:x","event":"phx_reply","payload":{"status":"error","response":{"reason":"denied"}},"ref":null}"#,
		)
		.unwrap();
		assert!(matches!(err.reply_status(), Some(Err(reason)) if reason.contains("denied")));

		let system = PhoenixMessage::decode(r#"{"topic":"realtime:x","event":"system","payload":{}}"#).unwrap();
		assert_eq!(system.reply_status(), None);
	}

	#[test]
	fn test_decode_change() {
		let payload = json!({
			"ids": [1],
			"data": {
				"schema": "public",
				"table": "inventory",
				"type": "UPDATE",
				"record": {"id": 4, "quantity": 2},
				"old_record": {"id": 4},
				"commit_timestamp": "2025-03-01T10:00:00Z",
				"columns": [],
				"errors": null
			}
		});

		let event = decode_change(&payload).unwrap();
		assert_eq!(event.event_type, ChangeKind::Update);
		assert_eq!(event.table, Table::Inventory);
		assert_eq!(event.new.as_ref().unwrap()["quantity"], 2);
		assert_eq!(event.old.as_ref().unwrap()["id"], 4);
		assert_eq!(event.commit_timestamp.as_deref(), Some("2025-03-01T10:00:00Z"));
	}

	#[test]
	fn test_decode_delete_uses_old_record() {
		let payload = json!({
			"data": {"schema": "public", "table": "tasks", "type": "DELETE", "record": {}, "old_record": {"id": 9}}
		});
		let event = decode_change(&payload).unwrap();
		assert_eq!(event.new, None);
		assert_eq!(event.old.unwrap()["id"], 9);
	}

	#[test]
	fn test_decode_change_rejects_unknown_table() {
		let payload = json!({"data": {"schema": "public", "table": "patients", "type": "INSERT"}});
		assert!(matches!(decode_change(&payload), Err(FeedError::Protocol { .. })));
	}
}
