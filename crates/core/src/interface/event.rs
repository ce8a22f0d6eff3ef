// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of row change carried by a [`ChangeEvent`](crate::ChangeEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
	Insert,
	Update,
	Delete,
}

impl Display for ChangeKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ChangeKind::Insert => f.write_str("INSERT"),
			ChangeKind::Update => f.write_str("UPDATE"),
			ChangeKind::Delete => f.write_str("DELETE"),
		}
	}
}

impl FromStr for ChangeKind {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"INSERT" => Ok(ChangeKind::Insert),
			"UPDATE" => Ok(ChangeKind::Update),
			"DELETE" => Ok(ChangeKind::Delete),
			_ => Err(CoreError::UnknownEvent {
				name: s.trim().to_string(),
			}),
		}
	}
}

/// Event selector of a subscription. `All` matches every [`ChangeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventKind {
	#[serde(rename = "INSERT")]
	Insert,
	#[serde(rename = "UPDATE")]
	Update,
	#[serde(rename = "DELETE")]
	Delete,
	#[default]
	#[serde(rename = "*")]
	All,
}

impl EventKind {
	pub fn matches(&self, kind: ChangeKind) -> bool {
		match self {
			EventKind::All => true,
			EventKind::Insert => kind == ChangeKind::Insert,
			EventKind::Update => kind == ChangeKind::Update,
			EventKind::Delete => kind == ChangeKind::Delete,
		}
	}
}

impl From<ChangeKind> for EventKind {
	fn from(kind: ChangeKind) -> Self {
		match kind {
			ChangeKind::Insert => EventKind::Insert,
			ChangeKind::Update => EventKind::Update,
			ChangeKind::Delete => EventKind::Delete,
		}
	}
}

impl Display for EventKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			EventKind::Insert => f.write_str("INSERT"),
			EventKind::Update => f.write_str("UPDATE"),
			EventKind::Delete => f.write_str("DELETE"),
			EventKind::All => f.write_str("*"),
		}
	}
}

impl FromStr for EventKind {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.trim() == "*" {
			return Ok(EventKind::All);
		}
		ChangeKind::from_str(s).map(EventKind::from)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_is_case_insensitive() {
		assert_eq!("insert".parse::<EventKind>().unwrap(), EventKind::Insert);
		assert_eq!(" Update ".parse::<EventKind>().unwrap(), EventKind::Update);
		assert_eq!("*".parse::<EventKind>().unwrap(), EventKind::All);
	}

	#[test]
	fn test_unknown_event_is_rejected() {
		assert!("TRUNCATE".parse::<EventKind>().is_err());
		assert!("*".parse::<ChangeKind>().is_err());
	}

	#[test]
	fn test_all_matches_every_kind() {
		for kind in [ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete] {
			assert!(EventKind::All.matches(kind));
		}
		assert!(EventKind::Insert.matches(ChangeKind::Insert));
		assert!(!EventKind::Insert.matches(ChangeKind::Delete));
	}

	#[test]
	fn test_serde_wire_names() {
		assert_eq!(serde_json::to_string(&EventKind::All).unwrap(), "\"*\"");
		assert_eq!(serde_json::to_string(&EventKind::Delete).unwrap(), "\"DELETE\"");
		let kind: ChangeKind = serde_json::from_str("\"UPDATE\"").unwrap();
		assert_eq!(kind, ChangeKind::Update);
	}
}
