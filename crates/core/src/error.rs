// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use carewire_type::{Diagnostic, Error, IntoDiagnostic};

use crate::interface::Table;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
	#[error("Unknown table '{name}'")]
	UnknownTable {
		name: String,
	},

	#[error("Unknown change event '{name}'")]
	UnknownEvent {
		name: String,
	},

	#[error("Invalid filter '{filter}': {reason}")]
	InvalidFilter {
		filter: String,
		reason: String,
	},
}

impl CoreError {
	pub(crate) fn invalid_filter(filter: &str, reason: impl Into<String>) -> Self {
		CoreError::InvalidFilter {
			filter: filter.to_string(),
			reason: reason.into(),
		}
	}
}

impl IntoDiagnostic for CoreError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			CoreError::UnknownTable {
				..
			} => Diagnostic {
				code: "CORE_001".to_string(),
				message,
				label: Some("not a watched table".to_string()),
				help: Some(format!(
					"Use one of: {}",
					Table::ALL.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
				)),
				notes: vec![],
				cause: None,
			},

			CoreError::UnknownEvent {
				..
			} => Diagnostic {
				code: "CORE_002".to_string(),
				message,
				label: None,
				help: Some("Use INSERT, UPDATE, DELETE or * for any event".to_string()),
				notes: vec![],
				cause: None,
			},

			CoreError::InvalidFilter {
				..
			} => Diagnostic {
				code: "CORE_003".to_string(),
				message,
				label: None,
				help: Some("Filters have the form column=op.value, e.g. user_id=eq.42".to_string()),
				notes: vec!["Supported operators: eq, neq, lt, lte, gt, gte, in".to_string()],
				cause: None,
			},
		}
	}
}

impl From<CoreError> for Error {
	fn from(err: CoreError) -> Self {
		Error(err.into_diagnostic())
	}
}
