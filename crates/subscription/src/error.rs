// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use carewire_type::{Diagnostic, Error, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubscriptionError {
	#[error("Subscription registry is shut down")]
	Closed,

	#[error("Change feed refused to open channel '{key}'")]
	OpenFailed {
		key: String,
		cause: Diagnostic,
	},
}

impl IntoDiagnostic for SubscriptionError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			SubscriptionError::Closed => Diagnostic::new("SUB_001", message)
				.with_help("Create a new registry; a registry cannot be restarted after shutdown"),

			SubscriptionError::OpenFailed {
				cause,
				..
			} => Diagnostic::new("SUB_002", message).with_cause(cause),
		}
	}
}

impl From<SubscriptionError> for Error {
	fn from(err: SubscriptionError) -> Self {
		Error(err.into_diagnostic())
	}
}
