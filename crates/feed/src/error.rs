// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use carewire_type::{Diagnostic, Error, IntoDiagnostic};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
	#[error("Invalid realtime endpoint '{endpoint}': {reason}")]
	InvalidEndpoint {
		endpoint: String,
		reason: String,
	},

	#[error("Failed to connect to '{endpoint}': {reason}")]
	ConnectFailed {
		endpoint: String,
		reason: String,
	},

	#[error("Change feed is unavailable: {reason}")]
	Unavailable {
		reason: String,
	},

	#[error("Protocol error: {reason}")]
	Protocol {
		reason: String,
	},
}

impl FeedError {
	pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
		FeedError::Unavailable {
			reason: reason.into(),
		}
	}

	pub(crate) fn protocol(reason: impl Into<String>) -> Self {
		FeedError::Protocol {
			reason: reason.into(),
		}
	}
}

impl IntoDiagnostic for FeedError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			FeedError::InvalidEndpoint {
				..
			} => Diagnostic::new("FEED_001", message)
				.with_help("Use a ws://, wss://, http:// or https:// URL of the realtime service"),

			FeedError::ConnectFailed {
				..
			} => Diagnostic::new("FEED_002", message),

			FeedError::Unavailable {
				..
			} => Diagnostic::new("FEED_003", message)
				.with_note("The feed was shut down or exhausted its reconnect attempts"),

			FeedError::Protocol {
				..
			} => Diagnostic::new("FEED_004", message),
		}
	}
}

impl From<FeedError> for Error {
	fn from(err: FeedError) -> Self {
		Error(err.into_diagnostic())
	}
}
