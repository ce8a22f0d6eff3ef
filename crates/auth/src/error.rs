// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use carewire_core::Table;
use carewire_type::{Diagnostic, Error, IntoDiagnostic};

use crate::Role;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
	#[error("Malformed session token: {reason}")]
	MalformedToken {
		reason: String,
	},

	#[error("Session token signature does not verify")]
	BadSignature,

	#[error("Session expired at {expired_at}")]
	Expired {
		expired_at: u64,
	},

	#[error("Role '{role}' may not subscribe to '{table}'")]
	TableDenied {
		role: Role,
		table: Table,
	},

	#[error("Subscription to '{table}' must be filtered on '{column}=eq.{subject}'")]
	FilterNotScoped {
		table: Table,
		column: String,
		subject: String,
	},

	#[error("Unknown role '{name}'")]
	UnknownRole {
		name: String,
	},
}

impl AuthError {
	pub(crate) fn malformed(reason: impl Into<String>) -> Self {
		AuthError::MalformedToken {
			reason: reason.into(),
		}
	}
}

impl IntoDiagnostic for AuthError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			AuthError::MalformedToken {
				..
			} => Diagnostic::new("AUTH_001", message)
				.with_help("Session tokens are HS256 signed JWTs carrying sub, org, role and exp"),

			AuthError::BadSignature => Diagnostic::new("AUTH_002", message)
				.with_help("The token was not signed with the expected secret or was altered"),

			AuthError::Expired {
				..
			} => Diagnostic::new("AUTH_003", message).with_help("Sign in again to obtain a fresh session"),

			AuthError::TableDenied {
				..
			} => Diagnostic::new("AUTH_004", message),

			AuthError::FilterNotScoped {
				..
			} => Diagnostic::new("AUTH_005", message)
				.with_note("The filter must pin rows to the caller's own user or organization"),

			AuthError::UnknownRole {
				..
			} => Diagnostic::new("AUTH_006", message).with_help("Use one of: admin, supervisor, employee"),
		}
	}
}

impl From<AuthError> for Error {
	fn from(err: AuthError) -> Self {
		Error(err.into_diagnostic())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_codes() {
		let code = |err: AuthError| Error::from(err).code().to_string();

		assert_eq!(code(AuthError::malformed("x")), "AUTH_001");
		assert_eq!(code(AuthError::BadSignature), "AUTH_002");
		assert_eq!(
			code(AuthError::Expired {
				expired_at: 1
			}),
			"AUTH_003"
		);
		assert_eq!(
			code(AuthError::TableDenied {
				role: Role::Employee,
				table: Table::Users
			}),
			"AUTH_004"
		);
		assert_eq!(
			code(AuthError::FilterNotScoped {
				table: Table::Tasks,
				column: "user_id".to_string(),
				subject: "u1".to_string()
			}),
			"AUTH_005"
		);
		assert_eq!(
			code(AuthError::UnknownRole {
				name: "nurse".to_string()
			}),
			"AUTH_006"
		);
	}
}
