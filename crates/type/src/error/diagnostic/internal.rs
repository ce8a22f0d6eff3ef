// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::error::diagnostic::Diagnostic;

/// An invariant was violated inside carewire itself
pub fn internal(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "INTERNAL_001".to_string(),
		message: format!("Internal error: {}", reason.into()),
		label: None,
		help: Some("This is a bug in carewire, please report it".to_string()),
		notes: vec![],
		cause: None,
	}
}
