// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{AuthError, Claims, Role, unix_now};

/// A verified session.
///
/// Only [`crate::SessionVerifier`] can produce one, so holding a `Session`
/// means the token behind it carried a valid signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	claims: Claims,
}

impl Session {
	pub(crate) fn new(claims: Claims) -> Self {
		Self {
			claims,
		}
	}

	pub fn user_id(&self) -> &str {
		&self.claims.sub
	}

	pub fn organization(&self) -> &str {
		&self.claims.org
	}

	pub fn role(&self) -> Role {
		self.claims.role
	}

	pub fn expires_at(&self) -> u64 {
		self.claims.exp
	}

	pub fn claims(&self) -> &Claims {
		&self.claims
	}

	pub fn ensure_fresh(&self) -> Result<(), AuthError> {
		self.ensure_fresh_at(unix_now())
	}

	pub fn ensure_fresh_at(&self, now: u64) -> Result<(), AuthError> {
		if self.claims.is_expired_at(now) {
			return Err(AuthError::Expired {
				expired_at: self.claims.exp,
			});
		}
		Ok(())
	}
}
