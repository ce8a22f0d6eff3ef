// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::Role;

/// What a session token asserts about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	/// User id.
	pub sub: String,
	/// Organization the user belongs to.
	pub org: String,
	pub role: Role,
	/// Expiry, unix seconds.
	pub exp: u64,
}

impl Claims {
	/// Claims valid for `ttl` from now.
	pub fn new(sub: impl Into<String>, org: impl Into<String>, role: Role, ttl: Duration) -> Self {
		Self::expiring_at(sub, org, role, unix_now().saturating_add(ttl.as_secs()))
	}

	pub fn expiring_at(sub: impl Into<String>, org: impl Into<String>, role: Role, exp: u64) -> Self {
		Self {
			sub: sub.into(),
			org: org.into(),
			role,
			exp,
		}
	}

	pub fn is_expired_at(&self, now: u64) -> bool {
		now >= self.exp
	}
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_expiry_boundary() {
		let claims = Claims::expiring_at("u1", "org1", Role::Employee, 100);
		assert!(!claims.is_expired_at(99));
		assert!(claims.is_expired_at(100));
	}

	#[test]
	fn test_ttl_is_relative_to_now() {
		let claims = Claims::new("u1", "org1", Role::Admin, Duration::from_secs(60));
		let now = unix_now();
		assert!(claims.exp >= now + 59 && claims.exp <= now + 60);
	}
}
