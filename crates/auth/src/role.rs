// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Admin,
	Supervisor,
	Employee,
}

impl Role {
	pub const ALL: [Role; 3] = [Role::Admin, Role::Supervisor, Role::Employee];

	pub fn name(&self) -> &'static str {
		match self {
			Role::Admin => "admin",
			Role::Supervisor => "supervisor",
			Role::Employee => "employee",
		}
	}
}

impl Display for Role {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Role {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim();
		Role::ALL.into_iter().find(|role| role.name().eq_ignore_ascii_case(name)).ok_or_else(|| {
			AuthError::UnknownRole {
				name: name.to_string(),
			}
		})
	}
}
