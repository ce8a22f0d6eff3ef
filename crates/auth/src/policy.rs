// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use carewire_core::{SubscriptionConfig, Table};
use tracing::debug;

use crate::{AuthError, Role, Session};

/// Rows of a table a role may watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
	/// Every row, across organizations.
	Any,
	/// Only rows where `column` equals the session's organization. The
	/// subscription filter must be exactly `column=eq.<organization>`.
	Organization {
		column: String,
	},
	/// Only rows where `column` equals the session's user id. The
	/// subscription filter must be exactly `column=eq.<user id>`.
	Own {
		column: String,
	},
	Denied,
}

impl Scope {
	pub fn organization(column: impl Into<String>) -> Self {
		Scope::Organization {
			column: column.into(),
		}
	}

	pub fn own(column: impl Into<String>) -> Self {
		Scope::Own {
			column: column.into(),
		}
	}
}

/// Column tenant tables carry their organization in.
pub const ORGANIZATION_COLUMN: &str = "organization_id";

/// Maps `(role, table)` to the [`Scope`] a session with that role gets.
///
/// Pairs without a rule are denied.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
	rules: HashMap<(Role, Table), Scope>,
}

impl AccessPolicy {
	/// Policy that denies everything until rules are added.
	pub fn empty() -> Self {
		Self {
			rules: HashMap::new(),
		}
	}

	pub fn with_rule(mut self, role: Role, table: Table, scope: Scope) -> Self {
		self.rules.insert((role, table), scope);
		self
	}

	pub fn scope(&self, role: Role, table: Table) -> Scope {
		self.rules.get(&(role, table)).cloned().unwrap_or(Scope::Denied)
	}

	/// Whether `session` may open a subscription described by `config`.
	pub fn authorize(&self, session: &Session, config: &SubscriptionConfig) -> Result<(), AuthError> {
		session.ensure_fresh()?;

		match self.scope(session.role(), config.table) {
			Scope::Any => Ok(()),
			Scope::Organization {
				column,
			} => pinned(session, config, column, session.organization()),
			Scope::Own {
				column,
			} => pinned(session, config, column, session.user_id()),
			Scope::Denied => {
				debug!(user = session.user_id(), role = %session.role(), table = %config.table, "table denied");
				Err(AuthError::TableDenied {
					role: session.role(),
					table: config.table,
				})
			}
		}
	}
}

fn pinned(session: &Session, config: &SubscriptionConfig, column: String, subject: &str) -> Result<(), AuthError> {
	let scoped = config.filter.as_ref().is_some_and(|f| f.column() == column && f.eq_value() == Some(subject));
	if scoped {
		return Ok(());
	}

	debug!(user = session.user_id(), table = %config.table, column = %column, "subscription filter not scoped to caller");
	Err(AuthError::FilterNotScoped {
		table: config.table,
		column,
		subject: subject.to_string(),
	})
}

impl Default for AccessPolicy {
	/// Every role is confined to its own organization. Employees are further
	/// confined to their own rows of personal tables.
	fn default() -> Self {
		let mut policy = AccessPolicy::empty();

		for table in Table::ALL {
			let tenant = match table {
				Table::Organizations => Scope::organization("id"),
				_ => Scope::organization(ORGANIZATION_COLUMN),
			};

			policy = policy.with_rule(Role::Admin, table, tenant.clone());

			let supervisor = match table {
				Table::Organizations => Scope::Denied,
				_ => tenant.clone(),
			};
			policy = policy.with_rule(Role::Supervisor, table, supervisor);

			let employee = match table {
				Table::Tasks | Table::Notifications | Table::WorkShifts => Scope::own("user_id"),
				Table::Areas | Table::Inventory => tenant,
				table if table.is_chat() => tenant,
				_ => Scope::Denied,
			};
			policy = policy.with_rule(Role::Employee, table, employee);
		}

		policy
	}
}
