// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A table whose row changes can be watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
	Users,
	Organizations,
	Areas,
	Tasks,
	Inventory,
	InventoryUsage,
	InventoryRestock,
	ChatRooms,
	ChatMessages,
	ChatMessageReactions,
	Notifications,
	WorkShifts,
}

impl Table {
	pub const ALL: [Table; 12] = [
		Table::Users,
		Table::Organizations,
		Table::Areas,
		Table::Tasks,
		Table::Inventory,
		Table::InventoryUsage,
		Table::InventoryRestock,
		Table::ChatRooms,
		Table::ChatMessages,
		Table::ChatMessageReactions,
		Table::Notifications,
		Table::WorkShifts,
	];

	pub fn name(&self) -> &'static str {
		match self {
			Table::Users => "users",
			Table::Organizations => "organizations",
			Table::Areas => "areas",
			Table::Tasks => "tasks",
			Table::Inventory => "inventory",
			Table::InventoryUsage => "inventory_usage",
			Table::InventoryRestock => "inventory_restock",
			Table::ChatRooms => "chat_rooms",
			Table::ChatMessages => "chat_messages",
			Table::ChatMessageReactions => "chat_message_reactions",
			Table::Notifications => "notifications",
			Table::WorkShifts => "work_shifts",
		}
	}

	pub fn is_chat(&self) -> bool {
		matches!(self, Table::ChatRooms | Table::ChatMessages | Table::ChatMessageReactions)
	}
}

impl Display for Table {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Table {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim();
		Table::ALL.iter().copied().find(|table| table.name() == name).ok_or_else(|| CoreError::UnknownTable {
			name: name.to_string(),
		})
	}
}
