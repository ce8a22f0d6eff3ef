// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub use change::*;
pub use config::*;
pub use event::*;
pub use feed::*;
pub use filter::*;
pub use key::*;
pub use table::*;

mod change;
mod config;
mod event;
mod feed;
mod filter;
mod key;
mod table;
