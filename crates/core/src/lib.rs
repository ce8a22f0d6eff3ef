// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Domain model of the realtime change feed.
//!
//! A [`ChannelKey`] identifies one backend channel by schema, table, event and
//! filter. Backends implement [`ChangeFeed`] and push [`ChangeEvent`]s into the
//! [`ChangeSink`] handed to them when a channel is opened.

pub use carewire_type::{Diagnostic, Error, IntoDiagnostic, Result};
pub use error::CoreError;
pub use interface::*;

pub mod error;
pub mod interface;

/// Schema used when a subscription does not name one.
pub const DEFAULT_SCHEMA: &str = "public";
