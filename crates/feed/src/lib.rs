// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! [`ChangeFeed`](carewire_core::ChangeFeed) backends.
//!
//! [`MemoryFeed`] routes events published in-process and records how often
//! channels were opened and closed. [`RealtimeFeed`] speaks the Phoenix
//! channel protocol of the hosted realtime service over a WebSocket.

pub use error::FeedError;
pub use memory::MemoryFeed;
pub use realtime::{Backoff, FeedStatus, HealthStatus, RealtimeConfig, RealtimeFeed, ReconnectPolicy};

pub mod error;
mod memory;
pub mod realtime;
