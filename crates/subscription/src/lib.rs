// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Registry of live change subscriptions.
//!
//! Subscriptions with equal [`ChannelKey`](carewire_core::ChannelKey)s share
//! one backend channel. The [`SubscriptionRegistry`] opens that channel for
//! the first subscriber, fans every event out to all subscribers and closes
//! the channel according to its [`Teardown`] policy.

pub use config::{RegistryConfig, Teardown};
pub use error::SubscriptionError;
pub use handle::Subscription;
pub use registry::{Callback, SubscriptionId, SubscriptionRegistry};
pub use typed::TypedChange;

mod authorized;
mod channel;
mod config;
pub mod error;
mod handle;
mod registry;
mod typed;
