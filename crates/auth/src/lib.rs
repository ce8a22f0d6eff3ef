// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Capability gate in front of the subscription registry.
//!
//! A [`SessionIssuer`] signs [`Claims`] into a token, a [`SessionVerifier`]
//! turns a token back into a [`Session`], and an [`AccessPolicy`] decides which
//! subscriptions a session may open.

pub use claims::{Claims, unix_now};
pub use error::AuthError;
pub use policy::{AccessPolicy, ORGANIZATION_COLUMN, Scope};
pub use role::Role;
pub use session::Session;
pub use token::{SessionIssuer, SessionVerifier};

mod claims;
pub mod error;
mod policy;
mod role;
mod session;
mod token;
