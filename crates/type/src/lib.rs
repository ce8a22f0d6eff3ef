// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared error model for carewire crates.
//!
//! Every crate defines its own error enum and converts it into a
//! [`Diagnostic`] through [`IntoDiagnostic`]. The [`Error`] wrapper is what
//! crosses crate boundaries.

pub mod error;

pub use error::{Diagnostic, Error, IntoDiagnostic, Result, diagnostic};
