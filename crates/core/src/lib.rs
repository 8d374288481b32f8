//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Core cryptographic and wire-format crate for sealmail: org/user keys
//! and signed signets, a chunked encrypted message format with
//! per-recipient-role slots, and the STACIE password-hardening schedule.
//!
//! Module layout mirrors the component design: [`primitives`] adapts the
//! underlying crypto crates, [`codec`] is the TLV/armor/framing layer,
//! [`artifact`] is the key/signet model built on both, [`chunk`] is the
//! encrypted chunk engine, and [`message`] assembles chunks into complete
//! signed messages. [`facade`] is the single entry point external callers
//! should use; [`context`] holds the process-wide org identity threaded
//! into façade calls that need it.

pub mod artifact;
pub mod chunk;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod facade;
pub mod message;
pub mod primitives;
pub mod secret;

pub use context::PrimeContext;
pub use error::PrimeError;
pub use secret::Secret;
