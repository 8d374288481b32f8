//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! The six error kinds every sealmail operation surfaces.

use std::fmt;

/// The top-level classification every `PrimeError` in `sealmail-core` maps to.
///
/// Kept here, independent of the error *types* that carry it, so that
/// callers who only link against `sealmail-types` (e.g. a thin client
/// reporting diagnostics) can match on the taxonomy without pulling in the
/// cryptographic implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed TLV, bad magic, truncated buffer.
    Format,
    /// Signature invalid, AEAD tag invalid, key type mismatch.
    Crypto,
    /// Round count out of range, disallowed artifact combination.
    Policy,
    /// Secure-memory allocation failed.
    Resource,
    /// Null or wrong-length caller buffer.
    Input,
    /// Operation attempted before `start()`.
    State,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Format => "Format",
            ErrorKind::Crypto => "Crypto",
            ErrorKind::Policy => "Policy",
            ErrorKind::Resource => "Resource",
            ErrorKind::Input => "Input",
            ErrorKind::State => "State",
        };
        f.write_str(label)
    }
}
