//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! The message assembler: composes a plaintext into a signed, sealed,
//! chunked message and verifies/decomposes it back.

pub mod assembler;
pub mod headers;

pub use assembler::{decrypt, encrypt, DecryptedMessage};
