//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Uniform adapter over the underlying cryptographic libraries: Ed25519,
//! secp256k1, AES-256-GCM, HKDF-SHA512, and STACIE. Everything above this
//! module talks to these types and free functions, never to the
//! third-party crates directly.

pub mod aead;
pub mod ed25519;
pub mod kdf;
pub mod secp256k1;

pub use aead::{aead_open, aead_seal};
pub use ed25519::{ed25519_generate, ed25519_sign, ed25519_verify, Ed25519Key};
pub use kdf::{hkdf, stacie, StacieOutput};
pub use secp256k1::{secp256k1_compute_shared, secp256k1_generate, Secp256k1Key};
