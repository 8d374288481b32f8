//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Organizational and user keys, signets, and signing requests.
//!
//! Every field in every artifact here is fixed-length (keys, signatures,
//! fingerprints), so the TLV length width is always [`Width::One`].

pub mod org;
pub mod user;

use crate::config::{AES_NONCE_LEN, STACIE_NONCE_LEN, STACIE_SALT_LEN};
use crate::error::{ArtifactError, PrimitiveError};
use crate::primitives::{aead_open, aead_seal, stacie};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha512};

pub use org::{OrgKey, OrgSignet};
pub use user::{UserKey, UserSignet, UserSigningRequest};

/// SHA-512 of `canonical_bytes`, truncated to 32 bytes, per `signet_fingerprint`.
pub fn fingerprint(canonical_bytes: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(canonical_bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

const WRAP_ROUNDS: u32 = 1 << 16;

/// Wrap `serialized` (a plaintext artifact's binary form) under a
/// password-derived STACIE/AES-256-GCM envelope: `salt(16) || nonce(16) ||
/// rounds(3B BE) || ciphertext`.
///
/// The STACIE schedule's `seed` output supplies the AES-256 key directly
/// (first 32 bytes); `shard`/`hashed_token`/`verification_token` are not
/// needed for at-rest key wrapping.
pub fn wrap_with_password(serialized: &[u8], password: &[u8]) -> Result<Vec<u8>, ArtifactError> {
    let mut salt = [0u8; STACIE_SALT_LEN];
    let mut nonce = [0u8; AES_NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce);

    let stacie_nonce = &nonce[..STACIE_NONCE_LEN];
    let derived = stacie(password, &salt, stacie_nonce, WRAP_ROUNDS)?;
    let key = &derived.seed[..32];

    let ciphertext = aead_seal(key, &nonce, &salt, serialized)?;

    let mut out = Vec::with_capacity(16 + 16 + 3 + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&WRAP_ROUNDS.to_be_bytes()[1..]);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Inverse of [`wrap_with_password`].
pub fn unwrap_with_password(wrapped: &[u8], password: &[u8]) -> Result<Vec<u8>, ArtifactError> {
    if wrapped.len() < 16 + 16 + 3 + 16 {
        return Err(ArtifactError::BadEnvelope(
            "password envelope shorter than its fixed header + tag".into(),
        ));
    }
    let salt = &wrapped[0..16];
    let nonce = &wrapped[16..32];
    let rounds = u32::from_be_bytes([0, wrapped[32], wrapped[33], wrapped[34]]);
    let ciphertext = &wrapped[35..];

    let stacie_nonce = &nonce[..STACIE_NONCE_LEN];
    let derived = stacie(password, salt, stacie_nonce, rounds).map_err(|e| match e {
        PrimitiveError::StacieRoundsOutOfRange(r) => {
            ArtifactError::BadEnvelope(format!("stored round count {r} out of range"))
        }
        other => ArtifactError::Crypto(other),
    })?;
    let key = &derived.seed[..32];

    aead_open(key, nonce, salt, ciphertext).map_err(ArtifactError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_wrap_unwrap_round_trip() {
        let plaintext = b"org key payload bytes go here";
        let wrapped = wrap_with_password(plaintext, b"correct horse battery staple").unwrap();
        let recovered = unwrap_with_password(&wrapped, b"correct horse battery staple").unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn wrong_password_fails_to_unwrap() {
        let plaintext = b"org key payload bytes go here";
        let wrapped = wrap_with_password(plaintext, b"right password").unwrap();
        assert!(unwrap_with_password(&wrapped, b"wrong password").is_err());
    }

    #[test]
    fn fingerprint_is_deterministic_and_32_bytes() {
        let a = fingerprint(b"some canonical bytes");
        let b = fingerprint(b"some canonical bytes");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }
}
