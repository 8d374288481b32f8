//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! HKDF-SHA512 and the STACIE password-hardening schedule.

use crate::config::{STACIE_MAX_ROUNDS, STACIE_MIN_ROUNDS, STACIE_NONCE_LEN, STACIE_SALT_LEN};
use crate::error::PrimitiveError;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// HKDF-SHA512 extract-then-expand into `length` bytes.
#[tracing::instrument(skip_all)]
pub fn hkdf(salt: &[u8], ikm: &[u8], info: &[u8], length: usize) -> Result<Vec<u8>, PrimitiveError> {
    let hk = Hkdf::<Sha512>::new(Some(salt), ikm);
    let mut out = vec![0u8; length];
    hk.expand(info, &mut out)
        .map_err(|_| PrimitiveError::HkdfLengthInvalid(length))?;
    Ok(out)
}

/// Output of one STACIE derivation.
#[derive(Clone)]
pub struct StacieOutput {
    pub seed: [u8; 64],
    pub shard: [u8; 64],
    pub hashed_token: [u8; 64],
    pub verification_token: [u8; 64],
}

/// Run the STACIE schedule: an iterative SHA-512 hardening loop over
/// `password`/`salt`/`nonce`, followed by HMAC-SHA-512 derivation of the
/// shard, hashed token, and verification token.
#[tracing::instrument(skip(password))]
pub fn stacie(
    password: &[u8],
    salt: &[u8],
    nonce: &[u8],
    rounds: u32,
) -> Result<StacieOutput, PrimitiveError> {
    if salt.len() != STACIE_SALT_LEN {
        return Err(PrimitiveError::InvalidKeyLength {
            expected: STACIE_SALT_LEN,
            got: salt.len(),
        });
    }
    if nonce.len() != STACIE_NONCE_LEN {
        return Err(PrimitiveError::InvalidKeyLength {
            expected: STACIE_NONCE_LEN,
            got: nonce.len(),
        });
    }
    if rounds < STACIE_MIN_ROUNDS || rounds > STACIE_MAX_ROUNDS {
        return Err(PrimitiveError::StacieRoundsOutOfRange(rounds));
    }

    let mut base: [u8; 64] = {
        let mut hasher = Sha512::new();
        hasher.update(password);
        hasher.update(salt);
        hasher.update(nonce);
        hasher.finalize().into()
    };

    for i in 1..=rounds {
        let counter = i.to_be_bytes();
        let mut hasher = Sha512::new();
        hasher.update(base);
        hasher.update(password);
        hasher.update(salt);
        hasher.update(nonce);
        hasher.update(&counter[1..]); // 3-byte big-endian counter
        base = hasher.finalize().into();
    }

    let seed = base;

    let shard: [u8; 64] = {
        let mut mac =
            HmacSha512::new_from_slice(&seed).map_err(|_| PrimitiveError::HkdfLengthInvalid(64))?;
        mac.update(b"STACIE SHARD");
        mac.finalize().into_bytes().into()
    };

    let hashed_token: [u8; 64] = {
        let mut mac =
            HmacSha512::new_from_slice(&seed).map_err(|_| PrimitiveError::HkdfLengthInvalid(64))?;
        mac.update(b"STACIE TOKEN");
        mac.finalize().into_bytes().into()
    };

    let verification_token: [u8; 64] = {
        let mut mac = HmacSha512::new_from_slice(&hashed_token)
            .map_err(|_| PrimitiveError::HkdfLengthInvalid(64))?;
        mac.update(salt);
        mac.update(nonce);
        mac.finalize().into_bytes().into()
    };

    Ok(StacieOutput {
        seed,
        shard,
        hashed_token,
        verification_token,
    })
}

/// Count of bits that differ between two equal-length byte slices.
fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hkdf_expands_to_requested_length() {
        let out = hkdf(b"salt", b"ikm", b"info", 32).unwrap();
        assert_eq!(out.len(), 32);
    }

    #[test]
    fn hkdf_is_deterministic() {
        let a = hkdf(b"salt", b"ikm", b"info", 32).unwrap();
        let b = hkdf(b"salt", b"ikm", b"info", 32).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stacie_rejects_round_count_below_minimum() {
        let salt = [0u8; STACIE_SALT_LEN];
        let nonce = [0u8; STACIE_NONCE_LEN];
        assert!(stacie(b"password", &salt, &nonce, 7).is_err());
    }

    #[test]
    fn stacie_rejects_round_count_above_maximum() {
        let salt = [0u8; STACIE_SALT_LEN];
        let nonce = [0u8; STACIE_NONCE_LEN];
        assert!(stacie(b"password", &salt, &nonce, STACIE_MAX_ROUNDS + 1).is_err());
    }

    #[test]
    fn stacie_is_deterministic_across_calls() {
        let salt = [0u8; STACIE_SALT_LEN];
        let nonce = [0u8; STACIE_NONCE_LEN];
        let a = stacie(b"password", &salt, &nonce, 8).unwrap();
        let b = stacie(b"password", &salt, &nonce, 8).unwrap();
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.shard, b.shard);
        assert_eq!(a.hashed_token, b.hashed_token);
        assert_eq!(a.verification_token, b.verification_token);
    }

    #[test]
    fn stacie_bit_flip_in_salt_diverges_substantially() {
        let mut salt = [0u8; STACIE_SALT_LEN];
        let nonce = [0u8; STACIE_NONCE_LEN];
        let baseline = stacie(b"password", &salt, &nonce, 8).unwrap();
        salt[0] ^= 0x01;
        let flipped = stacie(b"password", &salt, &nonce, 8).unwrap();
        assert!(hamming_distance(&baseline.seed, &flipped.seed) >= 200);
    }

    #[test]
    fn stacie_derived_values_are_pairwise_distinct() {
        let salt = [0u8; STACIE_SALT_LEN];
        let nonce = [0u8; STACIE_NONCE_LEN];
        let out = stacie(b"password", &salt, &nonce, 8).unwrap();
        assert_ne!(out.seed, out.shard);
        assert_ne!(out.shard, out.hashed_token);
        assert_ne!(out.hashed_token, out.verification_token);
    }
}
