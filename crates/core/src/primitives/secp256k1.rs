//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! secp256k1 keys and raw ECDH key agreement.
//!
//! Used exclusively for encryption-role keys (org/user encryption keys,
//! per-message ephemeral keys). Signing always goes through
//! [`crate::primitives::ed25519`].

use crate::config::{SECP256K1_PRIVATE_LEN, SECP256K1_PUBLIC_LEN, SECP256K1_SHARED_SECRET_LEN};
use crate::error::PrimitiveError;
use crate::Secret;
use k256::ecdh::diffie_hellman;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand_core::OsRng;

/// A secp256k1 key, public-only or private+public. The private scalar is
/// held in a [`Secret`] and zeroized on drop.
pub enum Secp256k1Key {
    Public(PublicKey),
    Keypair {
        secret_bytes: Secret<[u8; SECP256K1_PRIVATE_LEN]>,
        public: PublicKey,
    },
}

impl Secp256k1Key {
    #[tracing::instrument(skip_all)]
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        let public = secret.public_key();
        let mut secret_bytes = [0u8; SECP256K1_PRIVATE_LEN];
        secret_bytes.copy_from_slice(&secret.to_bytes());
        Secp256k1Key::Keypair {
            secret_bytes: Secret::new(secret_bytes),
            public,
        }
    }

    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != SECP256K1_PRIVATE_LEN {
            return Err(PrimitiveError::InvalidKeyLength {
                expected: SECP256K1_PRIVATE_LEN,
                got: bytes.len(),
            });
        }
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| PrimitiveError::InvalidKeyEncoding(e.to_string()))?;
        let public = secret.public_key();
        let mut secret_bytes = [0u8; SECP256K1_PRIVATE_LEN];
        secret_bytes.copy_from_slice(bytes);
        Ok(Secp256k1Key::Keypair {
            secret_bytes: Secret::new(secret_bytes),
            public,
        })
    }

    /// Load a public-only key from its 33-byte SEC1-compressed point.
    pub fn from_public_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != SECP256K1_PUBLIC_LEN {
            return Err(PrimitiveError::InvalidKeyLength {
                expected: SECP256K1_PUBLIC_LEN,
                got: bytes.len(),
            });
        }
        let public = PublicKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitiveError::InvalidKeyEncoding(e.to_string()))?;
        Ok(Secp256k1Key::Public(public))
    }

    pub fn public_bytes(&self) -> [u8; SECP256K1_PUBLIC_LEN] {
        let public = match self {
            Secp256k1Key::Public(p) => p,
            Secp256k1Key::Keypair { public, .. } => public,
        };
        let encoded = public.to_encoded_point(true);
        let mut out = [0u8; SECP256K1_PUBLIC_LEN];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            Secp256k1Key::Public(p) => *p,
            Secp256k1Key::Keypair { public, .. } => *public,
        }
    }

    pub fn has_private(&self) -> bool {
        matches!(self, Secp256k1Key::Keypair { .. })
    }

    fn secret_key(&self) -> Result<SecretKey, PrimitiveError> {
        match self {
            Secp256k1Key::Keypair { secret_bytes, .. } => {
                SecretKey::from_slice(secret_bytes.expose_secret())
                    .map_err(|e| PrimitiveError::InvalidKeyEncoding(e.to_string()))
            }
            Secp256k1Key::Public(_) => Err(PrimitiveError::InvalidKeyEncoding(
                "ECDH requires a private key".into(),
            )),
        }
    }

    /// Compute the raw ECDH shared secret (x-coordinate, big-endian) with `their_public`.
    #[tracing::instrument(skip_all)]
    pub fn compute_shared(
        &self,
        their_public: &Secp256k1Key,
    ) -> Result<[u8; SECP256K1_SHARED_SECRET_LEN], PrimitiveError> {
        let secret = self.secret_key()?;
        let shared = diffie_hellman(
            secret.to_nonzero_scalar(),
            their_public.public_key().as_affine(),
        );
        let bytes = shared.raw_secret_bytes();
        if bytes.iter().all(|&b| b == 0) {
            return Err(PrimitiveError::DegenerateSharedSecret);
        }
        let mut out = [0u8; SECP256K1_SHARED_SECRET_LEN];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

pub fn secp256k1_generate() -> Secp256k1Key {
    Secp256k1Key::generate()
}

pub fn secp256k1_compute_shared(
    private: &Secp256k1Key,
    public: &Secp256k1Key,
) -> Result<[u8; SECP256K1_SHARED_SECRET_LEN], PrimitiveError> {
    private.compute_shared(public)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecdh_is_commutative() {
        let alice = Secp256k1Key::generate();
        let bob = Secp256k1Key::generate();

        let alice_pub = Secp256k1Key::from_public_bytes(&alice.public_bytes()).unwrap();
        let bob_pub = Secp256k1Key::from_public_bytes(&bob.public_bytes()).unwrap();

        let shared_a = alice.compute_shared(&bob_pub).unwrap();
        let shared_b = bob.compute_shared(&alice_pub).unwrap();
        assert_eq!(shared_a, shared_b);
    }

    #[test]
    fn public_bytes_round_trip_compressed_length() {
        let key = Secp256k1Key::generate();
        let bytes = key.public_bytes();
        assert_eq!(bytes.len(), SECP256K1_PUBLIC_LEN);
        assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
    }

    #[test]
    fn public_only_key_cannot_derive_shared_secret() {
        let key = Secp256k1Key::generate();
        let public_only = Secp256k1Key::from_public_bytes(&key.public_bytes()).unwrap();
        let other = Secp256k1Key::generate();
        assert!(public_only.compute_shared(&other).is_err());
    }
}
