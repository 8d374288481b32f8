//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Ed25519 signing keys and signatures.

use crate::config::{ED25519_PRIVATE_LEN, ED25519_PUBLIC_LEN, ED25519_SIGNATURE_LEN};
use crate::error::PrimitiveError;
use crate::Secret;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;

/// An Ed25519 key, in either a public-only or a private+public variant.
///
/// The private scalar, when present, is held in a [`Secret`] and zeroized on
/// drop.
pub enum Ed25519Key {
    Public(VerifyingKey),
    Keypair {
        secret: Secret<[u8; ED25519_PRIVATE_LEN]>,
        public: VerifyingKey,
    },
}

impl Ed25519Key {
    /// Generate a fresh signing keypair.
    #[tracing::instrument(skip_all)]
    pub fn generate() -> Self {
        let signing = SigningKey::generate(&mut OsRng);
        let public = signing.verifying_key();
        Ed25519Key::Keypair {
            secret: Secret::new(signing.to_bytes()),
            public,
        }
    }

    /// Load a private key from its 32-byte scalar, deriving the public half.
    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != ED25519_PRIVATE_LEN {
            return Err(PrimitiveError::InvalidKeyLength {
                expected: ED25519_PRIVATE_LEN,
                got: bytes.len(),
            });
        }
        let mut secret = [0u8; ED25519_PRIVATE_LEN];
        secret.copy_from_slice(bytes);
        let signing = SigningKey::from_bytes(&secret);
        let public = signing.verifying_key();
        Ok(Ed25519Key::Keypair {
            secret: Secret::new(secret),
            public,
        })
    }

    /// Load a public-only key from its 32-byte point.
    pub fn from_public_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != ED25519_PUBLIC_LEN {
            return Err(PrimitiveError::InvalidKeyLength {
                expected: ED25519_PUBLIC_LEN,
                got: bytes.len(),
            });
        }
        let mut raw = [0u8; ED25519_PUBLIC_LEN];
        raw.copy_from_slice(bytes);
        let public = VerifyingKey::from_bytes(&raw)
            .map_err(|e| PrimitiveError::InvalidKeyEncoding(e.to_string()))?;
        Ok(Ed25519Key::Public(public))
    }

    pub fn public_bytes(&self) -> [u8; ED25519_PUBLIC_LEN] {
        match self {
            Ed25519Key::Public(p) => p.to_bytes(),
            Ed25519Key::Keypair { public, .. } => public.to_bytes(),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        match self {
            Ed25519Key::Public(p) => *p,
            Ed25519Key::Keypair { public, .. } => *public,
        }
    }

    pub fn has_private(&self) -> bool {
        matches!(self, Ed25519Key::Keypair { .. })
    }

    fn signing_key(&self) -> Result<SigningKey, PrimitiveError> {
        match self {
            Ed25519Key::Keypair { secret, .. } => {
                Ok(SigningKey::from_bytes(secret.expose_secret()))
            }
            Ed25519Key::Public(_) => Err(PrimitiveError::InvalidKeyEncoding(
                "signing requires a private key".into(),
            )),
        }
    }

    /// Sign `message`, returning the raw 64-byte signature.
    #[tracing::instrument(skip_all)]
    pub fn sign(&self, message: &[u8]) -> Result<[u8; ED25519_SIGNATURE_LEN], PrimitiveError> {
        let signing = self.signing_key()?;
        Ok(signing.sign(message).to_bytes())
    }

    /// Verify `signature` over `message` under this key's public half.
    #[tracing::instrument(skip_all)]
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, PrimitiveError> {
        if signature.len() != ED25519_SIGNATURE_LEN {
            return Err(PrimitiveError::InvalidSignatureLength {
                expected: ED25519_SIGNATURE_LEN,
                got: signature.len(),
            });
        }
        let mut raw = [0u8; ED25519_SIGNATURE_LEN];
        raw.copy_from_slice(signature);
        let sig = Signature::from_bytes(&raw);
        Ok(self.verifying_key().verify(message, &sig).is_ok())
    }
}

/// Free functions mirroring the primitive adapter surface named in the spec.
pub fn ed25519_generate() -> Ed25519Key {
    Ed25519Key::generate()
}

pub fn ed25519_sign(
    key: &Ed25519Key,
    message: &[u8],
) -> Result<[u8; ED25519_SIGNATURE_LEN], PrimitiveError> {
    key.sign(message)
}

pub fn ed25519_verify(
    key: &Ed25519Key,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, PrimitiveError> {
    key.verify(message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let key = Ed25519Key::generate();
        let msg = b"sealmail test message";
        let sig = key.sign(msg).unwrap();
        assert!(key.verify(msg, &sig).unwrap());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let key = Ed25519Key::generate();
        let sig = key.sign(b"original").unwrap();
        assert!(!key.verify(b"tampered", &sig).unwrap());
    }

    #[test]
    fn public_only_key_cannot_sign() {
        let key = Ed25519Key::generate();
        let public_only = Ed25519Key::from_public_bytes(&key.public_bytes()).unwrap();
        assert!(!public_only.has_private());
        assert!(public_only.sign(b"anything").is_err());
    }

    #[test]
    fn fixed_vector_matches_known_answer() {
        let secret =
            hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .unwrap();
        let key = Ed25519Key::from_private_bytes(&secret).unwrap();
        let sig = key.sign(b"").unwrap();
        let expected = hex::decode(
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555\
             fb8821590a33bacc61e39701cf9b46bd25bf5f0595bcbe24655141438e7a100b",
        )
        .unwrap();
        assert_eq!(sig.as_slice(), expected.as_slice());
        assert!(key.verify(b"", &sig).unwrap());
    }
}
