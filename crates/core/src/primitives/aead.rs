//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! AES-256-GCM sealing and opening.
//!
//! Every caller in this crate supplies its own nonce (chunk and envelope
//! nonces are derived, never left to chance), so this module exposes the
//! raw seal/open primitive rather than a nonce-managing wrapper.
//!
//! The adapter's nonce is 16 bytes (matching every other primitive's fixed
//! block/key widths), four bytes wider than the 12-byte IV `Aes256Gcm`
//! actually takes. [`fold_iv`] mixes the extra 4 bytes into the first 4 via
//! XOR rather than dropping them, so every caller-supplied nonce byte
//! participates in the IV actually used.

use crate::config::{AES_KEY_LEN, AES_NONCE_LEN, AES_TAG_LEN};
use crate::error::PrimitiveError;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};

const GCM_IV_LEN: usize = 12;

/// Fold a 16-byte adapter nonce down to the 12-byte IV `Aes256Gcm` takes,
/// XORing the trailing 4 bytes into the leading 4 so no input byte is
/// silently discarded.
fn fold_iv(nonce: &[u8]) -> [u8; GCM_IV_LEN] {
    let mut iv = [0u8; GCM_IV_LEN];
    iv.copy_from_slice(&nonce[..GCM_IV_LEN]);
    for (i, byte) in nonce[GCM_IV_LEN..].iter().enumerate() {
        iv[i] ^= byte;
    }
    iv
}

/// Seal `plaintext` under `key`/`nonce`, authenticating `aad`. Returns
/// ciphertext with the 16-byte tag appended.
#[tracing::instrument(skip_all)]
pub fn aead_seal(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, PrimitiveError> {
    if key.len() != AES_KEY_LEN {
        return Err(PrimitiveError::InvalidKeyLength {
            expected: AES_KEY_LEN,
            got: key.len(),
        });
    }
    if nonce.len() != AES_NONCE_LEN {
        return Err(PrimitiveError::InvalidKeyLength {
            expected: AES_NONCE_LEN,
            got: nonce.len(),
        });
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .encrypt(
            Nonce::from_slice(&fold_iv(nonce)),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| PrimitiveError::SealFailed(e.to_string()))
}

/// Open a ciphertext produced by [`aead_seal`]. `nonce` and `aad` must match
/// exactly what was used to seal.
#[tracing::instrument(skip_all)]
pub fn aead_open(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, PrimitiveError> {
    if key.len() != AES_KEY_LEN {
        return Err(PrimitiveError::InvalidKeyLength {
            expected: AES_KEY_LEN,
            got: key.len(),
        });
    }
    if nonce.len() != AES_NONCE_LEN {
        return Err(PrimitiveError::InvalidKeyLength {
            expected: AES_NONCE_LEN,
            got: nonce.len(),
        });
    }
    if ciphertext.len() < AES_TAG_LEN {
        return Err(PrimitiveError::OpenFailed);
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(
            Nonce::from_slice(&fold_iv(nonce)),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| PrimitiveError::OpenFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> [u8; AES_KEY_LEN] {
        [0x42u8; AES_KEY_LEN]
    }

    fn nonce() -> [u8; AES_NONCE_LEN] {
        [0x07u8; AES_NONCE_LEN]
    }

    #[test]
    fn seal_open_round_trip() {
        let ct = aead_seal(&key(), &nonce(), b"aad", b"hello sealmail").unwrap();
        let pt = aead_open(&key(), &nonce(), b"aad", &ct).unwrap();
        assert_eq!(pt, b"hello sealmail");
    }

    #[test]
    fn tampered_ciphertext_fails_to_open() {
        let mut ct = aead_seal(&key(), &nonce(), b"aad", b"hello sealmail").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(aead_open(&key(), &nonce(), b"aad", &ct).is_err());
    }

    #[test]
    fn mismatched_aad_fails_to_open() {
        let ct = aead_seal(&key(), &nonce(), b"aad-one", b"hello sealmail").unwrap();
        assert!(aead_open(&key(), &nonce(), b"aad-two", &ct).is_err());
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        assert!(aead_seal(&[0u8; 10], &nonce(), b"", b"x").is_err());
    }
}
