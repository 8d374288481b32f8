//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Per-role recipient slots.
//!
//! A slot is 84 bytes: a 33-byte masked copy of the message ephemeral
//! public key, a 48-byte AES-256-GCM-wrapped chunk key (32-byte key + its
//! 16-byte tag), and a 3-byte derived selector. KEK, mask, and selector are
//! all HKDF outputs keyed on the ECDH shared secret between the role's
//! encryption key and the message ephemeral key, so a slot only "opens" —
//! the unmasked point matches the known-public ephemeral key and the GCM
//! tag verifies — for the holder of the matching private key. Absent slots
//! are filled with HKDF output keyed on the ephemeral public key and slot
//! index alone, indistinguishable from a real slot without that key.

use crate::config::{AES_KEY_LEN, KEK_INFO_PREFIX, SECP256K1_PUBLIC_LEN, SLOT_LEN};
use crate::error::{ChunkError, PrimitiveError};
use crate::primitives::{aead_open, aead_seal, hkdf, Secp256k1Key};

const WRAPPED_KEY_LEN: usize = 48; // 32-byte chunk key + 16-byte GCM tag

/// Fixed slot order within every encrypted chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Author = 0,
    Origin = 1,
    Destination = 2,
    Recipient = 3,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Author, Role::Origin, Role::Destination, Role::Recipient];

    fn tag(self) -> &'static [u8] {
        match self {
            Role::Author => b"AUTHOR",
            Role::Origin => b"ORIGIN",
            Role::Destination => b"DESTINATION",
            Role::Recipient => b"RECIPIENT",
        }
    }
}

const MASK_LABEL: &[u8] = b" MASK";
const SEL_LABEL: &[u8] = b" SEL";
const PLACEHOLDER_LABEL: &[u8] = b"PRIME SLOT PLACEHOLDER";

fn role_info(role: Role, suffix: &[u8]) -> Vec<u8> {
    let mut info = Vec::with_capacity(KEK_INFO_PREFIX.len() + role.tag().len() + suffix.len());
    info.extend_from_slice(KEK_INFO_PREFIX);
    info.extend_from_slice(role.tag());
    info.extend_from_slice(suffix);
    info
}

/// `HKDF(shared = ECDH(ephemeral, role_key), salt = SHA-512(ephemeral_pub),
/// info = "PRIME KEK " || role_tag, length = 32)`.
pub fn derive_kek(
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    shared_secret: &[u8],
    role: Role,
) -> Result<[u8; AES_KEY_LEN], PrimitiveError> {
    use sha2::{Digest, Sha512};
    let salt = Sha512::digest(ephemeral_pub);
    let info = role_info(role, b"");
    let bytes = hkdf(&salt, shared_secret, &info, AES_KEY_LEN)?;
    let mut out = [0u8; AES_KEY_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn mask_bytes(
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    shared_secret: &[u8],
    role: Role,
) -> Result<[u8; SECP256K1_PUBLIC_LEN], PrimitiveError> {
    use sha2::{Digest, Sha512};
    let salt = Sha512::digest(ephemeral_pub);
    let info = role_info(role, MASK_LABEL);
    let bytes = hkdf(&salt, shared_secret, &info, SECP256K1_PUBLIC_LEN)?;
    let mut out = [0u8; SECP256K1_PUBLIC_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn selector_bytes(
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    shared_secret: &[u8],
    role: Role,
) -> Result<[u8; 3], PrimitiveError> {
    use sha2::{Digest, Sha512};
    let salt = Sha512::digest(ephemeral_pub);
    let info = role_info(role, SEL_LABEL);
    let bytes = hkdf(&salt, shared_secret, &info, 3)?;
    let mut out = [0u8; 3];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn xor_into(dst: &mut [u8], mask: &[u8]) {
    for (d, m) in dst.iter_mut().zip(mask.iter()) {
        *d ^= m;
    }
}

/// Build a real slot: the role's encryption key is present and `chunk_key`
/// is wrapped under its KEK with AES-256-GCM, zero nonce, slot index as AAD.
pub fn seal_slot(
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    shared_secret: &[u8],
    role: Role,
    slot_index: u8,
    chunk_key: &[u8; 32],
) -> Result<[u8; SLOT_LEN], ChunkError> {
    let mask = mask_bytes(ephemeral_pub, shared_secret, role)?;
    let mut masked_point = *ephemeral_pub;
    xor_into(&mut masked_point, &mask);

    let kek = derive_kek(ephemeral_pub, shared_secret, role)?;
    let nonce = [0u8; 16];
    let wrapped_key = aead_seal(&kek, &nonce, &[slot_index], chunk_key)?;

    let selector = selector_bytes(ephemeral_pub, shared_secret, role)?;

    let mut out = [0u8; SLOT_LEN];
    out[0..33].copy_from_slice(&masked_point);
    out[33..33 + WRAPPED_KEY_LEN].copy_from_slice(&wrapped_key);
    out[33 + WRAPPED_KEY_LEN..SLOT_LEN].copy_from_slice(&selector);
    Ok(out)
}

/// Deterministic placeholder for an absent role, keyed only on public data.
pub fn placeholder_slot(
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    slot_index: u8,
) -> Result<[u8; SLOT_LEN], PrimitiveError> {
    let mut info = Vec::with_capacity(PLACEHOLDER_LABEL.len() + 1);
    info.extend_from_slice(PLACEHOLDER_LABEL);
    info.push(slot_index);
    let bytes = hkdf(&[], ephemeral_pub, &info, SLOT_LEN)?;
    let mut out = [0u8; SLOT_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Attempt to open `slot` for `role` given the ECDH shared secret between
/// this role's private key and the message's ephemeral public key. Returns
/// the recovered chunk key, or [`ChunkError::NoUsableSlot`] if the masked
/// point does not unmask to the known ephemeral public key, or the GCM tag
/// fails to verify (wrong role, wrong key, or a placeholder).
pub fn open_slot(
    slot: &[u8; SLOT_LEN],
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    shared_secret: &[u8],
    role: Role,
    slot_index: u8,
) -> Result<[u8; 32], ChunkError> {
    let mask = mask_bytes(ephemeral_pub, shared_secret, role)?;
    let mut unmasked = [0u8; SECP256K1_PUBLIC_LEN];
    unmasked.copy_from_slice(&slot[0..33]);
    xor_into(&mut unmasked, &mask);
    if unmasked != *ephemeral_pub {
        return Err(ChunkError::NoUsableSlot);
    }

    let kek = derive_kek(ephemeral_pub, shared_secret, role)?;
    let nonce = [0u8; 16];
    let wrapped_key = &slot[33..33 + WRAPPED_KEY_LEN];
    let plaintext = aead_open(&kek, &nonce, &[slot_index], wrapped_key)
        .map_err(|_| ChunkError::NoUsableSlot)?;
    if plaintext.len() != 32 {
        return Err(ChunkError::NoUsableSlot);
    }
    let mut chunk_key = [0u8; 32];
    chunk_key.copy_from_slice(&plaintext);
    Ok(chunk_key)
}

/// Build the full 4-slot array for an encrypted chunk, one entry per
/// [`Role::ALL`] in order. `shared_secrets[i]` is `None` for an absent role.
pub fn build_slots(
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    chunk_key: &[u8; 32],
    shared_secrets: &[Option<[u8; 32]>; 4],
) -> Result<[[u8; SLOT_LEN]; 4], ChunkError> {
    let mut slots = [[0u8; SLOT_LEN]; 4];
    for (i, role) in Role::ALL.iter().enumerate() {
        slots[i] = match &shared_secrets[i] {
            Some(shared) => seal_slot(ephemeral_pub, shared, *role, i as u8, chunk_key)?,
            None => placeholder_slot(ephemeral_pub, i as u8)?,
        };
    }
    Ok(slots)
}

/// Compute the ECDH shared secret for `role` if `role_key` is a private
/// key, otherwise `None` (the role is not ours to use).
pub fn shared_secret_for(ephemeral: &Secp256k1Key, role_key: &Secp256k1Key) -> Option<[u8; 32]> {
    if !role_key.has_private() {
        return None;
    }
    role_key.compute_shared(ephemeral).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_and_open_recover_the_chunk_key() {
        let ephemeral = Secp256k1Key::generate();
        let role_key = Secp256k1Key::generate();
        let ephemeral_pub = ephemeral.public_bytes();
        let shared = role_key.compute_shared(&ephemeral).unwrap();

        let chunk_key = [0x5Au8; 32];
        let slot = seal_slot(&ephemeral_pub, &shared, Role::Recipient, 3, &chunk_key).unwrap();
        let recovered = open_slot(&slot, &ephemeral_pub, &shared, Role::Recipient, 3).unwrap();
        assert_eq!(recovered, chunk_key);
    }

    #[test]
    fn wrong_role_fails_to_open() {
        let ephemeral = Secp256k1Key::generate();
        let role_key = Secp256k1Key::generate();
        let ephemeral_pub = ephemeral.public_bytes();
        let shared = role_key.compute_shared(&ephemeral).unwrap();

        let chunk_key = [0x5Au8; 32];
        let slot = seal_slot(&ephemeral_pub, &shared, Role::Recipient, 3, &chunk_key).unwrap();
        assert!(open_slot(&slot, &ephemeral_pub, &shared, Role::Author, 3).is_err());
    }

    #[test]
    fn wrong_slot_index_fails_to_open() {
        let ephemeral = Secp256k1Key::generate();
        let role_key = Secp256k1Key::generate();
        let ephemeral_pub = ephemeral.public_bytes();
        let shared = role_key.compute_shared(&ephemeral).unwrap();

        let chunk_key = [0x5Au8; 32];
        let slot = seal_slot(&ephemeral_pub, &shared, Role::Recipient, 3, &chunk_key).unwrap();
        assert!(open_slot(&slot, &ephemeral_pub, &shared, Role::Recipient, 0).is_err());
    }

    #[test]
    fn placeholder_does_not_open_for_any_shared_secret() {
        let ephemeral = Secp256k1Key::generate();
        let role_key = Secp256k1Key::generate();
        let ephemeral_pub = ephemeral.public_bytes();
        let shared = role_key.compute_shared(&ephemeral).unwrap();

        let placeholder = placeholder_slot(&ephemeral_pub, 2).unwrap();
        assert!(open_slot(&placeholder, &ephemeral_pub, &shared, Role::Destination, 2).is_err());
    }

    #[test]
    fn placeholder_is_deterministic() {
        let ephemeral = Secp256k1Key::generate();
        let ephemeral_pub = ephemeral.public_bytes();
        let a = placeholder_slot(&ephemeral_pub, 1).unwrap();
        let b = placeholder_slot(&ephemeral_pub, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn build_slots_fills_all_four_in_order() {
        let ephemeral = Secp256k1Key::generate();
        let ephemeral_pub = ephemeral.public_bytes();
        let recipient_key = Secp256k1Key::generate();
        let shared = recipient_key.compute_shared(&ephemeral).unwrap();

        let chunk_key = [0x11u8; 32];
        let mut secrets: [Option<[u8; 32]>; 4] = [None, None, None, None];
        secrets[3] = Some(shared);

        let slots = build_slots(&ephemeral_pub, &chunk_key, &secrets).unwrap();
        assert!(open_slot(&slots[3], &ephemeral_pub, &shared, Role::Recipient, 3).is_ok());
        assert!(open_slot(&slots[0], &ephemeral_pub, &shared, Role::Author, 0).is_err());
    }
}
