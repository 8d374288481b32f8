//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Encrypted chunks: the four-slot, padded, signed payload structure
//! shared by the origin/destination/header/body chunk types.
//!
//! The wire `pad` byte is written for layout fidelity but decoding never
//! trusts it: the actual trailing length is derived from the chunk's
//! declared payload length, which is already authenticated by the AEAD
//! tag, avoiding any dependence on a value that cannot by itself express
//! paddings past 255 bytes.

use crate::chunk::slot::{self, Role};
use crate::config::{
    AES_NONCE_LEN, CHUNK_MAX_PAYLOAD, CHUNK_MIN_PAYLOAD_ALTERNATE, CHUNK_MIN_PAYLOAD_STANDARD,
    CHUNK_PAD_ALIGNMENT, SECP256K1_PUBLIC_LEN, SLOT_LEN,
};
use crate::error::ChunkError;
use crate::primitives::{aead_open, aead_seal, Ed25519Key, Secp256k1Key};
use rand_core::{OsRng, RngCore};
use sealmail_types::chunk::{ChunkFlags, ChunkType};

const SIGNATURE_LEN: usize = 64;
const INNER_HEADER_LEN: usize = SIGNATURE_LEN + 3 + 1 + 1; // signature || length || flags || pad
const SLOTS_LEN: usize = SLOT_LEN * 4;
/// Largest plaintext a single physical chunk can carry before the signed,
/// padded, AEAD-sealed, slotted envelope would overflow [`CHUNK_MAX_PAYLOAD`].
const MAX_SPAN_DATA_LEN: usize = CHUNK_MAX_PAYLOAD - SLOTS_LEN - INNER_HEADER_LEN - 16;

/// A decoded encrypted chunk's recovered plaintext.
pub struct EncryptedChunk {
    pub chunk_type: ChunkType,
    pub flags: ChunkFlags,
    pub data: Vec<u8>,
}

fn signed_message(chunk_type: ChunkType, flags: ChunkFlags, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + data.len());
    out.push(chunk_type as u8);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes()[1..]);
    out.push(flags.0);
    out.extend_from_slice(data);
    out
}

fn padded_inner_len(data_len: usize, flags: ChunkFlags) -> usize {
    let floor = if flags.has_alternate_padding() {
        CHUNK_MIN_PAYLOAD_ALTERNATE
    } else {
        CHUNK_MIN_PAYLOAD_STANDARD
    };
    let total = INNER_HEADER_LEN + data_len;
    let target = total.max(floor);
    target.div_ceil(CHUNK_PAD_ALIGNMENT) * CHUNK_PAD_ALIGNMENT
}

/// Per-role encryption targets for one encrypted chunk: `None` leaves the
/// slot a placeholder.
pub struct Recipients<'a> {
    pub author: Option<&'a Secp256k1Key>,
    pub origin: Option<&'a Secp256k1Key>,
    pub destination: Option<&'a Secp256k1Key>,
    pub recipient: Option<&'a Secp256k1Key>,
}

impl<'a> Recipients<'a> {
    fn as_array(&self) -> [Option<&'a Secp256k1Key>; 4] {
        [self.author, self.origin, self.destination, self.recipient]
    }
}

#[tracing::instrument(skip_all)]
pub fn encode(
    chunk_type: ChunkType,
    flags: ChunkFlags,
    data: &[u8],
    author_signing: &Ed25519Key,
    ephemeral: &Secp256k1Key,
    recipients: &Recipients,
) -> Result<Vec<u8>, ChunkError> {
    let signature = author_signing.sign(&signed_message(chunk_type, flags, data))?;

    let inner_len = padded_inner_len(data.len(), flags);
    let mut inner = Vec::with_capacity(inner_len);
    inner.extend_from_slice(&signature);
    inner.extend_from_slice(&(data.len() as u32).to_be_bytes()[1..]);
    inner.push(flags.0);
    let trailing_len = inner_len - INNER_HEADER_LEN - data.len();
    inner.push((trailing_len % 256) as u8);
    inner.extend_from_slice(data);
    inner.resize(inner_len, 0u8);

    let chunk_key = {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    };
    let nonce = [0u8; AES_NONCE_LEN];
    let aad = [chunk_type as u8];
    let ciphertext = aead_seal(&chunk_key, &nonce, &aad, &inner)?;

    let ephemeral_pub = ephemeral.public_bytes();
    let shared_secrets: [Option<[u8; 32]>; 4] = recipients
        .as_array()
        .map(|maybe_key| maybe_key.and_then(|key| slot::shared_secret_for(ephemeral, key)));
    let slots = slot::build_slots(&ephemeral_pub, &chunk_key, &shared_secrets)?;

    let mut payload = Vec::with_capacity(SLOTS_LEN + ciphertext.len());
    for s in &slots {
        payload.extend_from_slice(s);
    }
    payload.extend_from_slice(&ciphertext);

    let mut out = Vec::with_capacity(4 + payload.len());
    super::write_header(chunk_type, payload.len(), &mut out)?;
    out.extend_from_slice(&payload);
    Ok(out)
}

#[tracing::instrument(skip_all)]
pub fn decode(
    buf: &[u8],
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    role: Role,
    role_key: &Secp256k1Key,
    author_verifying: &Ed25519Key,
) -> Result<EncryptedChunk, ChunkError> {
    let (chunk_type, len, rest) = super::read_header(buf)?;
    let payload = &rest[..len];
    if payload.len() < SLOTS_LEN {
        return Err(ChunkError::Codec(crate::error::CodecError::Truncated));
    }

    let slots_bytes = &payload[..SLOTS_LEN];
    let ciphertext = &payload[SLOTS_LEN..];

    let slot_index = role as usize;
    let mut this_slot = [0u8; SLOT_LEN];
    this_slot.copy_from_slice(&slots_bytes[slot_index * SLOT_LEN..(slot_index + 1) * SLOT_LEN]);

    let ephemeral = Secp256k1Key::from_public_bytes(ephemeral_pub)?;
    let shared = role_key
        .compute_shared(&ephemeral)
        .map_err(|_| ChunkError::NoUsableSlot)?;
    let chunk_key = slot::open_slot(&this_slot, ephemeral_pub, &shared, role, slot_index as u8)?;

    let nonce = [0u8; AES_NONCE_LEN];
    let aad = [chunk_type as u8];
    let inner = aead_open(&chunk_key, &nonce, &aad, ciphertext)?;

    if inner.len() % CHUNK_PAD_ALIGNMENT != 0 {
        return Err(ChunkError::UnalignedPayload(inner.len()));
    }
    if inner.len() < INNER_HEADER_LEN {
        return Err(ChunkError::Codec(crate::error::CodecError::Truncated));
    }

    let signature = &inner[0..64];
    let data_len = u32::from_be_bytes([0, inner[64], inner[65], inner[66]]) as usize;
    let flags = ChunkFlags(inner[67]);
    let data_start = INNER_HEADER_LEN;
    if data_start + data_len > inner.len() {
        return Err(ChunkError::Codec(crate::error::CodecError::Truncated));
    }
    let data = inner[data_start..data_start + data_len].to_vec();

    if !author_verifying.verify(&signed_message(chunk_type, flags, &data), signature)? {
        return Err(ChunkError::ChunkSignatureInvalid);
    }

    Ok(EncryptedChunk {
        chunk_type,
        flags,
        data,
    })
}

fn chunk_byte_len(buf: &[u8]) -> Result<usize, ChunkError> {
    let (_, len, _) = super::read_header(buf)?;
    Ok(4 + len)
}

/// Encode `data` as a chain of one or more physical chunks, setting the
/// spanning flag on every chunk but the last so a reader knows to keep
/// reading. Logical plaintext under [`MAX_SPAN_DATA_LEN`] produces exactly
/// one chunk with no spanning flag set.
#[tracing::instrument(skip_all)]
pub fn encode_spanned(
    chunk_type: ChunkType,
    base_flags: ChunkFlags,
    data: &[u8],
    author_signing: &Ed25519Key,
    ephemeral: &Secp256k1Key,
    recipients: &Recipients,
) -> Result<Vec<u8>, ChunkError> {
    let mut out = Vec::new();
    let mut rest = data;
    loop {
        let (piece, remainder) = if rest.len() > MAX_SPAN_DATA_LEN {
            rest.split_at(MAX_SPAN_DATA_LEN)
        } else {
            (rest, &rest[rest.len()..])
        };
        let flags = if remainder.is_empty() {
            base_flags
        } else {
            ChunkFlags(base_flags.0 | ChunkFlags::SPANNING)
        };
        let encoded = encode(chunk_type, flags, piece, author_signing, ephemeral, recipients)?;
        out.extend_from_slice(&encoded);
        rest = remainder;
        if rest.is_empty() {
            break;
        }
    }
    Ok(out)
}

/// Decode a chain of physical chunks produced by [`encode_spanned`],
/// concatenating their plaintexts. Returns the number of bytes of `buf`
/// consumed by the chain alongside the reassembled chunk.
#[tracing::instrument(skip_all)]
pub fn decode_spanned(
    buf: &[u8],
    ephemeral_pub: &[u8; SECP256K1_PUBLIC_LEN],
    role: Role,
    role_key: &Secp256k1Key,
    author_verifying: &Ed25519Key,
) -> Result<(EncryptedChunk, usize), ChunkError> {
    let mut data = Vec::new();
    let mut chunk_type = None;
    let mut offset = 0;
    loop {
        if offset >= buf.len() {
            return Err(ChunkError::UnterminatedSpan);
        }
        let piece_len = chunk_byte_len(&buf[offset..])?;
        let piece = &buf[offset..offset + piece_len];
        let decoded = decode(piece, ephemeral_pub, role, role_key, author_verifying)?;
        chunk_type.get_or_insert(decoded.chunk_type);
        let spanning = decoded.flags.has_spanning();
        let last_flags = decoded.flags;
        data.extend_from_slice(&decoded.data);
        offset += piece_len;
        if !spanning {
            return Ok((
                EncryptedChunk {
                    chunk_type: chunk_type.unwrap(),
                    flags: last_flags,
                    data,
                },
                offset,
            ));
        }
    }
}
