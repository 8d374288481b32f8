//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! The message assembler: `encrypt()` composes a plaintext into a fully
//! signed, sealed message; `decrypt()` is its inverse.
//!
//! Origin and destination chunks (types 2/3) carry their org's signet
//! fingerprint as payload — a minimal piece of routing metadata the spec
//! leaves unspecified beyond "envelope {ephemeral, origin, destination}".
//! `encrypt` only ever produces the origin org's co-signature (chunk 254):
//! the sending side by construction never holds the destination org's
//! private signing key, so chunk 255 is added later, out of scope here, by
//! whatever process relays the message into the destination org.

use crate::artifact::{OrgKey, OrgSignet, UserKey};
use crate::chunk::encrypted::{self, Recipients};
use crate::chunk::{self, ephemeral::EphemeralChunk, tree, Role};
use crate::codec::{frame_artifact, unframe_artifact};
use crate::config::SECP256K1_PUBLIC_LEN;
use crate::error::{CodecError, MessageError};
use crate::primitives::Secp256k1Key;
use sealmail_types::artifact::ArtifactKind;
use sealmail_types::chunk::{ChunkFlags, ChunkType};

use super::headers;

/// Encrypt `plaintext` into a serialized `ENCRYPTED MESSAGE` artifact.
///
/// `author` signs every chunk and occupies the author slot. `origin`, the
/// sending org's private key, co-signs the tree and occupies the origin
/// slot; `destination`, the receiving org's public signet, occupies the
/// destination slot only. `recipient` is the recipient's public encryption
/// key.
#[tracing::instrument(skip_all)]
pub fn encrypt(
    plaintext: &[u8],
    author: &UserKey,
    origin: Option<&OrgKey>,
    destination: Option<&OrgSignet>,
    recipient: &Secp256k1Key,
) -> Result<Vec<u8>, MessageError> {
    let ephemeral = Secp256k1Key::generate();
    let ephemeral_bytes = EphemeralChunk::from_key(&ephemeral).encode()?;

    let origin_encryption = origin.map(|o| &o.encryption);
    let destination_encryption = destination.map(|d| &d.encryption);

    let recipients = Recipients {
        author: Some(&author.encryption),
        origin: origin_encryption,
        destination: destination_encryption,
        recipient: Some(recipient),
    };

    let mut content = Vec::new();
    content.extend_from_slice(&ephemeral_bytes);

    if let Some(org) = origin {
        let fingerprint = org.to_signet()?.fingerprint()?;
        let bytes = encrypted::encode_spanned(
            ChunkType::Origin,
            ChunkFlags::default(),
            &fingerprint,
            &author.signing,
            &ephemeral,
            &recipients,
        )?;
        content.extend_from_slice(&bytes);
    }
    if let Some(org) = destination {
        let fingerprint = org.fingerprint()?;
        let bytes = encrypted::encode_spanned(
            ChunkType::Destination,
            ChunkFlags::default(),
            &fingerprint,
            &author.signing,
            &ephemeral,
            &recipients,
        )?;
        content.extend_from_slice(&bytes);
    }

    let (common, other, body) = headers::split(plaintext);
    content.extend_from_slice(&encrypted::encode_spanned(
        ChunkType::Common,
        ChunkFlags::default(),
        &common,
        &author.signing,
        &ephemeral,
        &recipients,
    )?);
    content.extend_from_slice(&encrypted::encode_spanned(
        ChunkType::Headers,
        ChunkFlags::default(),
        &other,
        &author.signing,
        &ephemeral,
        &recipients,
    )?);
    content.extend_from_slice(&encrypted::encode_spanned(
        ChunkType::Body,
        ChunkFlags::default(),
        &body,
        &author.signing,
        &ephemeral,
        &recipients,
    )?);

    let tree_chunks = chunk::split_physical_chunks(&content)?;
    let origin_signing = origin.map(|o| &o.signing);
    let chain = tree::build_chain(
        &author.signing,
        &author.signing,
        origin_signing,
        None,
        &tree_chunks,
    )?;

    let mut full = content;
    full.extend_from_slice(&chain.tree);
    full.extend_from_slice(&chain.user);
    if let Some(origin_sig) = &chain.origin {
        full.extend_from_slice(origin_sig);
    }
    if let Some(destination_sig) = &chain.destination {
        full.extend_from_slice(destination_sig);
    }

    Ok(frame_artifact(ArtifactKind::MessageEncrypted.magic(), &full))
}

/// A decrypted message's plaintext, reconstructed headers-then-body.
pub struct DecryptedMessage {
    pub plaintext: Vec<u8>,
    pub origin_fingerprint: Option<[u8; 32]>,
    pub destination_fingerprint: Option<[u8; 32]>,
}

/// Decrypt a message produced by [`encrypt`]. `role`/`role_key` identify
/// which of the four recipient slots the caller can open; `author_signet`
/// verifies the per-chunk and user signatures; `org_signet`, if supplied,
/// verifies whichever of the origin/destination org-signature chunks is
/// present (in the common single-hop case, at most one exists).
#[tracing::instrument(skip_all)]
pub fn decrypt(
    message: &[u8],
    role: Role,
    role_key: &Secp256k1Key,
    author_signet: &crate::artifact::UserSignet,
    org_signet: Option<&OrgSignet>,
) -> Result<DecryptedMessage, MessageError> {
    let (magic, payload) = unframe_artifact(message)?;
    if magic != ArtifactKind::MessageEncrypted.magic() {
        return Err(MessageError::Codec(CodecError::BadMagic(magic)));
    }

    let ephemeral_len = chunk::chunk_byte_len(payload)?;
    let ephemeral = EphemeralChunk::decode(&payload[..ephemeral_len])?;
    let ephemeral_pub: [u8; SECP256K1_PUBLIC_LEN] = ephemeral.public_bytes;
    let mut offset = ephemeral_len;

    let author_verifying = &author_signet.signing;

    let mut origin_fingerprint = None;
    let mut destination_fingerprint = None;
    let mut common = Vec::new();
    let mut other = Vec::new();
    let mut body = Vec::new();

    loop {
        if offset >= payload.len() {
            return Err(MessageError::MissingSignatureTree);
        }
        let (next_type, _, _) = chunk::read_header(&payload[offset..])?;
        if next_type.is_signature_block() {
            break;
        }
        let (decoded, consumed) = encrypted::decode_spanned(
            &payload[offset..],
            &ephemeral_pub,
            role,
            role_key,
            author_verifying,
        )?;
        match decoded.chunk_type {
            ChunkType::Origin => {
                origin_fingerprint = Some(to_fingerprint(&decoded.data)?);
            }
            ChunkType::Destination => {
                destination_fingerprint = Some(to_fingerprint(&decoded.data)?);
            }
            ChunkType::Common => common = decoded.data,
            ChunkType::Headers => other = decoded.data,
            ChunkType::Body => body = decoded.data,
            _ => return Err(crate::error::ChunkError::OutOfOrder.into()),
        }
        offset += consumed;
    }

    let content_end = offset;
    let tree_chunks = chunk::split_physical_chunks(&payload[..content_end])?;

    let tree_len = chunk::chunk_byte_len(&payload[offset..])?;
    let tree_chunk = &payload[offset..offset + tree_len];
    offset += tree_len;

    let user_len = chunk::chunk_byte_len(&payload[offset..])?;
    let user_chunk = &payload[offset..offset + user_len];
    offset += user_len;

    let mut origin_chunk = None;
    let mut destination_chunk = None;
    while offset < payload.len() {
        let (next_type, _, _) = chunk::read_header(&payload[offset..])?;
        let len = chunk::chunk_byte_len(&payload[offset..])?;
        match next_type {
            ChunkType::SignatureOrigin => origin_chunk = Some(&payload[offset..offset + len]),
            ChunkType::SignatureDestination => {
                destination_chunk = Some(&payload[offset..offset + len])
            }
            _ => return Err(crate::error::ChunkError::OutOfOrder.into()),
        }
        offset += len;
    }

    let org_verifying = org_signet.map(|s| &s.signing);
    tree::verify_chain(
        author_verifying,
        author_verifying,
        org_verifying,
        org_verifying,
        &tree_chunks,
        tree_chunk,
        user_chunk,
        origin_chunk,
        destination_chunk,
    )?;

    Ok(DecryptedMessage {
        plaintext: headers::join(&common, &other, &body),
        origin_fingerprint,
        destination_fingerprint,
    })
}

fn to_fingerprint(data: &[u8]) -> Result<[u8; 32], MessageError> {
    if data.len() != 32 {
        return Err(MessageError::Codec(CodecError::Truncated));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(data);
    Ok(out)
}
