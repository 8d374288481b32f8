//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! The signature-tree chunk and the three signatures chained over it.
//!
//! Chunk 224 carries an Ed25519 signature, by the author's signet signing
//! key, over the concatenation of SHA-512 digests of every non-signature
//! chunk's serialized bytes (header included), in file order. Chunks
//! 225/254/255 each carry a signature by the user/origin-org/destination-org
//! signing key over chunk 224's raw payload (the tree signature itself),
//! forming a chain a reader can verify without re-walking the whole message.
//!
//! These four chunks are never encrypted — anyone holding the message can
//! verify authorship and custody without holding any recipient key.

use crate::error::ChunkError;
use crate::primitives::Ed25519Key;
use sealmail_types::chunk::ChunkType;
use sha2::{Digest, Sha512};

const SIGNATURE_LEN: usize = 64;

/// SHA-512 digest of one serialized chunk's bytes (header and body, or
/// header and slots+ciphertext for an encrypted chunk).
pub fn chunk_digest(serialized_chunk: &[u8]) -> [u8; 64] {
    let digest = Sha512::digest(serialized_chunk);
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

fn concat_digests(chunks: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(chunks.len() * 64);
    for chunk in chunks {
        out.extend_from_slice(&chunk_digest(chunk));
    }
    out
}

/// Compute the tree signature over every non-signature chunk's serialized
/// bytes, signed by the author's signet signing key.
pub fn sign_tree(author_signing: &Ed25519Key, chunks: &[&[u8]]) -> Result<[u8; 64], ChunkError> {
    let message = concat_digests(chunks);
    Ok(author_signing.sign(&message)?)
}

/// Verify a tree signature against the chunks it should cover.
pub fn verify_tree(
    author_verifying: &Ed25519Key,
    chunks: &[&[u8]],
    tree_signature: &[u8; 64],
) -> Result<bool, ChunkError> {
    let message = concat_digests(chunks);
    Ok(author_verifying.verify(&message, tree_signature)?)
}

/// Sign over chunk 224's raw payload (the tree signature bytes) with a
/// user or organization signing key, producing chunk 225/254/255's payload.
pub fn sign_over_tree(
    signing_key: &Ed25519Key,
    tree_signature: &[u8; 64],
) -> Result<[u8; 64], ChunkError> {
    Ok(signing_key.sign(tree_signature)?)
}

/// Verify a chunk 225/254/255 signature against chunk 224's payload.
pub fn verify_over_tree(
    verifying_key: &Ed25519Key,
    tree_signature: &[u8; 64],
    signature: &[u8; 64],
) -> Result<bool, ChunkError> {
    Ok(verifying_key.verify(tree_signature, signature)?)
}

/// Frame a signature chunk (224/225/254/255): header plus the raw 64-byte
/// signature, unencrypted.
pub fn encode_signature_chunk(
    chunk_type: ChunkType,
    signature: &[u8; 64],
) -> Result<Vec<u8>, ChunkError> {
    if !chunk_type.is_signature_block() {
        return Err(ChunkError::OutOfOrder);
    }
    let mut out = Vec::with_capacity(4 + SIGNATURE_LEN);
    super::write_header(chunk_type, SIGNATURE_LEN, &mut out)?;
    out.extend_from_slice(signature);
    Ok(out)
}

/// Parse a signature chunk, validating that it carries the expected type
/// and a full 64-byte payload.
pub fn decode_signature_chunk(
    buf: &[u8],
    expected: ChunkType,
) -> Result<[u8; 64], ChunkError> {
    let (chunk_type, len, rest) = super::read_header(buf)?;
    if chunk_type as u8 != expected as u8 {
        return Err(ChunkError::OutOfOrder);
    }
    if len != SIGNATURE_LEN {
        return Err(ChunkError::UnalignedPayload(len));
    }
    let mut signature = [0u8; 64];
    signature.copy_from_slice(&rest[..len]);
    Ok(signature)
}

/// The full chain of signature-block chunks appended after the message
/// body: the tree signature itself, the user's custody signature over it,
/// and either or both org signatures over it.
pub struct SignatureChain {
    pub tree: Vec<u8>,
    pub user: Vec<u8>,
    pub origin: Option<Vec<u8>>,
    pub destination: Option<Vec<u8>>,
}

/// Build the full signature chain for a message: sign the tree with the
/// author key, then sign the tree payload with the user key and whichever
/// org keys are supplied.
pub fn build_chain(
    author_signing: &Ed25519Key,
    user_signing: &Ed25519Key,
    origin_signing: Option<&Ed25519Key>,
    destination_signing: Option<&Ed25519Key>,
    chunks: &[&[u8]],
) -> Result<SignatureChain, ChunkError> {
    let tree_signature = sign_tree(author_signing, chunks)?;
    let tree = encode_signature_chunk(ChunkType::SignatureTree, &tree_signature)?;

    let user_signature = sign_over_tree(user_signing, &tree_signature)?;
    let user = encode_signature_chunk(ChunkType::SignatureUser, &user_signature)?;

    let origin = origin_signing
        .map(|key| -> Result<Vec<u8>, ChunkError> {
            let sig = sign_over_tree(key, &tree_signature)?;
            encode_signature_chunk(ChunkType::SignatureOrigin, &sig)
        })
        .transpose()?;

    let destination = destination_signing
        .map(|key| -> Result<Vec<u8>, ChunkError> {
            let sig = sign_over_tree(key, &tree_signature)?;
            encode_signature_chunk(ChunkType::SignatureDestination, &sig)
        })
        .transpose()?;

    Ok(SignatureChain {
        tree,
        user,
        origin,
        destination,
    })
}

/// Verify the full signature chain against the chunks it covers. Origin and
/// destination org keys are optional: a present chunk with no supplied key
/// to check it against is treated as unverifiable and rejected, since a
/// verifier that received an org signature chunk is expected to know which
/// org issued it.
#[allow(clippy::too_many_arguments)]
pub fn verify_chain(
    author_verifying: &Ed25519Key,
    user_verifying: &Ed25519Key,
    origin_verifying: Option<&Ed25519Key>,
    destination_verifying: Option<&Ed25519Key>,
    chunks: &[&[u8]],
    tree_chunk: &[u8],
    user_chunk: &[u8],
    origin_chunk: Option<&[u8]>,
    destination_chunk: Option<&[u8]>,
) -> Result<(), crate::error::MessageError> {
    use crate::error::MessageError;

    let tree_signature = decode_signature_chunk(tree_chunk, ChunkType::SignatureTree)?;
    if !verify_tree(author_verifying, chunks, &tree_signature)? {
        return Err(MessageError::TreeSignatureInvalid);
    }

    let user_signature = decode_signature_chunk(user_chunk, ChunkType::SignatureUser)?;
    if !verify_over_tree(user_verifying, &tree_signature, &user_signature)? {
        return Err(MessageError::UserSignatureInvalid);
    }

    if let Some(chunk) = origin_chunk {
        let key = origin_verifying.ok_or(MessageError::OrgSignatureInvalid)?;
        let sig = decode_signature_chunk(chunk, ChunkType::SignatureOrigin)?;
        if !verify_over_tree(key, &tree_signature, &sig)? {
            return Err(MessageError::OrgSignatureInvalid);
        }
    }

    if let Some(chunk) = destination_chunk {
        let key = destination_verifying.ok_or(MessageError::OrgSignatureInvalid)?;
        let sig = decode_signature_chunk(chunk, ChunkType::SignatureDestination)?;
        if !verify_over_tree(key, &tree_signature, &sig)? {
            return Err(MessageError::OrgSignatureInvalid);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_signature_verifies_over_same_chunks() {
        let author = Ed25519Key::generate();
        let chunk_a: &[u8] = b"chunk one bytes";
        let chunk_b: &[u8] = b"chunk two bytes, longer";
        let chunks = [chunk_a, chunk_b];

        let sig = sign_tree(&author, &chunks).unwrap();
        assert!(verify_tree(&author, &chunks, &sig).unwrap());
    }

    #[test]
    fn tree_signature_fails_if_a_chunk_changes() {
        let author = Ed25519Key::generate();
        let chunk_a: &[u8] = b"chunk one bytes";
        let chunk_b: &[u8] = b"chunk two bytes, longer";
        let sig = sign_tree(&author, &[chunk_a, chunk_b]).unwrap();

        let tampered: &[u8] = b"chunk TWO bytes, longer";
        assert!(!verify_tree(&author, &[chunk_a, tampered], &sig).unwrap());
    }

    #[test]
    fn signature_chunk_round_trips() {
        let key = Ed25519Key::generate();
        let sig = key.sign(b"hello").unwrap();
        let encoded = encode_signature_chunk(ChunkType::SignatureUser, &sig).unwrap();
        let decoded = decode_signature_chunk(&encoded, ChunkType::SignatureUser).unwrap();
        assert_eq!(decoded, sig);
    }

    #[test]
    fn signature_chunk_rejects_wrong_expected_type() {
        let key = Ed25519Key::generate();
        let sig = key.sign(b"hello").unwrap();
        let encoded = encode_signature_chunk(ChunkType::SignatureOrigin, &sig).unwrap();
        assert!(decode_signature_chunk(&encoded, ChunkType::SignatureDestination).is_err());
    }

    #[test]
    fn full_chain_round_trips_and_verifies() {
        let author = Ed25519Key::generate();
        let user = Ed25519Key::generate();
        let origin = Ed25519Key::generate();
        let destination = Ed25519Key::generate();

        let chunk_a: &[u8] = b"ephemeral chunk bytes";
        let chunk_b: &[u8] = b"body chunk bytes";
        let chunks = [chunk_a, chunk_b];

        let chain = build_chain(
            &author,
            &user,
            Some(&origin),
            Some(&destination),
            &chunks,
        )
        .unwrap();

        verify_chain(
            &author,
            &user,
            Some(&origin),
            Some(&destination),
            &chunks,
            &chain.tree,
            &chain.user,
            chain.origin.as_deref(),
            chain.destination.as_deref(),
        )
        .unwrap();
    }

    #[test]
    fn chain_rejects_substituted_user_signature() {
        let author = Ed25519Key::generate();
        let user = Ed25519Key::generate();
        let impostor = Ed25519Key::generate();

        let chunk_a: &[u8] = b"ephemeral chunk bytes";
        let chunks = [chunk_a];

        let chain = build_chain(&author, &impostor, None, None, &chunks).unwrap();

        let result = verify_chain(
            &author,
            &user,
            None,
            None,
            &chunks,
            &chain.tree,
            &chain.user,
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn chain_without_org_signatures_verifies() {
        let author = Ed25519Key::generate();
        let user = Ed25519Key::generate();
        let chunk_a: &[u8] = b"solo chunk";
        let chunks = [chunk_a];

        let chain = build_chain(&author, &user, None, None, &chunks).unwrap();
        verify_chain(
            &author, &user, None, None, &chunks, &chain.tree, &chain.user, None, None,
        )
        .unwrap();
    }
}
