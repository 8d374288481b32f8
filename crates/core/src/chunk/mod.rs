//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! The chunk engine: framing, the ephemeral chunk, encrypted chunks with
//! per-role slots, spanning, and the signature-tree chunk.

pub mod encrypted;
pub mod ephemeral;
pub mod slot;
pub mod tree;

use crate::config::CHUNK_MAX_PAYLOAD;
use crate::error::ChunkError;
use sealmail_types::chunk::ChunkType;

pub use encrypted::EncryptedChunk;
pub use ephemeral::EphemeralChunk;
pub use slot::Role;

/// Write a chunk header: `type (1B) || length (3B BE)`.
pub fn write_header(chunk_type: ChunkType, payload_len: usize, out: &mut Vec<u8>) -> Result<(), ChunkError> {
    if payload_len > CHUNK_MAX_PAYLOAD {
        return Err(ChunkError::PayloadTooLarge(payload_len));
    }
    out.push(chunk_type as u8);
    let be = (payload_len as u32).to_be_bytes();
    out.extend_from_slice(&be[1..]);
    Ok(())
}

/// Read a chunk header, returning the chunk type and declared payload length.
pub fn read_header(buf: &[u8]) -> Result<(ChunkType, usize, &[u8]), ChunkError> {
    if buf.len() < 4 {
        return Err(ChunkError::Codec(crate::error::CodecError::ShortBuffer {
            need: 4,
            have: buf.len(),
        }));
    }
    let chunk_type = ChunkType::from_u8(buf[0])
        .ok_or(ChunkError::Codec(crate::error::CodecError::UnknownTag(buf[0])))?;
    let len = u32::from_be_bytes([0, buf[1], buf[2], buf[3]]) as usize;
    let rest = &buf[4..];
    if rest.len() < len {
        return Err(ChunkError::Codec(crate::error::CodecError::Truncated));
    }
    Ok((chunk_type, len, rest))
}

/// The on-wire length (header plus payload) of one physical chunk at the
/// front of `buf`.
pub fn chunk_byte_len(buf: &[u8]) -> Result<usize, ChunkError> {
    let (_, len, _) = read_header(buf)?;
    Ok(4 + len)
}

/// Walk `buf` front-to-back, splitting it into the byte slices of each
/// physical chunk it contains (header included). Used to feed the
/// signature tree every non-signature chunk's exact serialized bytes,
/// including individual spanning continuation chunks.
pub fn split_physical_chunks(buf: &[u8]) -> Result<Vec<&[u8]>, ChunkError> {
    let mut chunks = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let len = chunk_byte_len(&buf[offset..])?;
        chunks.push(&buf[offset..offset + len]);
        offset += len;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let mut buf = Vec::new();
        write_header(ChunkType::Body, 42, &mut buf).unwrap();
        buf.extend_from_slice(&[0u8; 42]);
        let (ty, len, rest) = read_header(&buf).unwrap();
        assert_eq!(ty, ChunkType::Body);
        assert_eq!(len, 42);
        assert_eq!(rest.len(), 42);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut buf = Vec::new();
        assert!(write_header(ChunkType::Body, CHUNK_MAX_PAYLOAD + 1, &mut buf).is_err());
    }

    #[test]
    fn split_physical_chunks_walks_concatenated_chunks() {
        let mut buf = Vec::new();
        write_header(ChunkType::Ephemeral, 3, &mut buf).unwrap();
        buf.extend_from_slice(&[1, 2, 3]);
        write_header(ChunkType::Body, 2, &mut buf).unwrap();
        buf.extend_from_slice(&[9, 9]);

        let pieces = split_physical_chunks(&buf).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 7);
        assert_eq!(pieces[1].len(), 6);
    }
}
