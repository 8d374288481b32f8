//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! The ephemeral chunk: a message's one-time secp256k1 public key, carried
//! in the clear. Its "encryption" is a no-op by design — every recipient
//! role needs it to re-derive its KEK.

use crate::config::SECP256K1_PUBLIC_LEN;
use crate::error::ChunkError;
use crate::primitives::Secp256k1Key;
use sealmail_types::chunk::ChunkType;

pub struct EphemeralChunk {
    pub public_bytes: [u8; SECP256K1_PUBLIC_LEN],
}

impl EphemeralChunk {
    pub fn from_key(key: &Secp256k1Key) -> Self {
        EphemeralChunk {
            public_bytes: key.public_bytes(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ChunkError> {
        let mut out = Vec::with_capacity(4 + SECP256K1_PUBLIC_LEN);
        super::write_header(ChunkType::Ephemeral, SECP256K1_PUBLIC_LEN, &mut out)?;
        out.extend_from_slice(&self.public_bytes);
        Ok(out)
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ChunkError> {
        let (chunk_type, len, rest) = super::read_header(buf)?;
        if chunk_type != ChunkType::Ephemeral {
            return Err(ChunkError::OutOfOrder);
        }
        if len != SECP256K1_PUBLIC_LEN {
            return Err(ChunkError::UnalignedPayload(len));
        }
        let mut public_bytes = [0u8; SECP256K1_PUBLIC_LEN];
        public_bytes.copy_from_slice(&rest[..len]);
        Ok(EphemeralChunk { public_bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_chunk_round_trips() {
        let key = Secp256k1Key::generate();
        let chunk = EphemeralChunk::from_key(&key);
        let encoded = chunk.encode().unwrap();
        let decoded = EphemeralChunk::decode(&encoded).unwrap();
        assert_eq!(decoded.public_bytes, key.public_bytes());
    }

    #[test]
    fn wrong_chunk_type_is_rejected() {
        let mut buf = Vec::new();
        super::super::write_header(ChunkType::Body, 33, &mut buf).unwrap();
        buf.extend_from_slice(&[0u8; 33]);
        assert!(EphemeralChunk::decode(&buf).is_err());
    }
}
