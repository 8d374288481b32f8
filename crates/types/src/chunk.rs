//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Message chunk type tags and the chunk flags bitmask.

use serde::{Deserialize, Serialize};

/// A message chunk's 1-byte type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChunkType {
    Tracing = 0,
    Ephemeral = 1,
    Origin = 2,
    Destination = 3,
    Common = 32,
    Headers = 33,
    Body = 48,
    SignatureTree = 224,
    SignatureUser = 225,
    SignatureOrigin = 254,
    SignatureDestination = 255,
}

impl ChunkType {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => ChunkType::Tracing,
            1 => ChunkType::Ephemeral,
            2 => ChunkType::Origin,
            3 => ChunkType::Destination,
            32 => ChunkType::Common,
            33 => ChunkType::Headers,
            48 => ChunkType::Body,
            224 => ChunkType::SignatureTree,
            225 => ChunkType::SignatureUser,
            254 => ChunkType::SignatureOrigin,
            255 => ChunkType::SignatureDestination,
            _ => return None,
        })
    }

    /// Whether this chunk type is one of the trailing signature-block chunks,
    /// which must always sort last regardless of numeric tag order.
    pub const fn is_signature_block(self) -> bool {
        matches!(
            self,
            ChunkType::SignatureTree
                | ChunkType::SignatureUser
                | ChunkType::SignatureOrigin
                | ChunkType::SignatureDestination
        )
    }
}

/// Bitmask flags carried by an encrypted chunk's 1-byte flags field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkFlags(pub u8);

impl ChunkFlags {
    pub const NONE: u8 = 0x00;
    pub const ALTERNATE_PADDING: u8 = 0x01;
    pub const ALTERNATE_ENCRYPT: u8 = 0x02;
    pub const COMPRESSED: u8 = 0x04;
    pub const SPANNING: u8 = 0x80;

    pub const fn has_alternate_padding(self) -> bool {
        self.0 & Self::ALTERNATE_PADDING != 0
    }

    pub const fn has_spanning(self) -> bool {
        self.0 & Self::SPANNING != 0
    }

    pub const fn with(self, bit: u8) -> Self {
        Self(self.0 | bit)
    }
}

impl From<u8> for ChunkFlags {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<ChunkFlags> for u8 {
    fn from(value: ChunkFlags) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_type_round_trips() {
        for &raw in &[0u8, 1, 2, 3, 32, 33, 48, 224, 225, 254, 255] {
            let ty = ChunkType::from_u8(raw).expect("known chunk type");
            assert_eq!(ty as u8, raw);
        }
        assert_eq!(ChunkType::from_u8(99), None);
    }

    #[test]
    fn signature_block_chunks_identified() {
        assert!(ChunkType::SignatureTree.is_signature_block());
        assert!(ChunkType::SignatureDestination.is_signature_block());
        assert!(!ChunkType::Body.is_signature_block());
        assert!(!ChunkType::Ephemeral.is_signature_block());
    }

    #[test]
    fn flags_roundtrip_and_compose() {
        let flags = ChunkFlags::default().with(ChunkFlags::SPANNING);
        assert!(flags.has_spanning());
        assert!(!flags.has_alternate_padding());
        let raw: u8 = flags.into();
        assert_eq!(ChunkFlags::from(raw), flags);
    }
}
