//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Shared wire constants for the sealmail artifact and message format.
//!
//! This crate holds the canonical vocabulary that both `sealmail-core` and
//! `sealmail-cli` need without depending on the full cryptographic
//! implementation: artifact magic codes and armor labels, message chunk
//! types and flags, and the top-level error kind taxonomy.
//!
//! # Quick start
//!
//! ```rust
//! use sealmail_types::prelude::*;
//!
//! assert_eq!(ArtifactKind::UserSignet.magic(), 1789);
//! assert_eq!(ArtifactKind::UserSignet.armor_label(), "USER SIGNET");
//! assert_eq!(ChunkType::Ephemeral as u8, 1);
//! ```

pub mod artifact;
pub mod chunk;
pub mod error;

pub mod prelude {
    pub use crate::artifact::{ArtifactKind, OrgField, UserField};
    pub use crate::chunk::{ChunkFlags, ChunkType};
    pub use crate::error::ErrorKind;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn artifact_round_trips_through_magic() {
        for kind in ArtifactKind::ALL {
            assert_eq!(ArtifactKind::from_magic(kind.magic()), Some(*kind));
        }
    }

    #[test]
    fn chunk_type_ordering_matches_spec() {
        assert!((ChunkType::Ephemeral as u8) < (ChunkType::Common as u8));
        assert!((ChunkType::Common as u8) < (ChunkType::Body as u8));
        assert!((ChunkType::Body as u8) < (ChunkType::SignatureTree as u8));
    }
}
