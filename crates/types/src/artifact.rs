//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Artifact magic codes, armor labels, and field tag tables.
//!
//! Values are fixed by the originating format and are load-bearing for
//! interoperability; they are not configuration.

use serde::{Deserialize, Serialize};

/// The sixteen artifact kinds the format distinguishes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    OrgSignet,
    OrgKey,
    OrgKeyEncrypted,
    UserSigningRequest,
    UserSignet,
    UserKey,
    UserKeyEncrypted,
    MessageEncrypted,
    MessageSent,
    MessageDraft,
    MessageNaked,
    MessageBounce,
    MessageForward,
    MessageAbuse,
    BinaryObject,
    ProtocolTicket,
}

impl ArtifactKind {
    pub const ALL: &'static [ArtifactKind] = &[
        ArtifactKind::OrgSignet,
        ArtifactKind::OrgKey,
        ArtifactKind::OrgKeyEncrypted,
        ArtifactKind::UserSigningRequest,
        ArtifactKind::UserSignet,
        ArtifactKind::UserKey,
        ArtifactKind::UserKeyEncrypted,
        ArtifactKind::MessageEncrypted,
        ArtifactKind::MessageSent,
        ArtifactKind::MessageDraft,
        ArtifactKind::MessageNaked,
        ArtifactKind::MessageBounce,
        ArtifactKind::MessageForward,
        ArtifactKind::MessageAbuse,
        ArtifactKind::BinaryObject,
        ArtifactKind::ProtocolTicket,
    ];

    /// The 2-byte big-endian magic code identifying this artifact on the wire.
    pub const fn magic(self) -> u16 {
        match self {
            ArtifactKind::OrgSignet => 1776,
            ArtifactKind::OrgKey => 1952,
            ArtifactKind::OrgKeyEncrypted => 1947,
            ArtifactKind::UserSigningRequest => 1215,
            ArtifactKind::UserSignet => 1789,
            ArtifactKind::UserKey => 2013,
            ArtifactKind::UserKeyEncrypted => 1976,
            ArtifactKind::MessageEncrypted => 1847,
            ArtifactKind::MessageSent => 1851,
            ArtifactKind::MessageDraft => 1861,
            ArtifactKind::MessageNaked => 1908,
            ArtifactKind::MessageBounce => 1931,
            ArtifactKind::MessageForward => 1948,
            ArtifactKind::MessageAbuse => 2001,
            ArtifactKind::BinaryObject => 1837,
            ArtifactKind::ProtocolTicket => 1841,
        }
    }

    /// The label wrapped by `-----BEGIN <LABEL>-----` / `-----END <LABEL>-----`.
    pub const fn armor_label(self) -> &'static str {
        match self {
            ArtifactKind::OrgSignet => "ORGANIZATIONAL SIGNET",
            ArtifactKind::OrgKey => "ORGANIZATIONAL KEY",
            ArtifactKind::OrgKeyEncrypted => "ENCRYPTED ORGANIZATIONAL KEY",
            ArtifactKind::UserSigningRequest => "USER SIGNING REQUEST",
            ArtifactKind::UserSignet => "USER SIGNET",
            ArtifactKind::UserKey => "USER KEY",
            ArtifactKind::UserKeyEncrypted => "ENCRYPTED USER KEY",
            ArtifactKind::MessageEncrypted => "ENCRYPTED MESSAGE",
            ArtifactKind::MessageSent => "SENT MESSAGE",
            ArtifactKind::MessageDraft => "DRAFT MESSAGE",
            ArtifactKind::MessageNaked => "NAKED MESSAGE",
            ArtifactKind::MessageBounce => "BOUNCE MESSAGE",
            ArtifactKind::MessageForward => "FORWARD MESSAGE",
            ArtifactKind::MessageAbuse => "ABUSE MESSAGE",
            ArtifactKind::BinaryObject => "BINARY OBJECT",
            ArtifactKind::ProtocolTicket => "PROTOCOL TICKET",
        }
    }

    pub fn from_magic(magic: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.magic() == magic)
    }

    pub fn from_armor_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.armor_label() == label)
    }
}

/// Field tags within a serialized org key / org signet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OrgField {
    PrimarySigningKey = 1,
    SecondarySigningKey = 2,
    EncryptionKey = 3,
    SelfSignature = 4,
    FullSignature = 253,
    Identifier = 254,
    IdentifiableSignature = 255,
}

/// Field tags within a serialized user key / signing request / signet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UserField {
    SigningKey = 1,
    EncryptionKey = 2,
    AlternateEncryptionKey = 3,
    CustodySignature = 4,
    SelfSignature = 5,
    OrgSignature = 6,
    FullSignature = 253,
    Identifier = 254,
    IdentifiableSignature = 255,
}
