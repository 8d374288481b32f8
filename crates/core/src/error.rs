//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Unified error hierarchy for the sealmail workspace.
//!
//! [`PrimeError`] is the umbrella type every public operation returns. Each
//! variant wraps a component-specific error enum and maps onto one of the
//! six kinds in [`sealmail_types::error::ErrorKind`].

use sealmail_types::error::ErrorKind;
use thiserror::Error;

/// Top-level error type for all sealmail operations.
#[derive(Error, Debug)]
pub enum PrimeError {
    #[error("format error: {0}")]
    Format(#[from] CodecError),

    #[error("cryptographic error: {0}")]
    Crypto(#[from] PrimitiveError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("chunk error: {0}")]
    Chunk(#[from] ChunkError),

    #[error("message error: {0}")]
    Message(#[from] MessageError),

    #[error("policy error: {0}")]
    Policy(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("input error: {0}")]
    Input(String),

    #[error("operation attempted before start()")]
    State,
}

impl PrimeError {
    /// The coarse-grained kind a caller should branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrimeError::Format(_) => ErrorKind::Format,
            PrimeError::Crypto(_) => ErrorKind::Crypto,
            PrimeError::Artifact(e) => e.kind(),
            PrimeError::Chunk(e) => e.kind(),
            PrimeError::Message(e) => e.kind(),
            PrimeError::Policy(_) => ErrorKind::Policy,
            PrimeError::Resource(_) => ErrorKind::Resource,
            PrimeError::Input(_) => ErrorKind::Input,
            PrimeError::State => ErrorKind::State,
        }
    }

    /// A single-line human description, suitable for a façade error buffer.
    pub fn describe(&self) -> String {
        format!("[{}] {}", self.kind(), self)
    }
}

/// Errors from the TLV / armor / debug-form codec.
#[derive(Error, Debug, Clone)]
pub enum CodecError {
    #[error("declared length {declared} exceeds width {width_bytes} bytes")]
    LengthOverflow { declared: u64, width_bytes: u8 },

    #[error("field payload extends past the enclosing buffer")]
    Truncated,

    #[error("buffer too short: need at least {need} bytes, have {have}")]
    ShortBuffer { need: usize, have: usize },

    #[error("unknown field tag {0}")]
    UnknownTag(u8),

    #[error("duplicate field tag {0}")]
    DuplicateTag(u8),

    #[error("bad artifact magic code {0}")]
    BadMagic(u16),

    #[error("armor missing BEGIN line")]
    ArmorMissingHeader,

    #[error("armor missing END line")]
    ArmorMissingFooter,

    #[error("armor label {found:?} does not match expected {expected:?}")]
    ArmorLabelMismatch { expected: String, found: String },

    #[error("invalid base64 in armored body: {0}")]
    InvalidBase64(String),
}

/// Errors from the primitives adapter (Ed25519, secp256k1, AEAD, HKDF, STACIE).
#[derive(Error, Debug, Clone)]
pub enum PrimitiveError {
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("invalid signature length: expected {expected}, got {got}")]
    InvalidSignatureLength { expected: usize, got: usize },

    #[error("key material rejected by underlying curve implementation: {0}")]
    InvalidKeyEncoding(String),

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("AEAD seal failed: {0}")]
    SealFailed(String),

    #[error("AEAD open failed: authentication tag mismatch")]
    OpenFailed,

    #[error("HKDF expand failed: requested length {0} too large")]
    HkdfLengthInvalid(usize),

    #[error("STACIE round count {0} out of range [8, 16777215]")]
    StacieRoundsOutOfRange(u32),

    #[error("ECDH produced a degenerate (all-zero) shared secret")]
    DegenerateSharedSecret,
}

/// Errors from the artifact model (keys, signets, signing requests).
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("crypto error: {0}")]
    Crypto(#[from] PrimitiveError),

    #[error("signature does not verify: {0}")]
    SignatureInvalid(&'static str),

    #[error("required field {0} is missing")]
    MissingField(&'static str),

    #[error("password-wrapped key envelope is malformed: {0}")]
    BadEnvelope(String),

    #[error("validator type mismatch: expected an org signet")]
    WrongValidatorType,
}

impl ArtifactError {
    fn kind(&self) -> ErrorKind {
        match self {
            ArtifactError::Codec(_) => ErrorKind::Format,
            ArtifactError::Crypto(_) => ErrorKind::Crypto,
            ArtifactError::SignatureInvalid(_) => ErrorKind::Crypto,
            ArtifactError::MissingField(_) => ErrorKind::Format,
            ArtifactError::BadEnvelope(_) => ErrorKind::Format,
            ArtifactError::WrongValidatorType => ErrorKind::Input,
        }
    }
}

/// Errors from the chunk engine (framing, slots, padding, spanning, tree).
#[derive(Error, Debug, Clone)]
pub enum ChunkError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("crypto error: {0}")]
    Crypto(#[from] PrimitiveError),

    #[error("chunk payload length {0} is not a multiple of 16")]
    UnalignedPayload(usize),

    #[error("chunk payload length {0} exceeds 2^24 - 1")]
    PayloadTooLarge(usize),

    #[error("no recipient slot for this role could be unwrapped")]
    NoUsableSlot,

    #[error("all four slots are placeholders; chunk carries no key material")]
    AllSlotsEmpty,

    #[error("chunk signature does not verify")]
    ChunkSignatureInvalid,

    #[error("chunk out of the required type ordering")]
    OutOfOrder,

    #[error("spanning chain is missing its terminating chunk")]
    UnterminatedSpan,
}

impl ChunkError {
    fn kind(&self) -> ErrorKind {
        match self {
            ChunkError::Codec(_) => ErrorKind::Format,
            ChunkError::Crypto(_) => ErrorKind::Crypto,
            ChunkError::ChunkSignatureInvalid => ErrorKind::Crypto,
            ChunkError::NoUsableSlot | ChunkError::AllSlotsEmpty => ErrorKind::Crypto,
            ChunkError::UnalignedPayload(_)
            | ChunkError::PayloadTooLarge(_)
            | ChunkError::OutOfOrder
            | ChunkError::UnterminatedSpan => ErrorKind::Format,
        }
    }
}

/// Errors from the message assembler (encrypt/decrypt orchestration).
#[derive(Error, Debug, Clone)]
pub enum MessageError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("chunk error: {0}")]
    Chunk(#[from] ChunkError),

    #[error("ephemeral chunk missing or duplicated")]
    MissingEphemeral,

    #[error("signature tree chunk missing")]
    MissingSignatureTree,

    #[error("tree signature does not verify")]
    TreeSignatureInvalid,

    #[error("user signature over the tree does not verify")]
    UserSignatureInvalid,

    #[error("org signature over the tree does not verify")]
    OrgSignatureInvalid,

    #[error("no applicable recipient role supplied for decryption")]
    NoApplicableRole,
}

impl MessageError {
    fn kind(&self) -> ErrorKind {
        match self {
            MessageError::Codec(_) => ErrorKind::Format,
            MessageError::Artifact(e) => e.kind(),
            MessageError::Chunk(e) => e.kind(),
            MessageError::MissingEphemeral | MessageError::MissingSignatureTree => {
                ErrorKind::Format
            }
            MessageError::TreeSignatureInvalid
            | MessageError::UserSignatureInvalid
            | MessageError::OrgSignatureInvalid => ErrorKind::Crypto,
            MessageError::NoApplicableRole => ErrorKind::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mapping_is_stable() {
        assert_eq!(
            PrimeError::Crypto(PrimitiveError::SignatureInvalid).kind(),
            ErrorKind::Crypto
        );
        assert_eq!(
            PrimeError::Format(CodecError::Truncated).kind(),
            ErrorKind::Format
        );
        assert_eq!(PrimeError::State.kind(), ErrorKind::State);
    }

    #[test]
    fn describe_includes_kind_prefix() {
        let err = PrimeError::Policy("round count too small".into());
        assert!(err.describe().starts_with("[Policy]"));
    }
}
