//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! The programmatic façade: one entry point per operation named in the
//! project's external interface, built on the artifact/chunk/message
//! modules beneath it.
//!
//! The source's `alloc`/`set`/`get` triad keyed by a type tag becomes
//! [`Artifact`], a sum type with one variant per artifact class, plus
//! `set`/`get` free functions that parse/serialize it in either encoding.
//! The two process-wide org artifacts are [`PrimeContext`] rather than a
//! global, constructed once by [`start`] and threaded into the calls that
//! need it.

use crate::artifact::{
    self, OrgKey, OrgSignet, UserKey, UserSignet, UserSigningRequest,
};
use crate::chunk::Role;
use crate::codec::armor;
use crate::context::PrimeContext;
use crate::error::{CodecError, PrimeError};
use crate::message;
use crate::primitives::{Ed25519Key, Secp256k1Key};
use sealmail_types::artifact::ArtifactKind;

/// Which of the two wire encodings a `set`/`get` call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Binary,
    Armored,
}

/// The artifact classes the façade hands back and forth. One variant per
/// artifact class, in place of a single struct carrying every field any
/// class might need.
pub enum Artifact {
    OrgKey(OrgKey),
    OrgSignet(OrgSignet),
    UserKey(UserKey),
    UserSigningRequest(UserSigningRequest),
    UserSignet(UserSignet),
    Message(Vec<u8>),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::OrgKey(_) => ArtifactKind::OrgKey,
            Artifact::OrgSignet(_) => ArtifactKind::OrgSignet,
            Artifact::UserKey(_) => ArtifactKind::UserKey,
            Artifact::UserSigningRequest(_) => ArtifactKind::UserSigningRequest,
            Artifact::UserSignet(_) => ArtifactKind::UserSignet,
            Artifact::Message(_) => ArtifactKind::MessageEncrypted,
        }
    }
}

/// Process-wide init: derive the context's signet from the local org's
/// private key. There is no corresponding teardown beyond dropping the
/// returned [`PrimeContext`]; Rust's ownership model makes an explicit
/// `stop()` unnecessary, but one is provided for parity with the external
/// interface and to give call sites an obvious place to log shutdown.
#[tracing::instrument(skip_all)]
pub fn start(org_key: OrgKey) -> Result<PrimeContext, PrimeError> {
    Ok(PrimeContext::new(org_key)?)
}

/// Release the context. A no-op beyond `drop`; private key material is
/// zeroized by the underlying key types regardless.
pub fn stop(ctx: PrimeContext) {
    drop(ctx);
}

/// Parse `bytes` (in the given encoding) into the artifact class `kind`
/// names.
#[tracing::instrument(skip_all, fields(kind = ?kind, encoding = ?encoding))]
pub fn set(bytes: &[u8], encoding: Encoding, kind: ArtifactKind) -> Result<Artifact, PrimeError> {
    let binary = match encoding {
        Encoding::Binary => bytes.to_vec(),
        Encoding::Armored => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| PrimeError::Format(CodecError::InvalidBase64("not UTF-8".into())))?;
            armor::decode(kind.armor_label(), text)?
        }
    };
    Ok(match kind {
        ArtifactKind::OrgKey => Artifact::OrgKey(OrgKey::from_binary(&binary)?),
        ArtifactKind::OrgSignet => Artifact::OrgSignet(OrgSignet::from_binary(&binary)?),
        ArtifactKind::UserSigningRequest => {
            Artifact::UserSigningRequest(UserSigningRequest::from_binary(&binary)?)
        }
        ArtifactKind::UserSignet => Artifact::UserSignet(UserSignet::from_binary(&binary)?),
        ArtifactKind::UserKey => Artifact::UserKey(UserKey::from_binary(&binary)?),
        ArtifactKind::MessageEncrypted => Artifact::Message(binary),
        other => {
            return Err(PrimeError::Input(format!(
                "artifact kind {other:?} has no binary parser"
            )))
        }
    })
}

/// Serialize `artifact` in the given encoding.
#[tracing::instrument(skip_all, fields(encoding = ?encoding))]
pub fn get(artifact: &Artifact, encoding: Encoding) -> Result<Vec<u8>, PrimeError> {
    let binary = match artifact {
        Artifact::OrgKey(key) => key.to_binary()?,
        Artifact::OrgSignet(signet) => signet.to_binary()?,
        Artifact::UserSigningRequest(request) => request.to_binary()?,
        Artifact::UserSignet(signet) => signet.to_binary()?,
        Artifact::UserKey(key) => key.to_binary()?,
        Artifact::Message(bytes) => bytes.clone(),
    };
    Ok(match encoding {
        Encoding::Binary => binary,
        Encoding::Armored => armor::encode(artifact.kind().armor_label(), &binary).into_bytes(),
    })
}

/// Fresh key material for the artifact kind named. Only the two key
/// classes (`OrgKey`, `UserKey`) support zero-argument generation; every
/// other artifact is derived from one of these.
#[tracing::instrument(skip_all, fields(kind = ?kind))]
pub fn key_generate(kind: ArtifactKind) -> Result<Artifact, PrimeError> {
    match kind {
        ArtifactKind::OrgKey => Ok(Artifact::OrgKey(OrgKey::generate()?)),
        ArtifactKind::UserKey => Ok(Artifact::UserKey(UserKey::generate())),
        other => Err(PrimeError::Input(format!(
            "artifact kind {other:?} cannot be freshly generated"
        ))),
    }
}

/// STACIE-wrapped at-rest storage for an org or user key.
pub fn key_encrypt(password: &[u8], key: &Artifact) -> Result<Vec<u8>, PrimeError> {
    let binary = match key {
        Artifact::OrgKey(key) => key.to_binary()?,
        Artifact::UserKey(key) => key.to_binary()?,
        other => {
            return Err(PrimeError::Input(format!(
                "artifact kind {:?} is not a private key",
                other.kind()
            )))
        }
    };
    Ok(artifact::wrap_with_password(&binary, password)?)
}

/// Inverse of [`key_encrypt`]: unwrap and parse into the artifact class
/// `kind` names (`OrgKey` or `UserKey`).
pub fn key_decrypt(password: &[u8], wrapped: &[u8], kind: ArtifactKind) -> Result<Artifact, PrimeError> {
    let binary = artifact::unwrap_with_password(wrapped, password)?;
    Ok(match kind {
        ArtifactKind::OrgKey => Artifact::OrgKey(OrgKey::from_binary(&binary)?),
        ArtifactKind::UserKey => Artifact::UserKey(UserKey::from_binary(&binary)?),
        other => {
            return Err(PrimeError::Input(format!(
                "artifact kind {other:?} is not a private key"
            )))
        }
    })
}

/// Derive the org's public signet from its key.
pub fn signet_generate_org(org_key: &OrgKey) -> Result<OrgSignet, PrimeError> {
    Ok(org_key.to_signet()?)
}

/// Countersign a user signing request into a signet — the user analogue of
/// [`signet_generate_org`], named `request_sign` in the external interface
/// since a user signet is derived from a request, not bare key material.
pub fn request_sign(
    request: &UserSigningRequest,
    request_signing_key: &Ed25519Key,
    ctx: &PrimeContext,
) -> Result<UserSignet, PrimeError> {
    Ok(UserSignet::from_request(
        request,
        request_signing_key,
        &ctx.org_key().signing,
    )?)
}

/// A fresh first-generation or renewal signing request for `user`.
pub fn request_generate(
    user: &UserKey,
    previous: Option<(&Ed25519Key, [u8; 32])>,
) -> Result<UserSigningRequest, PrimeError> {
    Ok(match previous {
        None => UserSigningRequest::generate_first(user)?,
        Some((predecessor, previous_identifier)) => {
            UserSigningRequest::generate_renewal(user, predecessor, previous_identifier)?
        }
    })
}

/// SHA-512 of the canonical serialization, truncated to 32 bytes.
pub fn signet_fingerprint_org(signet: &OrgSignet) -> Result<[u8; 32], PrimeError> {
    Ok(signet.fingerprint()?)
}

pub fn signet_fingerprint_user(signet: &UserSignet) -> Result<[u8; 32], PrimeError> {
    Ok(signet.fingerprint()?)
}

/// Validate an org signet (self-signed; no validator needed).
pub fn signet_validate_org(signet: &OrgSignet) -> Result<bool, PrimeError> {
    Ok(signet.validate()?)
}

/// Validate a user signet against the org signet that countersigned it.
pub fn signet_validate_user(signet: &UserSignet, validator: &OrgSignet) -> Result<bool, PrimeError> {
    Ok(signet.validate(validator)?)
}

/// Validate a renewal signet transitively against its predecessor.
pub fn signet_validate_user_renewal(
    signet: &UserSignet,
    validator: &OrgSignet,
    predecessor_signing: &Ed25519Key,
) -> Result<bool, PrimeError> {
    Ok(signet.validate_with_predecessor(validator, predecessor_signing)?)
}

/// Encrypt a plaintext message into a serialized `ENCRYPTED MESSAGE` artifact.
#[tracing::instrument(skip_all)]
pub fn message_encrypt(
    plaintext: &[u8],
    author: &UserKey,
    origin: Option<&OrgKey>,
    destination: Option<&OrgSignet>,
    recipient: &Secp256k1Key,
) -> Result<Vec<u8>, PrimeError> {
    Ok(message::encrypt(plaintext, author, origin, destination, recipient)?)
}

/// Decrypt a message produced by [`message_encrypt`].
#[tracing::instrument(skip_all)]
pub fn message_decrypt(
    bytes: &[u8],
    role: Role,
    role_key: &Secp256k1Key,
    author_signet: &UserSignet,
    org_signet: Option<&OrgSignet>,
) -> Result<message::DecryptedMessage, PrimeError> {
    Ok(message::decrypt(bytes, role, role_key, author_signet, org_signet)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Role;

    #[test]
    fn start_derives_a_usable_context() {
        let org = OrgKey::generate().unwrap();
        let ctx = start(org).unwrap();
        assert!(signet_validate_org(ctx.org_signet()).unwrap());
    }

    #[test]
    fn set_get_binary_round_trips_org_signet() {
        let org = OrgKey::generate().unwrap();
        let signet = signet_generate_org(&org).unwrap();
        let artifact = Artifact::OrgSignet(signet);
        let bytes = get(&artifact, Encoding::Binary).unwrap();
        let parsed = set(&bytes, Encoding::Binary, ArtifactKind::OrgSignet).unwrap();
        let reencoded = get(&parsed, Encoding::Binary).unwrap();
        assert_eq!(bytes, reencoded);
    }

    #[test]
    fn set_get_armored_round_trips_org_signet() {
        let org = OrgKey::generate().unwrap();
        let signet = signet_generate_org(&org).unwrap();
        let artifact = Artifact::OrgSignet(signet);
        let armored = get(&artifact, Encoding::Armored).unwrap();
        let parsed = set(&armored, Encoding::Armored, ArtifactKind::OrgSignet).unwrap();
        let reencoded = get(&parsed, Encoding::Armored).unwrap();
        assert_eq!(armored, reencoded);
    }

    #[test]
    fn key_generate_rejects_derived_kinds() {
        assert!(key_generate(ArtifactKind::OrgSignet).is_err());
    }

    #[test]
    fn org_key_password_round_trip() {
        let org = OrgKey::generate().unwrap();
        let wrapped = key_encrypt(b"hunter2", &Artifact::OrgKey(org)).unwrap();
        let recovered = key_decrypt(b"hunter2", &wrapped, ArtifactKind::OrgKey).unwrap();
        match recovered {
            Artifact::OrgKey(key) => assert!(key.verify_self().unwrap()),
            _ => panic!("expected an org key"),
        }
    }

    #[test]
    fn user_key_password_round_trip() {
        let user = UserKey::generate();
        let bytes_before = user.to_binary().unwrap();
        let wrapped = key_encrypt(b"hunter2", &Artifact::UserKey(user)).unwrap();
        let recovered = key_decrypt(b"hunter2", &wrapped, ArtifactKind::UserKey).unwrap();
        match recovered {
            Artifact::UserKey(key) => assert_eq!(key.to_binary().unwrap(), bytes_before),
            _ => panic!("expected a user key"),
        }
    }

    #[test]
    fn key_encrypt_rejects_non_key_artifacts() {
        let org = OrgKey::generate().unwrap();
        let signet = signet_generate_org(&org).unwrap();
        assert!(key_encrypt(b"hunter2", &Artifact::OrgSignet(signet)).is_err());
    }

    #[test]
    fn set_get_binary_round_trips_user_key() {
        let user = UserKey::generate();
        let artifact = Artifact::UserKey(user);
        let bytes = get(&artifact, Encoding::Binary).unwrap();
        let parsed = set(&bytes, Encoding::Binary, ArtifactKind::UserKey).unwrap();
        let reencoded = get(&parsed, Encoding::Binary).unwrap();
        assert_eq!(bytes, reencoded);
    }

    #[test]
    fn full_identity_and_message_flow() {
        let org = OrgKey::generate().unwrap();
        let ctx = start(org).unwrap();

        let user = UserKey::generate();
        let request = request_generate(&user, None).unwrap();
        let signet = request_sign(&request, &user.signing, &ctx).unwrap();
        assert!(signet_validate_user(&signet, ctx.org_signet()).unwrap());

        let recipient = Secp256k1Key::generate();
        let recipient_pub = Secp256k1Key::from_public_bytes(&recipient.public_bytes()).unwrap();
        let plaintext = b"Subject: facade test\r\n\r\nbody";
        let message =
            message_encrypt(plaintext, &user, None, None, &recipient_pub).unwrap();

        let decoded = message_decrypt(&message, Role::Recipient, &recipient, &signet, None).unwrap();
        assert_eq!(decoded.plaintext, plaintext);

        stop(ctx);
    }
}
