//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! User key, signing request, and user signet.
//!
//! A signing request's `previous_identifier` (tag 254, the generic
//! "Identifier" field) carries the predecessor signet's fingerprint on
//! renewal requests; it is absent for a first-generation request. This
//! reuses the artifact identifier tag rather than minting a new one, since
//! nothing else occupies it on a transient request artifact.

use crate::codec::tlv::{self, Width};
use crate::codec::{frame_artifact, unframe_artifact};
use crate::error::{ArtifactError, CodecError};
use crate::primitives::{Ed25519Key, Secp256k1Key};
use sealmail_types::artifact::{ArtifactKind, UserField};

fn request_field_bytes(
    signing_pub: &[u8],
    encryption_pub: &[u8],
    alternate_pub: Option<&[u8]>,
) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    tlv::encode_field(UserField::SigningKey as u8, signing_pub, Width::One, &mut out)?;
    tlv::encode_field(UserField::EncryptionKey as u8, encryption_pub, Width::One, &mut out)?;
    if let Some(alternate) = alternate_pub {
        tlv::encode_field(UserField::AlternateEncryptionKey as u8, alternate, Width::One, &mut out)?;
    }
    Ok(out)
}

/// A user's private signing + primary/alternate encryption keys.
pub struct UserKey {
    pub signing: Ed25519Key,
    pub encryption: Secp256k1Key,
    pub alternate_encryption: Option<Secp256k1Key>,
}

impl UserKey {
    pub fn generate() -> Self {
        UserKey {
            signing: Ed25519Key::generate(),
            encryption: Secp256k1Key::generate(),
            alternate_encryption: None,
        }
    }

    pub fn generate_with_alternate() -> Self {
        UserKey {
            signing: Ed25519Key::generate(),
            encryption: Secp256k1Key::generate(),
            alternate_encryption: Some(Secp256k1Key::generate()),
        }
    }

    /// Serialize to the plaintext binary `USER KEY` form, reusing the same
    /// field tags as a signing request but holding private scalars instead
    /// of public points, mirroring [`super::org::OrgKey::to_binary`].
    pub fn to_binary(&self) -> Result<Vec<u8>, ArtifactError> {
        let signing_priv = match &self.signing {
            Ed25519Key::Keypair { secret, .. } => *secret.expose_secret(),
            Ed25519Key::Public(_) => return Err(ArtifactError::MissingField("signing private key")),
        };
        let encryption_priv = match &self.encryption {
            Secp256k1Key::Keypair { secret_bytes, .. } => *secret_bytes.expose_secret(),
            Secp256k1Key::Public(_) => {
                return Err(ArtifactError::MissingField("encryption private key"))
            }
        };

        let mut fields = Vec::new();
        tlv::encode_field(UserField::SigningKey as u8, &signing_priv, Width::One, &mut fields)?;
        tlv::encode_field(UserField::EncryptionKey as u8, &encryption_priv, Width::One, &mut fields)?;
        if let Some(alternate) = &self.alternate_encryption {
            let alternate_priv = match alternate {
                Secp256k1Key::Keypair { secret_bytes, .. } => *secret_bytes.expose_secret(),
                Secp256k1Key::Public(_) => {
                    return Err(ArtifactError::MissingField("alternate encryption private key"))
                }
            };
            tlv::encode_field(UserField::AlternateEncryptionKey as u8, &alternate_priv, Width::One, &mut fields)?;
        }
        Ok(frame_artifact(ArtifactKind::UserKey.magic(), &fields))
    }

    pub fn from_binary(buf: &[u8]) -> Result<Self, ArtifactError> {
        let (magic, payload) = unframe_artifact(buf)?;
        if magic != ArtifactKind::UserKey.magic() {
            return Err(ArtifactError::Codec(CodecError::BadMagic(magic)));
        }
        let fields = tlv::decode_all(payload, |_| Some(Width::One))?;
        tlv::ensure_no_duplicates(&fields)?;

        let signing = field_value(&fields, UserField::SigningKey as u8)
            .ok_or(ArtifactError::MissingField("signing key"))?;
        let encryption = field_value(&fields, UserField::EncryptionKey as u8)
            .ok_or(ArtifactError::MissingField("encryption key"))?;
        let alternate = field_value(&fields, UserField::AlternateEncryptionKey as u8);

        Ok(UserKey {
            signing: Ed25519Key::from_private_bytes(signing)?,
            encryption: Secp256k1Key::from_private_bytes(encryption)?,
            alternate_encryption: alternate.map(Secp256k1Key::from_private_bytes).transpose()?,
        })
    }
}

/// A transient request for an org to countersign a user's public keys into
/// a [`UserSignet`]. First-generation requests are self-custodied; renewal
/// requests carry custody by the predecessor user's signing key.
pub struct UserSigningRequest {
    pub signing: Ed25519Key,
    pub encryption: Secp256k1Key,
    pub alternate_encryption: Option<Secp256k1Key>,
    pub custody_signature: [u8; 64],
    pub previous_identifier: Option<[u8; 32]>,
}

impl UserSigningRequest {
    fn field_bytes(&self) -> Result<Vec<u8>, CodecError> {
        request_field_bytes(
            &self.signing.public_bytes(),
            &self.encryption.public_bytes(),
            self.alternate_encryption.as_ref().map(|k| k.public_bytes()).as_ref().map(|b| b.as_slice()),
        )
    }

    /// First-generation request: the new user custodies their own key.
    #[tracing::instrument(skip_all)]
    pub fn generate_first(user: &UserKey) -> Result<Self, ArtifactError> {
        let bytes = request_field_bytes(
            &user.signing.public_bytes(),
            &user.encryption.public_bytes(),
            user.alternate_encryption.as_ref().map(|k| k.public_bytes()).as_ref().map(|b| b.as_slice()),
        )?;
        let custody_signature = user.signing.sign(&bytes)?;
        Ok(UserSigningRequest {
            signing: Ed25519Key::from_public_bytes(&user.signing.public_bytes())?,
            encryption: Secp256k1Key::from_public_bytes(&user.encryption.public_bytes())?,
            alternate_encryption: user
                .alternate_encryption
                .as_ref()
                .map(|k| Secp256k1Key::from_public_bytes(&k.public_bytes()))
                .transpose()?,
            custody_signature,
            previous_identifier: None,
        })
    }

    /// Renewal request: `predecessor` (the previous generation's signing
    /// key) custodies the new user's key.
    #[tracing::instrument(skip_all)]
    pub fn generate_renewal(
        user: &UserKey,
        predecessor: &Ed25519Key,
        previous_signet_identifier: [u8; 32],
    ) -> Result<Self, ArtifactError> {
        let bytes = request_field_bytes(
            &user.signing.public_bytes(),
            &user.encryption.public_bytes(),
            user.alternate_encryption.as_ref().map(|k| k.public_bytes()).as_ref().map(|b| b.as_slice()),
        )?;
        let custody_signature = predecessor.sign(&bytes)?;
        Ok(UserSigningRequest {
            signing: Ed25519Key::from_public_bytes(&user.signing.public_bytes())?,
            encryption: Secp256k1Key::from_public_bytes(&user.encryption.public_bytes())?,
            alternate_encryption: user
                .alternate_encryption
                .as_ref()
                .map(|k| Secp256k1Key::from_public_bytes(&k.public_bytes()))
                .transpose()?,
            custody_signature,
            previous_identifier: Some(previous_signet_identifier),
        })
    }

    /// Verify the custody signature. `predecessor` must be supplied for a
    /// renewal request and is ignored (may be `None`) for a first-generation
    /// request, where the request's own signing key is the custodian.
    pub fn verify_custody(&self, predecessor: Option<&Ed25519Key>) -> Result<bool, ArtifactError> {
        let bytes = self.field_bytes()?;
        let custodian = match (self.previous_identifier, predecessor) {
            (Some(_), Some(key)) => key,
            (Some(_), None) => return Err(ArtifactError::MissingField("predecessor signing key")),
            (None, _) => &self.signing,
        };
        Ok(custodian.verify(&bytes, &self.custody_signature)?)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, ArtifactError> {
        let mut fields = self.field_bytes()?;
        tlv::encode_field(UserField::CustodySignature as u8, &self.custody_signature, Width::One, &mut fields)?;
        if let Some(previous) = &self.previous_identifier {
            tlv::encode_field(UserField::Identifier as u8, previous, Width::One, &mut fields)?;
        }
        Ok(frame_artifact(ArtifactKind::UserSigningRequest.magic(), &fields))
    }

    pub fn from_binary(buf: &[u8]) -> Result<Self, ArtifactError> {
        let (magic, payload) = unframe_artifact(buf)?;
        if magic != ArtifactKind::UserSigningRequest.magic() {
            return Err(ArtifactError::Codec(CodecError::BadMagic(magic)));
        }
        let fields = tlv::decode_all(payload, |_| Some(Width::One))?;
        tlv::ensure_no_duplicates(&fields)?;

        let signing = field_value(&fields, UserField::SigningKey as u8)
            .ok_or(ArtifactError::MissingField("signing key"))?;
        let encryption = field_value(&fields, UserField::EncryptionKey as u8)
            .ok_or(ArtifactError::MissingField("encryption key"))?;
        let alternate = field_value(&fields, UserField::AlternateEncryptionKey as u8);
        let custody = field_value(&fields, UserField::CustodySignature as u8)
            .ok_or(ArtifactError::MissingField("custody signature"))?;
        let previous = field_value(&fields, UserField::Identifier as u8);

        let mut custody_signature = [0u8; 64];
        if custody.len() != 64 {
            return Err(ArtifactError::BadEnvelope("custody signature wrong length".into()));
        }
        custody_signature.copy_from_slice(custody);

        let previous_identifier = match previous {
            Some(bytes) if bytes.len() == 32 => {
                let mut id = [0u8; 32];
                id.copy_from_slice(bytes);
                Some(id)
            }
            Some(_) => return Err(ArtifactError::BadEnvelope("previous identifier wrong length".into())),
            None => None,
        };

        Ok(UserSigningRequest {
            signing: Ed25519Key::from_public_bytes(signing)?,
            encryption: Secp256k1Key::from_public_bytes(encryption)?,
            alternate_encryption: alternate.map(Secp256k1Key::from_public_bytes).transpose()?,
            custody_signature,
            previous_identifier,
        })
    }
}

/// A countersigned, immutable user signet.
pub struct UserSignet {
    pub signing: Ed25519Key,
    pub encryption: Secp256k1Key,
    pub alternate_encryption: Option<Secp256k1Key>,
    pub custody_signature: [u8; 64],
    pub self_signature: [u8; 64],
    pub org_signature: [u8; 64],
    pub previous_identifier: Option<[u8; 32]>,
}

impl UserSignet {
    fn bytes_up_to_custody(&self) -> Result<Vec<u8>, CodecError> {
        request_field_bytes(
            &self.signing.public_bytes(),
            &self.encryption.public_bytes(),
            self.alternate_encryption.as_ref().map(|k| k.public_bytes()).as_ref().map(|b| b.as_slice()),
        )
    }

    fn bytes_up_to_self_signature(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = self.bytes_up_to_custody()?;
        tlv::encode_field(UserField::CustodySignature as u8, &self.custody_signature, Width::One, &mut out)?;
        Ok(out)
    }

    fn bytes_up_to_org_signature(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = self.bytes_up_to_self_signature()?;
        tlv::encode_field(UserField::SelfSignature as u8, &self.self_signature, Width::One, &mut out)?;
        Ok(out)
    }

    /// Countersign `request` with `org`, producing the resulting user signet.
    #[tracing::instrument(skip_all)]
    pub fn from_request(
        request: &UserSigningRequest,
        request_signing_key: &Ed25519Key,
        org_signing_key: &Ed25519Key,
    ) -> Result<Self, ArtifactError> {
        let mut signet = UserSignet {
            signing: Ed25519Key::from_public_bytes(&request.signing.public_bytes())?,
            encryption: Secp256k1Key::from_public_bytes(&request.encryption.public_bytes())?,
            alternate_encryption: request
                .alternate_encryption
                .as_ref()
                .map(|k| Secp256k1Key::from_public_bytes(&k.public_bytes()))
                .transpose()?,
            custody_signature: request.custody_signature,
            self_signature: [0u8; 64],
            org_signature: [0u8; 64],
            previous_identifier: request.previous_identifier,
        };
        let self_bytes = signet.bytes_up_to_self_signature()?;
        signet.self_signature = request_signing_key.sign(&self_bytes)?;
        let org_bytes = signet.bytes_up_to_org_signature()?;
        signet.org_signature = org_signing_key.sign(&org_bytes)?;
        Ok(signet)
    }

    /// Validate self- and org-signatures, and the custody signature for a
    /// first-generation signet (no predecessor to check against).
    pub fn validate(&self, org: &super::OrgSignet) -> Result<bool, ArtifactError> {
        if self.previous_identifier.is_none() {
            let custody_bytes = self.bytes_up_to_custody()?;
            if !self.signing.verify(&custody_bytes, &self.custody_signature)? {
                return Ok(false);
            }
        }
        self.validate_self_and_org(org)
    }

    /// Full transitive validation for a renewal signet: also checks the
    /// custody signature against the predecessor's signing key.
    pub fn validate_with_predecessor(
        &self,
        org: &super::OrgSignet,
        predecessor_signing: &Ed25519Key,
    ) -> Result<bool, ArtifactError> {
        let custody_bytes = self.bytes_up_to_custody()?;
        if !predecessor_signing.verify(&custody_bytes, &self.custody_signature)? {
            return Ok(false);
        }
        self.validate_self_and_org(org)
    }

    fn validate_self_and_org(&self, org: &super::OrgSignet) -> Result<bool, ArtifactError> {
        let self_bytes = self.bytes_up_to_self_signature()?;
        if !self.signing.verify(&self_bytes, &self.self_signature)? {
            return Ok(false);
        }
        let org_bytes = self.bytes_up_to_org_signature()?;
        Ok(org.signing.verify(&org_bytes, &self.org_signature)?)
    }

    pub fn fingerprint(&self) -> Result<[u8; 32], ArtifactError> {
        let mut fields = self.bytes_up_to_org_signature()?;
        tlv::encode_field(UserField::OrgSignature as u8, &self.org_signature, Width::One, &mut fields)?;
        Ok(super::fingerprint(&fields))
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, ArtifactError> {
        let mut fields = self.bytes_up_to_org_signature()?;
        tlv::encode_field(UserField::OrgSignature as u8, &self.org_signature, Width::One, &mut fields)?;
        if let Some(previous) = &self.previous_identifier {
            tlv::encode_field(UserField::Identifier as u8, previous, Width::One, &mut fields)?;
        }
        Ok(frame_artifact(ArtifactKind::UserSignet.magic(), &fields))
    }

    pub fn from_binary(buf: &[u8]) -> Result<Self, ArtifactError> {
        let (magic, payload) = unframe_artifact(buf)?;
        if magic != ArtifactKind::UserSignet.magic() {
            return Err(ArtifactError::Codec(CodecError::BadMagic(magic)));
        }
        let fields = tlv::decode_all(payload, |_| Some(Width::One))?;
        tlv::ensure_no_duplicates(&fields)?;

        let signing = field_value(&fields, UserField::SigningKey as u8)
            .ok_or(ArtifactError::MissingField("signing key"))?;
        let encryption = field_value(&fields, UserField::EncryptionKey as u8)
            .ok_or(ArtifactError::MissingField("encryption key"))?;
        let alternate = field_value(&fields, UserField::AlternateEncryptionKey as u8);
        let custody = field_value(&fields, UserField::CustodySignature as u8)
            .ok_or(ArtifactError::MissingField("custody signature"))?;
        let self_sig = field_value(&fields, UserField::SelfSignature as u8)
            .ok_or(ArtifactError::MissingField("self-signature"))?;
        let org_sig = field_value(&fields, UserField::OrgSignature as u8)
            .ok_or(ArtifactError::MissingField("org signature"))?;
        let previous = field_value(&fields, UserField::Identifier as u8);

        let sixty_four = |bytes: &[u8], what: &'static str| -> Result<[u8; 64], ArtifactError> {
            if bytes.len() != 64 {
                return Err(ArtifactError::BadEnvelope(format!("{what} wrong length")));
            }
            let mut out = [0u8; 64];
            out.copy_from_slice(bytes);
            Ok(out)
        };

        let previous_identifier = match previous {
            Some(bytes) if bytes.len() == 32 => {
                let mut id = [0u8; 32];
                id.copy_from_slice(bytes);
                Some(id)
            }
            Some(_) => return Err(ArtifactError::BadEnvelope("previous identifier wrong length".into())),
            None => None,
        };

        Ok(UserSignet {
            signing: Ed25519Key::from_public_bytes(signing)?,
            encryption: Secp256k1Key::from_public_bytes(encryption)?,
            alternate_encryption: alternate.map(Secp256k1Key::from_public_bytes).transpose()?,
            custody_signature: sixty_four(custody, "custody signature")?,
            self_signature: sixty_four(self_sig, "self-signature")?,
            org_signature: sixty_four(org_sig, "org signature")?,
            previous_identifier,
        })
    }
}

fn field_value<'a>(fields: &'a [tlv::Field], tag: u8) -> Option<&'a [u8]> {
    fields.iter().find(|f| f.tag == tag).map(|f| f.value.as_slice())
}
