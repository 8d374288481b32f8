//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Organizational key and organizational signet.

use crate::codec::tlv::{self, Width};
use crate::codec::{frame_artifact, unframe_artifact};
use crate::error::{ArtifactError, CodecError};
use crate::primitives::{Ed25519Key, Secp256k1Key};
use sealmail_types::artifact::{ArtifactKind, OrgField};

fn signing_bytes(
    signing_pub: &[u8],
    secondary: Option<&[u8]>,
    encryption_pub: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    tlv::encode_field(OrgField::PrimarySigningKey as u8, signing_pub, Width::One, &mut out)?;
    if let Some(secondary) = secondary {
        tlv::encode_field(OrgField::SecondarySigningKey as u8, secondary, Width::One, &mut out)?;
    }
    tlv::encode_field(OrgField::EncryptionKey as u8, encryption_pub, Width::One, &mut out)?;
    Ok(out)
}

/// The organization's private signing + encryption key pair, as held at
/// rest by the local process. `secondary` is a reserved field, never
/// populated by [`OrgKey::generate`].
pub struct OrgKey {
    pub signing: Ed25519Key,
    pub secondary: Option<Vec<u8>>,
    pub encryption: Secp256k1Key,
    pub self_signature: [u8; 64],
}

impl OrgKey {
    #[tracing::instrument(skip_all)]
    pub fn generate() -> Result<Self, ArtifactError> {
        let signing = Ed25519Key::generate();
        let encryption = Secp256k1Key::generate();
        let self_signature = sign_self(&signing, None, &encryption)?;
        Ok(OrgKey {
            signing,
            secondary: None,
            encryption,
            self_signature,
        })
    }

    pub fn verify_self(&self) -> Result<bool, ArtifactError> {
        let bytes = signing_bytes(
            &self.signing.public_bytes(),
            self.secondary.as_deref(),
            &self.encryption.public_bytes(),
        )?;
        Ok(self.signing.verify(&bytes, &self.self_signature)?)
    }

    /// Derive the public org signet from this key.
    pub fn to_signet(&self) -> Result<OrgSignet, ArtifactError> {
        Ok(OrgSignet {
            signing: Ed25519Key::from_public_bytes(&self.signing.public_bytes())?,
            secondary: self.secondary.clone(),
            encryption: Secp256k1Key::from_public_bytes(&self.encryption.public_bytes())?,
            self_signature: self.self_signature,
        })
    }

    /// Serialize to the plaintext binary `ORGANIZATIONAL KEY` form. Private
    /// scalars are stored in the clear here; callers needing at-rest
    /// protection wrap this with [`crate::artifact::wrap_with_password`].
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
        tlv::encode_field(OrgField::PrimarySigningKey as u8, &signing_priv, Width::One, &mut fields)?;
        if let Some(secondary) = &self.secondary {
            tlv::encode_field(OrgField::SecondarySigningKey as u8, secondary, Width::One, &mut fields)?;
        }
        tlv::encode_field(OrgField::EncryptionKey as u8, &encryption_priv, Width::One, &mut fields)?;
        tlv::encode_field(OrgField::SelfSignature as u8, &self.self_signature, Width::One, &mut fields)?;
        Ok(frame_artifact(ArtifactKind::OrgKey.magic(), &fields))
    }

    pub fn from_binary(buf: &[u8]) -> Result<Self, ArtifactError> {
        let (magic, payload) = unframe_artifact(buf)?;
        if magic != ArtifactKind::OrgKey.magic() {
            return Err(ArtifactError::Codec(CodecError::BadMagic(magic)));
        }
        let fields = tlv::decode_all(payload, |_| Some(Width::One))?;
        tlv::ensure_no_duplicates(&fields)?;

        let signing_bytes = field_value(&fields, OrgField::PrimarySigningKey as u8)
            .ok_or(ArtifactError::MissingField("primary signing key"))?;
        let secondary = field_value(&fields, OrgField::SecondarySigningKey as u8).map(|v| v.to_vec());
        let encryption_bytes = field_value(&fields, OrgField::EncryptionKey as u8)
            .ok_or(ArtifactError::MissingField("encryption key"))?;
        let self_signature_bytes = field_value(&fields, OrgField::SelfSignature as u8)
            .ok_or(ArtifactError::MissingField("self-signature"))?;

        let mut self_signature = [0u8; 64];
        if self_signature_bytes.len() != 64 {
            return Err(ArtifactError::BadEnvelope("self-signature wrong length".into()));
        }
        self_signature.copy_from_slice(self_signature_bytes);

        let org_key = OrgKey {
            signing: Ed25519Key::from_private_bytes(signing_bytes)?,
            secondary,
            encryption: Secp256k1Key::from_private_bytes(encryption_bytes)?,
            self_signature,
        };
        if !org_key.verify_self()? {
            return Err(ArtifactError::SignatureInvalid("org key self-signature"));
        }
        Ok(org_key)
    }
}

/// The organization's public signet: signing/encryption public keys plus a
/// self-signature. Immutable once constructed.
pub struct OrgSignet {
    pub signing: Ed25519Key,
    pub secondary: Option<Vec<u8>>,
    pub encryption: Secp256k1Key,
    pub self_signature: [u8; 64],
}

impl OrgSignet {
    fn field_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut fields = Vec::new();
        tlv::encode_field(
            OrgField::PrimarySigningKey as u8,
            &self.signing.public_bytes(),
            Width::One,
            &mut fields,
        )?;
        if let Some(secondary) = &self.secondary {
            tlv::encode_field(OrgField::SecondarySigningKey as u8, secondary, Width::One, &mut fields)?;
        }
        tlv::encode_field(
            OrgField::EncryptionKey as u8,
            &self.encryption.public_bytes(),
            Width::One,
            &mut fields,
        )?;
        tlv::encode_field(OrgField::SelfSignature as u8, &self.self_signature, Width::One, &mut fields)?;
        Ok(fields)
    }

    /// `validate(signet, validator)` — for an org signet, `validator` is
    /// ignored (self-signed).
    pub fn validate(&self) -> Result<bool, ArtifactError> {
        let bytes = signing_bytes(
            &self.signing.public_bytes(),
            self.secondary.as_deref(),
            &self.encryption.public_bytes(),
        )?;
        Ok(self.signing.verify(&bytes, &self.self_signature)?)
    }

    pub fn fingerprint(&self) -> Result<[u8; 32], ArtifactError> {
        let fields = self.field_bytes()?;
        Ok(super::fingerprint(&fields))
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, ArtifactError> {
        let fields = self.field_bytes()?;
        Ok(frame_artifact(ArtifactKind::OrgSignet.magic(), &fields))
    }

    pub fn from_binary(buf: &[u8]) -> Result<Self, ArtifactError> {
        let (magic, payload) = unframe_artifact(buf)?;
        if magic != ArtifactKind::OrgSignet.magic() {
            return Err(ArtifactError::Codec(CodecError::BadMagic(magic)));
        }
        let fields = tlv::decode_all(payload, |_| Some(Width::One))?;
        tlv::ensure_no_duplicates(&fields)?;

        let signing_bytes = field_value(&fields, OrgField::PrimarySigningKey as u8)
            .ok_or(ArtifactError::MissingField("primary signing key"))?;
        let secondary = field_value(&fields, OrgField::SecondarySigningKey as u8).map(|v| v.to_vec());
        let encryption_bytes = field_value(&fields, OrgField::EncryptionKey as u8)
            .ok_or(ArtifactError::MissingField("encryption key"))?;
        let self_signature_bytes = field_value(&fields, OrgField::SelfSignature as u8)
            .ok_or(ArtifactError::MissingField("self-signature"))?;

        let mut self_signature = [0u8; 64];
        if self_signature_bytes.len() != 64 {
            return Err(ArtifactError::BadEnvelope("self-signature wrong length".into()));
        }
        self_signature.copy_from_slice(self_signature_bytes);

        let signet = OrgSignet {
            signing: Ed25519Key::from_public_bytes(signing_bytes)?,
            secondary,
            encryption: Secp256k1Key::from_public_bytes(encryption_bytes)?,
            self_signature,
        };
        if !signet.validate()? {
            return Err(ArtifactError::SignatureInvalid("org signet self-signature"));
        }
        Ok(signet)
    }
}

fn sign_self(
    signing: &Ed25519Key,
    secondary: Option<&[u8]>,
    encryption: &Secp256k1Key,
) -> Result<[u8; 64], ArtifactError> {
    let bytes = signing_bytes(&signing.public_bytes(), secondary, &encryption.public_bytes())?;
    Ok(signing.sign(&bytes)?)
}

fn field_value<'a>(fields: &'a [tlv::Field], tag: u8) -> Option<&'a [u8]> {
    fields.iter().find(|f| f.tag == tag).map(|f| f.value.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_self_verifying_key() {
        let key = OrgKey::generate().unwrap();
        assert!(key.verify_self().unwrap());
    }

    #[test]
    fn signet_derived_from_key_validates() {
        let key = OrgKey::generate().unwrap();
        let signet = key.to_signet().unwrap();
        assert!(signet.validate().unwrap());
    }

    #[test]
    fn org_key_binary_round_trips() {
        let key = OrgKey::generate().unwrap();
        let bytes = key.to_binary().unwrap();
        let parsed = OrgKey::from_binary(&bytes).unwrap();
        assert_eq!(parsed.to_binary().unwrap(), bytes);
    }

    #[test]
    fn org_signet_binary_round_trips() {
        let key = OrgKey::generate().unwrap();
        let signet = key.to_signet().unwrap();
        let bytes = signet.to_binary().unwrap();
        let parsed = OrgSignet::from_binary(&bytes).unwrap();
        assert_eq!(parsed.to_binary().unwrap(), bytes);
    }

    #[test]
    fn tampered_signing_key_fails_validation() {
        let key = OrgKey::generate().unwrap();
        let mut signet = key.to_signet().unwrap();
        let mut tampered_bytes = signet.signing.public_bytes();
        tampered_bytes[0] ^= 0x01;
        signet.signing = Ed25519Key::from_public_bytes(&tampered_bytes).unwrap();
        assert!(!signet.validate().unwrap());
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let key = OrgKey::generate().unwrap();
        let signet = key.to_signet().unwrap();
        let bytes = signet.to_binary().unwrap();
        assert!(matches!(
            OrgKey::from_binary(&bytes),
            Err(ArtifactError::Codec(CodecError::BadMagic(_)))
        ));
    }
}
