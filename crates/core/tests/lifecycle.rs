//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Cross-module lifecycle tests exercised entirely through the façade, the
//! same surface a CLI or embedding application would use: generate an org,
//! onboard and renew a user against it, then drive a message end to end
//! through every recipient role.

use sealmail_core::chunk::Role;
use sealmail_core::facade::{
    self, key_decrypt, key_encrypt, message_decrypt, message_encrypt, request_generate,
    request_sign, signet_fingerprint_org, signet_fingerprint_user, signet_generate_org,
    signet_validate_org, signet_validate_user, signet_validate_user_renewal, start, Artifact,
    Encoding,
};
use sealmail_core::primitives::Secp256k1Key;
use sealmail_types::artifact::ArtifactKind;

fn generate_org() -> sealmail_core::artifact::OrgKey {
    match facade::key_generate(ArtifactKind::OrgKey).unwrap() {
        Artifact::OrgKey(key) => key,
        _ => panic!("expected an org key"),
    }
}

fn generate_user() -> sealmail_core::artifact::UserKey {
    match facade::key_generate(ArtifactKind::UserKey).unwrap() {
        Artifact::UserKey(key) => key,
        _ => panic!("expected a user key"),
    }
}

/// Org key is generated, password-wrapped for at-rest storage, then
/// recovered back into a working signet.
#[test]
fn org_key_survives_password_wrap_round_trip() {
    let org = generate_org();
    let wrapped = key_encrypt(b"correct horse battery staple", &Artifact::OrgKey(org)).unwrap();
    let recovered =
        key_decrypt(b"correct horse battery staple", &wrapped, ArtifactKind::OrgKey).unwrap();

    let org = match recovered {
        Artifact::OrgKey(key) => key,
        _ => panic!("expected an org key"),
    };
    let signet = signet_generate_org(&org).unwrap();
    assert!(signet_validate_org(&signet).unwrap());
}

/// Two-generation user chain, countersigned by the org each time, then a
/// message authored by the renewed (second-generation) user is sealed and
/// opened by every one of the four recipient-role slots it occupies.
#[test]
fn renewed_user_message_opens_under_every_role() {
    let origin_org = generate_org();
    let ctx = start(origin_org).unwrap();

    let gen1 = generate_user();
    let request1 = request_generate(&gen1, None).unwrap();
    let signet1 = request_sign(&request1, &gen1.signing, &ctx).unwrap();
    assert!(signet_validate_user(&signet1, ctx.org_signet()).unwrap());

    let gen2 = generate_user();
    let predecessor_fingerprint = signet_fingerprint_user(&signet1).unwrap();
    let request2 =
        request_generate(&gen2, Some((&gen1.signing, predecessor_fingerprint))).unwrap();
    let signet2 = request_sign(&request2, &gen2.signing, &ctx).unwrap();
    assert!(signet_validate_user_renewal(&signet2, ctx.org_signet(), &gen1.signing).unwrap());

    let destination_org = generate_org();
    let destination_signet = signet_generate_org(&destination_org).unwrap();

    for role in [
        Role::Author,
        Role::Origin,
        Role::Destination,
        Role::Recipient,
    ] {
        let recipient = Secp256k1Key::generate();
        let recipient_pub = Secp256k1Key::from_public_bytes(&recipient.public_bytes()).unwrap();

        let plaintext = b"Subject: renewal chain\r\n\r\nsealed under every role";
        let message = message_encrypt(
            plaintext,
            &gen2,
            Some(ctx.org_key()),
            Some(&destination_signet),
            &recipient_pub,
        )
        .unwrap();

        let role_key = match role {
            Role::Author => &gen2.encryption,
            Role::Origin => &ctx.org_key().encryption,
            Role::Destination => &destination_org.encryption,
            Role::Recipient => &recipient,
        };

        let decoded =
            message_decrypt(&message, role, role_key, &signet2, Some(ctx.org_signet())).unwrap();
        assert_eq!(decoded.plaintext, plaintext);
    }

    facade::stop(ctx);
}

/// A recipient whose encryption key was never a slot in the message cannot
/// open it under any role, and corrupting the sealed artifact's framing is
/// rejected before any slot is even attempted.
#[test]
fn outsider_and_corrupted_framing_are_both_rejected() {
    let org = generate_org();
    let author = generate_user();
    let request = request_generate(&author, None).unwrap();
    let ctx = start(org).unwrap();
    let signet = request_sign(&request, &author.signing, &ctx).unwrap();

    let recipient = Secp256k1Key::generate();
    let recipient_pub = Secp256k1Key::from_public_bytes(&recipient.public_bytes()).unwrap();
    let plaintext = b"Subject: private\r\n\r\nfor the intended recipient only";
    let message = message_encrypt(plaintext, &author, None, None, &recipient_pub).unwrap();

    let outsider = Secp256k1Key::generate();
    assert!(message_decrypt(&message, Role::Recipient, &outsider, &signet, None).is_err());

    let mut corrupted = message.clone();
    corrupted[0] ^= 0xFF; // corrupt the artifact magic itself
    assert!(message_decrypt(&corrupted, Role::Recipient, &recipient, &signet, None).is_err());

    facade::stop(ctx);
}

/// A wrong password on a password-protected user key fails to unwrap, and
/// an armored envelope whose label doesn't match the artifact kind it's
/// being parsed as is rejected rather than silently misinterpreted.
#[test]
fn password_and_label_mismatches_are_rejected() {
    let user = generate_user();
    let wrapped = key_encrypt(b"hunter2", &Artifact::UserKey(user)).unwrap();
    assert!(key_decrypt(b"wrong password", &wrapped, ArtifactKind::UserKey).is_err());

    let org = generate_org();
    let signet = signet_generate_org(&org).unwrap();
    let armored = facade::get(&Artifact::OrgSignet(signet), Encoding::Armored).unwrap();
    assert!(facade::set(&armored, Encoding::Armored, ArtifactKind::UserSignet).is_err());
}

/// Fingerprints are derived from the canonical signet bytes, so a signet
/// that validates against its issuing org does not also validate against an
/// unrelated org with a different fingerprint.
#[test]
fn user_signet_does_not_validate_against_the_wrong_org() {
    let org_a = generate_org();
    let org_b = generate_org();
    let ctx_a = start(org_a).unwrap();
    let org_b_signet = signet_generate_org(&org_b).unwrap();

    let user = generate_user();
    let request = request_generate(&user, None).unwrap();
    let signet = request_sign(&request, &user.signing, &ctx_a).unwrap();

    assert!(signet_validate_user(&signet, ctx_a.org_signet()).unwrap());
    assert!(!signet_validate_user(&signet, &org_b_signet).unwrap());

    let fingerprint_a = signet_fingerprint_org(ctx_a.org_signet()).unwrap();
    let fingerprint_b = signet_fingerprint_org(&org_b_signet).unwrap();
    assert_ne!(fingerprint_a, fingerprint_b);

    facade::stop(ctx_a);
}
