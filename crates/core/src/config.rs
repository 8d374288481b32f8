//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Named constants for the cryptographic schedule and chunk layout.
//!
//! These are protocol parameters, not deployment configuration — they are
//! load-bearing for interoperability and are not meant to be overridden at
//! runtime. Parameters genuinely belonging to a deployment (listen address,
//! storage paths, log level) belong to the surrounding server process, out
//! of scope for this crate.

/// Ed25519 public/private key and signature lengths.
pub const ED25519_PUBLIC_LEN: usize = 32;
pub const ED25519_PRIVATE_LEN: usize = 32;
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// secp256k1 compressed public key, private scalar, and raw ECDH output lengths.
pub const SECP256K1_PUBLIC_LEN: usize = 33;
pub const SECP256K1_PRIVATE_LEN: usize = 32;
pub const SECP256K1_SHARED_SECRET_LEN: usize = 32;

/// AES-256-GCM key, block, tag, and IV lengths.
pub const AES_KEY_LEN: usize = 32;
pub const AES_BLOCK_LEN: usize = 16;
pub const AES_TAG_LEN: usize = 16;
pub const AES_NONCE_LEN: usize = 16;

/// STACIE round-count bounds (inclusive), per the key derivation schedule.
pub const STACIE_MIN_ROUNDS: u32 = 8;
pub const STACIE_MAX_ROUNDS: u32 = 0x00FF_FFFF; // 2^24 - 1

/// STACIE salt and nonce are both fixed-size 16-byte values.
pub const STACIE_SALT_LEN: usize = 16;
pub const STACIE_NONCE_LEN: usize = 16;

/// Minimum total encrypted chunk payload length under standard padding.
pub const CHUNK_MIN_PAYLOAD_STANDARD: usize = 256;
/// Minimum total encrypted chunk payload length under alternate padding (flag 0x01).
pub const CHUNK_MIN_PAYLOAD_ALTERNATE: usize = 4096;
/// Encrypted chunk payloads are always padded to a multiple of this block size.
pub const CHUNK_PAD_ALIGNMENT: usize = 16;
/// The largest payload a single physical chunk may carry before spanning kicks in.
pub const CHUNK_MAX_PAYLOAD: usize = (1 << 24) - 1;

/// Width, in bytes, of a single recipient slot: 33-byte masked ephemeral
/// point + 48-byte AES-256-GCM-wrapped chunk key (32-byte chunk key plus its
/// 16-byte authentication tag) + 3-byte selector.
pub const SLOT_LEN: usize = 84;
/// Number of fixed recipient-role slots per encrypted chunk.
pub const SLOT_COUNT: usize = 4;

/// Domain-separation prefix used when deriving a per-role KEK.
pub const KEK_INFO_PREFIX: &[u8] = b"PRIME KEK ";

/// HMAC/SHA-512 domain strings used by the STACIE schedule.
pub const STACIE_SHARD_LABEL: &[u8] = b"STACIE SHARD";
pub const STACIE_TOKEN_LABEL: &[u8] = b"STACIE TOKEN";
