//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Wire-format codec: TLV fields, artifact framing, armored text, and the
//! human-readable debug dump.

pub mod armor;
pub mod tlv;

pub use tlv::{Field, Width};

use crate::error::CodecError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Frame a 2-byte magic code and pre-encoded TLV field bytes into an
/// artifact's binary form: `magic (2B) || length (4B) || fields`.
pub fn frame_artifact(magic: u16, fields: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(6 + fields.len());
    out.extend_from_slice(&magic.to_be_bytes());
    out.extend_from_slice(&(fields.len() as u32).to_be_bytes());
    out.extend_from_slice(fields);
    out
}

/// Split an artifact's binary form back into its magic code and field bytes.
pub fn unframe_artifact(buf: &[u8]) -> Result<(u16, &[u8]), CodecError> {
    if buf.len() < 6 {
        return Err(CodecError::ShortBuffer {
            need: 6,
            have: buf.len(),
        });
    }
    let magic = u16::from_be_bytes([buf[0], buf[1]]);
    let len = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]) as usize;
    let rest = &buf[6..];
    if rest.len() != len {
        return Err(if rest.len() < len {
            CodecError::Truncated
        } else {
            CodecError::ShortBuffer {
                need: len,
                have: rest.len(),
            }
        });
    }
    Ok((magic, rest))
}

/// Render fields as the human-readable, non-injective debug dump: one
/// `"<label>: <base64(value)>"` line per field, in the order given.
pub fn debug_dump(fields: &[Field], label_for_tag: impl Fn(u8) -> &'static str) -> String {
    let mut out = String::new();
    for field in fields {
        out.push_str(label_for_tag(field.tag));
        out.push_str(": ");
        out.push_str(&STANDARD.encode(&field.value));
        out.push('\n');
    }
    out
}
