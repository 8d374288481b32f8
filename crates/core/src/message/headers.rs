//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! Splits a plaintext message into the common-header block (chunk 32),
//! the remaining-header block (chunk 33), and the body (chunk 48).
//!
//! A plaintext is an ordinary header block — `Name: Value` lines, CRLF or
//! LF terminated — followed by a blank line and the body. Header lines
//! are partitioned by name into the two blocks and rejoined verbatim in
//! the order encountered within each block, so a plaintext whose common
//! and other headers are not interleaved round-trips byte-for-byte.

/// The exact header names routed to chunk 32; everything else goes to chunk 33.
pub const COMMON_HEADER_NAMES: [&str; 11] = [
    "Date",
    "From",
    "Sender",
    "Reply-To",
    "To",
    "Cc",
    "Bcc",
    "Subject",
    "In-Reply-To",
    "References",
    "Message-ID",
];

fn is_common(name: &str) -> bool {
    COMMON_HEADER_NAMES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(name))
}

fn header_name(line: &str) -> Option<&str> {
    line.split_once(':').map(|(name, _)| name.trim())
}

/// Split `plaintext` into `(common_headers, other_headers, body)`, each the
/// raw bytes of its block (header lines newline-joined; no blank-line
/// separators inside a block).
pub fn split(plaintext: &[u8]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let text = String::from_utf8_lossy(plaintext);
    let mut lines = text.split_inclusive('\n');

    let mut common = String::new();
    let mut other = String::new();
    let mut body_start = plaintext.len();
    let mut consumed = 0usize;

    for line in lines.by_ref() {
        let bare = line.trim_end_matches(['\r', '\n']);
        consumed += line.len();
        if bare.is_empty() {
            body_start = consumed;
            break;
        }
        match header_name(bare) {
            Some(name) if is_common(name) => common.push_str(line),
            _ => other.push_str(line),
        }
    }

    let body = plaintext[body_start.min(plaintext.len())..].to_vec();
    (common.into_bytes(), other.into_bytes(), body)
}

/// Reassemble a plaintext from its three blocks: common headers, then
/// other headers, then a blank line, then the body.
pub fn join(common: &[u8], other: &[u8], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(common.len() + other.len() + body.len() + 2);
    out.extend_from_slice(common);
    out.extend_from_slice(other);
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_common_and_other_headers() {
        let plaintext = b"Subject: test\r\nX-Custom: value\r\n\r\nhello";
        let (common, other, body) = split(plaintext);
        assert_eq!(common, b"Subject: test\r\n");
        assert_eq!(other, b"X-Custom: value\r\n");
        assert_eq!(body, b"hello");
    }

    #[test]
    fn single_common_header_round_trips_exactly() {
        let plaintext = b"Subject: test\r\n\r\nhello";
        let (common, other, body) = split(plaintext);
        let rejoined = join(&common, &other, &body);
        assert_eq!(rejoined, plaintext);
    }

    #[test]
    fn header_name_matching_is_case_insensitive() {
        let plaintext = b"subject: test\r\n\r\nbody text";
        let (common, other, _) = split(plaintext);
        assert_eq!(common, b"subject: test\r\n");
        assert!(other.is_empty());
    }

    #[test]
    fn no_headers_is_just_a_body() {
        let plaintext = b"\r\njust a body, no headers";
        let (common, other, body) = split(plaintext);
        assert!(common.is_empty());
        assert!(other.is_empty());
        assert_eq!(body, b"just a body, no headers");
    }
}
