//
// Copyright (c) 2025 Sealmail Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: sealmail — signed identities and sealed messages.
//

//! PEM-like armored text encoding: `-----BEGIN <LABEL>-----` / `-----END
//! <LABEL>-----` wrapping base64 of the binary artifact form, 64 characters
//! per line.

use crate::error::CodecError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const LINE_LEN: usize = 64;

fn begin_line(label: &str) -> String {
    format!("-----BEGIN {label}-----")
}

fn end_line(label: &str) -> String {
    format!("-----END {label}-----")
}

/// Wrap `bytes` in an armored block labeled `label`.
pub fn encode(label: &str, bytes: &[u8]) -> String {
    let body = STANDARD.encode(bytes);
    let mut out = String::new();
    out.push_str(&begin_line(label));
    out.push('\n');
    for chunk in body.as_bytes().chunks(LINE_LEN) {
        out.push_str(std::str::from_utf8(chunk).expect("base64 alphabet is ASCII"));
        out.push('\n');
    }
    out.push_str(&end_line(label));
    out.push('\n');
    out
}

/// Decode an armored block, verifying its label matches `expected_label` and
/// returning the raw bytes. Tolerant of trailing whitespace on any line.
pub fn decode(expected_label: &str, armored: &str) -> Result<Vec<u8>, CodecError> {
    let lines: Vec<&str> = armored.lines().map(|l| l.trim_end()).collect();
    let begin_idx = lines
        .iter()
        .position(|l| l.starts_with("-----BEGIN ") && l.ends_with("-----"))
        .ok_or(CodecError::ArmorMissingHeader)?;
    let end_idx = lines
        .iter()
        .position(|l| l.starts_with("-----END ") && l.ends_with("-----"))
        .ok_or(CodecError::ArmorMissingFooter)?;
    if end_idx <= begin_idx {
        return Err(CodecError::ArmorMissingFooter);
    }

    let found_label = lines[begin_idx]
        .trim_start_matches("-----BEGIN ")
        .trim_end_matches("-----")
        .to_string();
    if found_label != expected_label {
        return Err(CodecError::ArmorLabelMismatch {
            expected: expected_label.to_string(),
            found: found_label,
        });
    }

    let body: String = lines[begin_idx + 1..end_idx].concat();
    STANDARD
        .decode(body.trim())
        .map_err(|e| CodecError::InvalidBase64(e.to_string()))
}

/// Read the armor label without validating or decoding the body, so a
/// caller can route to the matching artifact kind first.
pub fn peek_label(armored: &str) -> Result<String, CodecError> {
    let line = armored
        .lines()
        .find(|l| l.trim_end().starts_with("-----BEGIN ") && l.trim_end().ends_with("-----"))
        .ok_or(CodecError::ArmorMissingHeader)?;
    Ok(line
        .trim_end()
        .trim_start_matches("-----BEGIN ")
        .trim_end_matches("-----")
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let bytes = b"the quick brown fox jumps over the lazy dog, repeated until long enough to wrap";
        let armored = encode("USER SIGNET", bytes);
        let decoded = decode("USER SIGNET", &armored).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn lines_wrap_at_64_characters() {
        let armored = encode("USER SIGNET", &[0xABu8; 200]);
        for line in armored.lines() {
            if line.starts_with("-----") {
                continue;
            }
            assert!(line.len() <= LINE_LEN);
        }
    }

    #[test]
    fn encode_is_idempotent_through_decode_reencode() {
        let bytes = vec![1, 2, 3, 4, 5, 250, 251, 252];
        let armored = encode("BINARY OBJECT", &bytes);
        let decoded = decode("BINARY OBJECT", &armored).unwrap();
        let reencoded = encode("BINARY OBJECT", &decoded);
        assert_eq!(armored, reencoded);
    }

    #[test]
    fn trailing_whitespace_is_tolerated() {
        let armored = encode("ORGANIZATIONAL KEY", b"hello world");
        let padded: String = armored
            .lines()
            .map(|l| format!("{l}   \n"))
            .collect();
        let decoded = decode("ORGANIZATIONAL KEY", &padded).unwrap();
        assert_eq!(decoded, b"hello world");
    }

    #[test]
    fn missing_footer_is_format_error() {
        let armored = "-----BEGIN USER KEY-----\nAAAA\n";
        assert!(matches!(
            decode("USER KEY", armored),
            Err(CodecError::ArmorMissingFooter)
        ));
    }

    #[test]
    fn mismatched_label_is_format_error() {
        let armored = encode("USER KEY", b"payload");
        let err = decode("USER SIGNET", &armored).unwrap_err();
        assert!(matches!(err, CodecError::ArmorLabelMismatch { .. }));
    }

    #[test]
    fn invalid_base64_body_is_format_error() {
        let armored = "-----BEGIN USER KEY-----\n!!!not base64!!!\n-----END USER KEY-----\n";
        assert!(matches!(
            decode("USER KEY", armored),
            Err(CodecError::InvalidBase64(_))
        ));
    }
}
