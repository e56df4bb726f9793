// SPDX-FileCopyrightText: 2026 Slidesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session marker codec.
//!
//! The chat host is stateless between turns: the only durable channel is the
//! replayed transcript. Identity survives by embedding an HTML-comment marker
//! in each new session's first reply and recovering it from history on later
//! turns. The marker renders as nothing in markdown output, so users never
//! see it.
//!
//! Format (byte-stable, single line): `<!-- session-id:<24-hex-chars> -->`

use std::sync::LazyLock;

use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};

use slidesmith_core::ChatTurn;

/// Length of a session identifier in lowercase hex characters.
pub const SESSION_ID_LEN: usize = 24;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--\s*session-id:([0-9a-f]{24})\s*-->").expect("marker regex")
});

/// Generates a fresh opaque session identifier.
///
/// Hashes a nanosecond timestamp plus 16 random bytes and truncates to 12
/// bytes of lowercase hex. Collision-resistant without being meaningful:
/// nothing sequential, nothing enumerable.
pub fn generate_session_id() -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(nanos.to_be_bytes());
    hasher.update(salt);
    hex::encode(&hasher.finalize()[..SESSION_ID_LEN / 2])
}

/// Encodes a session id into its transcript marker.
pub fn encode(session_id: &str) -> String {
    format!("<!-- session-id:{session_id} -->")
}

/// Extracts the most recent session id embedded in `text`.
///
/// A malformed marker is treated identically to no marker at all; this never
/// fails.
pub fn decode(text: &str) -> Option<String> {
    MARKER_RE
        .captures_iter(text)
        .last()
        .map(|caps| caps[1].to_string())
}

/// Scans a transcript for the most recently emitted marker, considering only
/// assistant turns authored by this generator.
///
/// Other participants may emit similarly shaped HTML comments; those are
/// ignored, so a foreign comment can never hijack a session.
pub fn decode_from_history(history: &[ChatTurn]) -> Option<String> {
    history
        .iter()
        .rev()
        .filter(|turn| turn.is_own_assistant())
        .find_map(|turn| decode(turn.text()))
}
