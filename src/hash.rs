//! One-way hashing of license keys and fingerprint strings.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Hash `input` with SHA-256 and return the lowercase hex digest.
///
/// Every byte is rendered as two hex characters, so the result is always
/// [`HASH_HEX_LEN`] characters long. Empty input is allowed.
pub fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns true if `value` looks like a digest produced by [`hash_string`].
pub fn is_hash_hex(value: &str) -> bool {
    value.len() == HASH_HEX_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
