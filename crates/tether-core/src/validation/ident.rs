//! Identifier helpers: UUID shape checking and random suffix generation.

use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[1-5][a-fA-F0-9]{3}-[89abAB][a-fA-F0-9]{3}-[a-fA-F0-9]{12}$",
    )
    .expect("UUID regex is valid")
});

/// Whether the whole string is a well-formed RFC 4122 UUID.
///
/// The regex rejects strings that merely parse (e.g. the nil UUID or
/// brace-wrapped forms); the parse step guards against regex false positives.
pub fn is_uuid(s: &str) -> bool {
    UUID_RE.is_match(s) && Uuid::parse_str(s).is_ok()
}

/// Random ASCII-letter string, used to de-collide generated names.
pub fn random_suffix(length: usize) -> String {
    const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}
