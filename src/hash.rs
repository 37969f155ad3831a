//! Store hash extraction from path-info identifiers.
use crate::error::EnrichError;
use regex::Regex;
use std::sync::OnceLock;

pub const HASH_LEN: usize = 32;

fn hash_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/?(?P<hash>[0-9a-z]{32})-?").expect("regex for store hashes")
    })
}

/// Return the first 32-character `[0-9a-z]` run in `identifier`.
///
/// An optional leading `/` and trailing `-` are matched but not captured, so
/// `/nix/store/<hash>-name` and a bare `<hash>` both yield `<hash>`.
pub fn extract_hash(identifier: &str) -> Result<&str, EnrichError> {
    hash_pattern()
        .captures(identifier)
        .and_then(|caps| caps.name("hash"))
        .map(|m| m.as_str())
        .ok_or_else(|| EnrichError::MalformedIdentifier {
            identifier: identifier.to_string(),
        })
}
