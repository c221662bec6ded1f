//! Tracking number generator.
//!
//! A tracking number is 16 characters from `[A-Z0-9]`: an 8-character prefix
//! derived from a SHA-256 hash of the shipment attributes, followed by an
//! 8-character random suffix. The prefix ties a number back to the request
//! that produced it; the suffix carries the entropy used to avoid collisions.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Characters a tracking number may contain.
pub const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const PREFIX_LEN: usize = 8;
pub const SUFFIX_LEN: usize = 8;
pub const MAX_CODE_LEN: usize = 16;

/// Produces candidate tracking numbers for one set of shipment attributes.
///
/// The prefix is computed once; every call to [`CodeGenerator::candidate`]
/// draws a fresh suffix, so retries after a conflict keep the prefix fixed.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    prefix: String,
}

impl CodeGenerator {
    /// Creates a generator whose prefix is derived from the ordered attributes.
    pub fn new<'a>(attributes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            prefix: hashed_prefix(attributes),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds a candidate from the fixed prefix and a new random suffix.
    pub fn candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut code = String::with_capacity(MAX_CODE_LEN);
        code.push_str(&self.prefix);
        code.push_str(&random_suffix(rng));
        code
    }
}

/// Hashes the attributes and renders the first 64 bits as base-36 digits.
///
/// Each attribute is framed with its byte length so that different splits of
/// the same concatenated text hash differently.
fn hashed_prefix<'a>(attributes: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for attribute in attributes {
        hasher.update((attribute.len() as u64).to_be_bytes());
        hasher.update(attribute.as_bytes());
    }
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let mut value = u64::from_be_bytes(head);

    let mut prefix = [0u8; PREFIX_LEN];
    for slot in prefix.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    prefix.iter().map(|&b| b as char).collect()
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns true if `code` matches `^[A-Z0-9]{1,16}$`.
pub fn is_valid_code(code: &str) -> bool {
    (1..=MAX_CODE_LEN).contains(&code.len())
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    const REDBOX: [&str; 7] = [
        "MY",
        "ID",
        "1.234",
        "2018-11-20T19:29:32+08:00",
        "de619854-b59b-425e-9db4-943979e1bd49",
        "RedBox Logistics",
        "redbox-logistics",
    ];

    #[test]
    fn test_candidate_is_sixteen_valid_chars() {
        let generator = CodeGenerator::new(REDBOX);
        let mut rng = StdRng::seed_from_u64(7);

        let code = generator.candidate(&mut rng);

        assert_eq!(code.len(), 16);
        assert!(is_valid_code(&code));
    }

    #[test]
    fn test_prefix_is_deterministic() {
        let first = CodeGenerator::new(REDBOX);
        let second = CodeGenerator::new(REDBOX);

        assert_eq!(first.prefix(), second.prefix());
        assert_eq!(first.prefix().len(), PREFIX_LEN);
        assert!(is_valid_code(first.prefix()));
    }

    #[test]
    fn test_prefix_depends_on_every_attribute() {
        let base = CodeGenerator::new(REDBOX);

        for i in 0..REDBOX.len() {
            let mut changed = REDBOX;
            changed[i] = "something-else";
            let other = CodeGenerator::new(changed);
            assert_ne!(base.prefix(), other.prefix(), "attribute {i} ignored");
        }
    }

    #[test]
    fn test_prefix_respects_attribute_boundaries() {
        let joined = CodeGenerator::new(["AB", "C"]);
        let split = CodeGenerator::new(["A", "BC"]);

        assert_ne!(joined.prefix(), split.prefix());
    }

    #[test]
    fn test_candidates_keep_prefix_and_vary_suffix() {
        let generator = CodeGenerator::new(REDBOX);
        let mut rng = StdRng::from_entropy();
        let mut seen = HashSet::new();

        for _ in 0..1000 {
            let code = generator.candidate(&mut rng);
            assert!(code.starts_with(generator.prefix()));
            seen.insert(code);
        }

        assert!(seen.len() >= 999);
    }

    #[test]
    fn test_suffix_uses_whole_alphabet() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();

        for _ in 0..500 {
            seen.extend(random_suffix(&mut rng).bytes());
        }

        assert_eq!(seen.len(), ALPHABET.len());
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("A"));
        assert!(is_valid_code("0123456789ABCDEF"));
        assert!(is_valid_code("ZZZZZZZZZZZZZZZZ"));

        assert!(!is_valid_code(""));
        assert!(!is_valid_code("0123456789ABCDEFG"));
        assert!(!is_valid_code("abc123"));
        assert!(!is_valid_code("ABC-123"));
        assert!(!is_valid_code("ABC 123"));
        assert!(!is_valid_code("ÄBC"));
    }
}
