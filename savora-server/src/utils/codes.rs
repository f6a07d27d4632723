//! Human-readable code generation (order / payment identifiers)

use ring::rand::{SecureRandom, SystemRandom};

/// Unambiguous uppercase alphabet (no O/0, I/1 confusion pairs removed
/// would hurt lookup by phone; keep plain A-Z0-9)
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a code like "ORD-8F3KQ2PD": prefix + dash + `len` random chars
pub fn random_code(prefix: &str, len: usize) -> String {
    let rng = SystemRandom::new();
    let mut out = String::with_capacity(prefix.len() + 1 + len);
    out.push_str(prefix);
    out.push('-');

    for _ in 0..len {
        let mut byte = [0u8; 1];
        // SystemRandom only fails on exotic platforms; fall back to a
        // timestamp-derived character rather than panicking mid-request
        let idx = if rng.fill(&mut byte).is_ok() {
            (byte[0] as usize) % ALPHABET.len()
        } else {
            (chrono::Utc::now().timestamp_subsec_nanos() as usize) % ALPHABET.len()
        };
        out.push(ALPHABET[idx] as char);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_prefix_and_length() {
        let code = random_code("ORD", 8);
        assert!(code.starts_with("ORD-"));
        assert_eq!(code.len(), 12);
        assert!(
            code[4..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn codes_are_unlikely_to_collide() {
        let a = random_code("PAY", 12);
        let b = random_code("PAY", 12);
        assert_ne!(a, b);
    }
}
