//! Random numeric access code generation.

use rand::rngs::OsRng;
use rand::Rng;

/// Default access code length in digits.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Generate a random numeric access code of `length` digits.
///
/// Codes are secret material, so digits come from the OS entropy source.
#[must_use]
pub fn generate_access_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_length() {
        let code = generate_access_code(DEFAULT_CODE_LENGTH);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_custom_length() {
        let code = generate_access_code(8);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_codes_differ_across_calls() {
        // Collision odds across ten 6-digit draws are negligible.
        let codes: Vec<String> = (0..10).map(|_| generate_access_code(6)).collect();
        assert!(codes.windows(2).any(|pair| pair[0] != pair[1]));
    }
}
