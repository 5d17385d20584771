//! Short code generation and validation utilities.

use crate::error::AppError;
use rand::{Rng, distr::Alphanumeric};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Length of generated codes.
pub const GENERATED_CODE_LENGTH: usize = 6;

/// Accepted shape of any short code: 6-8 ASCII letters or digits.
pub static SHORT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6,8}$").expect("valid short code regex"));

/// Codes that would be shadowed by fixed routes.
const RESERVED_CODES: &[&str] = &["health", "healthz"];

/// Generates a random short code.
///
/// Each of the [`GENERATED_CODE_LENGTH`] characters is sampled uniformly
/// from the 62-character alphabet `A-Z a-z 0-9`. Uniqueness is not checked
/// here; the store rejects duplicates on insert.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 6-8 characters
/// - Allowed characters: ASCII letters and digits
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] with the offending field in `details`.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if !SHORT_CODE_REGEX.is_match(code) {
        return Err(AppError::bad_request(
            "Shortcode must be 6-8 alphanumeric characters",
            json!({ "fields": { "shortCode": ["Shortcode must be 6-8 alphanumeric characters"] } }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "fields": { "shortCode": ["This code is reserved"] } }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_correct_length() {
        assert_eq!(generate_code().len(), GENERATED_CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_is_alphanumeric() {
        for _ in 0..200 {
            let code = generate_code();
            assert!(SHORT_CODE_REGEX.is_match(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_generate_code_produces_distinct_codes() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code()).collect();
        // 62^6 possibilities; a handful of collisions would still be plausible.
        assert!(codes.len() > 990);
    }

    #[test]
    fn test_validate_length_bounds() {
        assert!(validate_custom_code("abc123").is_ok());
        assert!(validate_custom_code("abcd1234").is_ok());
        assert!(validate_custom_code("abc12").is_err());
        assert!(validate_custom_code("abcd12345").is_err());
    }

    #[test]
    fn test_validate_mixed_case_allowed() {
        assert!(validate_custom_code("MyCode12").is_ok());
    }

    #[test]
    fn test_validate_rejects_non_alphanumeric() {
        let err = validate_custom_code("my-code").unwrap_err();
        assert!(err.to_string().contains("6-8 alphanumeric"));

        assert!(validate_custom_code("my_code1").is_err());
        assert!(validate_custom_code("code 123").is_err());
        assert!(validate_custom_code("cödé123").is_err());
        assert!(validate_custom_code("").is_err());
    }

    #[test]
    fn test_validate_reserved_code() {
        for code in ["health", "healthz"] {
            let err = validate_custom_code(code).unwrap_err();
            assert!(err.to_string().contains("reserved"), "{code} should be reserved");
        }
        assert!(validate_custom_code("healthy1").is_ok());
    }
}
