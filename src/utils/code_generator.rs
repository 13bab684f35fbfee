//! Short code generation and validation utilities.
//!
//! Provides cryptographically secure random code generation and validation
//! for custom user-provided codes.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::json;

/// Length of system-generated codes.
pub const GENERATED_CODE_LENGTH: usize = 8;

/// Allowed length range for caller-supplied codes.
pub const CUSTOM_CODE_MIN_LENGTH: usize = 3;
pub const CUSTOM_CODE_MAX_LENGTH: usize = 50;

/// Source of candidate short codes.
///
/// Implementations produce independent candidates and keep no memory of
/// earlier ones; uniqueness is decided by the store on insert.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Produces one candidate code.
    fn next_code(&self) -> String;
}

/// Generates 8-character codes drawn uniformly from `[A-Za-z0-9]`.
///
/// Uses the thread-local CSPRNG from `rand`, which is periodically reseeded
/// from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn next_code(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_CODE_LENGTH)
            .map(char::from)
            .collect()
    }
}

/// Returns true if `c` may appear in a short code.
fn is_code_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-50 characters
/// - Allowed characters: ASCII letters, digits, `_` and `-`
///
/// # Errors
///
/// Returns [`AppError::RejectedCodeFormat`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_code("my-link_2024").is_ok());
/// assert!(validate_custom_code("ab").is_err());        // Too short
/// assert!(validate_custom_code("test@123").is_err());  // Invalid character
/// ```
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    let length = code.chars().count();
    if !(CUSTOM_CODE_MIN_LENGTH..=CUSTOM_CODE_MAX_LENGTH).contains(&length) {
        return Err(AppError::code_format(
            format!(
                "Custom code must be {CUSTOM_CODE_MIN_LENGTH}-{CUSTOM_CODE_MAX_LENGTH} characters"
            ),
            json!({ "provided_length": length }),
        ));
    }

    if let Some(bad) = code.chars().find(|c| !is_code_char(*c)) {
        return Err(AppError::code_format(
            "Custom code can only contain letters, digits, '_' and '-'",
            json!({ "code": code, "invalid_char": bad.to_string() }),
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
        let code = RandomCodeGenerator::new().next_code();
        assert_eq!(code.len(), GENERATED_CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_alphanumeric_only() {
        let generator = RandomCodeGenerator::new();
        for _ in 0..200 {
            let code = generator.next_code();
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()), "{code}");
        }
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let generator = RandomCodeGenerator::new();
        let codes: HashSet<String> = (0..1000).map(|_| generator.next_code()).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_generate_code_covers_alphabet_classes() {
        let generator = RandomCodeGenerator::new();
        let joined: String = (0..500).map(|_| generator.next_code()).collect();
        assert!(joined.chars().any(|c| c.is_ascii_uppercase()));
        assert!(joined.chars().any(|c| c.is_ascii_lowercase()));
        assert!(joined.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generated_codes_pass_custom_validation() {
        let code = RandomCodeGenerator::new().next_code();
        assert!(validate_custom_code(&code).is_ok());
    }

    #[test]
    fn test_validate_boundary_lengths() {
        assert!(validate_custom_code("abc").is_ok());
        assert!(validate_custom_code(&"a".repeat(50)).is_ok());
        assert!(validate_custom_code(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_too_short() {
        let err = validate_custom_code("ab").unwrap_err();
        assert!(matches!(err, AppError::RejectedCodeFormat { .. }));
        assert!(err.to_string().contains("3-50 characters"));
    }

    #[test]
    fn test_validate_invalid_character() {
        let err = validate_custom_code("test@123").unwrap_err();
        assert!(matches!(err, AppError::RejectedCodeFormat { .. }));
    }

    #[test]
    fn test_validate_mixed_case_underscore_hyphen() {
        assert!(validate_custom_code("My_Link-2024").is_ok());
        assert!(validate_custom_code("-_-").is_ok());
    }

    #[test]
    fn test_validate_rejects_spaces_and_unicode() {
        assert!(validate_custom_code("my code").is_err());
        assert!(validate_custom_code("cafè").is_err());
        assert!(validate_custom_code("").is_err());
    }
}
