//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted username, counted in characters after trimming.
pub const USERNAME_MAX_CHARS: usize = 32;

/// Validates that a username is non-blank, at most [`USERNAME_MAX_CHARS`] characters once
/// trimmed, and free of control characters.
///
/// # Examples
///
/// ```ignore
/// validate_username("  ada ") // Ok
/// validate_username("   ")    // Err - blank
/// validate_username("a\tb")   // Err - control character
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("username_blank");
        err.message = Some("Username must not be blank".into());
        return Err(err);
    }

    let chars = trimmed.chars().count();
    if chars > USERNAME_MAX_CHARS {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!("Username must be at most {USERNAME_MAX_CHARS} characters (got {chars})")
                .into(),
        );
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("username_format");
        err.message = Some("Username must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("ada").is_ok());
        assert!(validate_username("  grace hopper  ").is_ok());
        assert!(validate_username("ünïcødé").is_ok());
        assert!(validate_username(&"x".repeat(USERNAME_MAX_CHARS)).is_ok());
    }

    #[test]
    fn test_validate_username_blank() {
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
    }

    #[test]
    fn test_validate_username_too_long() {
        assert!(validate_username(&"x".repeat(USERNAME_MAX_CHARS + 1)).is_err());
        // Surrounding whitespace does not count.
        let padded = format!("  {}  ", "x".repeat(USERNAME_MAX_CHARS));
        assert!(validate_username(&padded).is_ok());
    }

    #[test]
    fn test_validate_username_control_chars() {
        assert!(validate_username("a\tb").is_err());
        assert!(validate_username("a\u{7}b").is_err());
    }
}
