//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate enrollment number
pub fn validate_enrollment(enrollment: &str) -> Result<(), String> {
    if enrollment.is_empty() {
        return Err("Enrollment number is required".to_string());
    }

    static ENROLLMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ENROLLMENT_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9]{4,16}$").expect("Failed to compile enrollment regex")
    });

    if !regex.is_match(enrollment) {
        return Err("Enrollment number must be 4 to 16 digits".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("dean@college.test").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_enrollment() {
        assert!(validate_enrollment("20230042").is_ok());
        assert!(validate_enrollment("").is_err());
        assert!(validate_enrollment("abc123").is_err());
        assert!(validate_enrollment("123").is_err());
    }

    #[test]
    fn test_validate_password() {
        // Default initial passwords must pass so they can be used to log in.
        assert!(validate_password("admin123").is_ok());
        assert!(validate_password("student123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
    }
}
