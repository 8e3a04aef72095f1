use regex::Regex;
use std::sync::OnceLock;

use shared_models::error::AppError;

const MIN_PASSWORD_LENGTH: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if !is_valid_email(email) {
        return Err(AppError::Validation("Enter a valid email".to_string()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

/// Profile forms historically submit dates of birth as DD-MM-YYYY; the store
/// keeps YYYY-MM-DD. Anything else passes through untouched.
pub fn normalize_dob(dob: &str) -> String {
    let parts: Vec<&str> = dob.split('-').collect();
    if parts.len() == 3 && parts[0].len() == 2 && parts[2].len() == 4 {
        return format!("{}-{}-{}", parts[2], parts[1], parts[0]);
    }
    dob.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("jane.doe@example.com"));
        assert!(is_valid_email("a+b@mail.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn short_passwords_fail() {
        assert!(validate_password("seven77").is_err());
        assert!(validate_password("eight888").is_ok());
    }

    #[test]
    fn dob_normalization() {
        assert_eq!(normalize_dob("21-07-1990"), "1990-07-21");
        assert_eq!(normalize_dob("1990-07-21"), "1990-07-21");
        assert_eq!(normalize_dob("july 21"), "july 21");
    }
}
