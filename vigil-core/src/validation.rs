//! Input validation shared by every service.
use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// A practical subset of RFC 5322, compiled once.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

static DOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$")
        .expect("Invalid domain regex pattern")
});

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_FINGERPRINT_LENGTH: usize = 256;

/// Validates an email address
///
/// ```rust
/// use vigil_core::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField("email".to_string()));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Validates a display name and returns it trimmed.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("name".to_string()));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name must be no more than {MAX_NAME_LENGTH} characters long"
        )));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidName(
            "Name cannot contain control characters".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Normalizes a visited domain to its bare lower-case host name.
///
/// Extensions report whatever the address bar held, so a scheme, port, path or a leading
/// `www.` are stripped before the host is validated.
///
/// ```rust
/// use vigil_core::validation::normalize_domain;
///
/// assert_eq!(normalize_domain("https://www.Example.com/login").unwrap(), "example.com");
/// ```
pub fn normalize_domain(domain: &str) -> Result<String, ValidationError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("domain".to_string()));
    }

    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.rsplit_once('@').map(|(_, h)| h).unwrap_or(host);
    let host = host.split(':').next().unwrap_or_default();
    let host = host.trim_end_matches('.').to_lowercase();
    let host = host
        .strip_prefix("www.")
        .map(str::to_string)
        .unwrap_or(host);

    if host.is_empty() || host.len() > 253 || !DOMAIN_REGEX.is_match(&host) {
        return Err(ValidationError::InvalidField(format!(
            "Invalid domain: {trimmed}"
        )));
    }

    Ok(host)
}

pub fn validate_fingerprint(fingerprint: &str) -> Result<(), ValidationError> {
    if fingerprint.trim().is_empty() {
        return Err(ValidationError::MissingField("fingerprint".to_string()));
    }

    if fingerprint.len() > MAX_FINGERPRINT_LENGTH {
        return Err(ValidationError::InvalidField(
            "Fingerprint is too long".to_string(),
        ));
    }

    Ok(())
}

/// Rejects anything that is not exactly six ASCII digits.
pub fn validate_code_format(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::MissingField("code".to_string()));
    }

    if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidField(
            "Code must be six digits".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("User.Name+tag@sub.example.co").is_ok());

        assert!(matches!(
            validate_email(""),
            Err(ValidationError::MissingField(_))
        ));
        assert!(matches!(
            validate_email("invalid"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(validate_email("user@").is_err());

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Ada Lovelace ").unwrap(), "Ada Lovelace");
        assert!(matches!(
            validate_name("   "),
            Err(ValidationError::MissingField(_))
        ));
        assert!(validate_name(&"a".repeat(101)).is_err());
        assert!(validate_name("bad\u{0007}name").is_err());
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("example.com").unwrap(), "example.com");
        assert_eq!(normalize_domain("WWW.Example.COM").unwrap(), "example.com");
        assert_eq!(
            normalize_domain("https://login.example.com:8443/path?q=1").unwrap(),
            "login.example.com"
        );
        assert_eq!(
            normalize_domain("http://user@example.org/").unwrap(),
            "example.org"
        );

        assert!(matches!(
            normalize_domain(""),
            Err(ValidationError::MissingField(_))
        ));
        assert!(normalize_domain("not a domain").is_err());
        assert!(normalize_domain("https:///path").is_err());
    }

    #[test]
    fn test_validate_fingerprint() {
        assert!(validate_fingerprint("a1b2c3d4").is_ok());
        assert!(validate_fingerprint(" ").is_err());
        assert!(validate_fingerprint(&"f".repeat(257)).is_err());
    }

    #[test]
    fn test_validate_code_format() {
        assert!(validate_code_format("012345").is_ok());
        assert!(validate_code_format("12345").is_err());
        assert!(validate_code_format("12345a").is_err());
        assert!(validate_code_format("").is_err());
    }
}
