use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

// local part: dot-separated atoms or quoted strings; domain: dot-separated
// labels ending in a TLD of two or more alphanumerics.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    let segment = r#"(?:[^<>()\[\]\\.,;:\s@"]+|"(?:[^"\\\r\n]|\\.)+")"#;
    let label = r"[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?";
    let pattern = format!(r"^{segment}(?:\.{segment})*@(?:{label}\.)+[A-Za-z0-9]{{2,}}$");
    Regex::new(&pattern).expect("valid email regex")
});

/// Checks `input` against the address grammar. Case is preserved; callers
/// wanting the stored form use [`normalize_email`].
pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input)
}

/// Trims, lowercases and validates an address.
pub fn normalize_email(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::MissingField("Email"));
    }
    if !is_valid_email(&normalized) {
        return Err(ValidationError::InvalidEmail(input.to_string()));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@mail.example.com"));
        assert!(is_valid_email("Dev.Events@Example.ORG"));
        assert!(is_valid_email("\"john doe\"@example.com"));
        assert!(is_valid_email("x@my-host.io"));
    }

    #[test]
    fn rejects_bad_dot_placement() {
        assert!(!is_valid_email("a..b@example.com"));
        assert!(!is_valid_email(".a@example.com"));
        assert!(!is_valid_email("a.@example.com"));
    }

    #[test]
    fn rejects_bad_domains() {
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@-b.com"));
        assert!(!is_valid_email("a@b..com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
        assert_eq!(normalize_email("nope"), Err(ValidationError::InvalidEmail("nope".into())));
        assert_eq!(normalize_email("   "), Err(ValidationError::MissingField("Email")));
    }
}
