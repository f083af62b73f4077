use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Checks the character count of `value` lies within `min..=max`.
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        return Err(format!("{} must be at least {} characters", field, min));
    }
    if len > max {
        return Err(format!("{} must be at most {} characters", field, max));
    }
    Ok(())
}

pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!("{} must be between {} and {}", field, min, max));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 255 && EMAIL_RE.is_match(email)
}

/// Returns the first complexity rule the password breaks, if any.
pub fn password_weakness(password: &str) -> Option<&'static str> {
    if password.chars().count() < 8 {
        return Some("Password must be at least 8 character long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Some("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain at least one digit");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Some("Password must contain at least one special character");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("player@example.com"));
        assert!(is_valid_email("first.last+quiz@mail.example.org"));
        assert!(!is_valid_email("player"));
        assert!(!is_valid_email("player@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_password_rules_in_order() {
        assert_eq!(
            password_weakness("Ab1!"),
            Some("Password must be at least 8 character long")
        );
        assert_eq!(
            password_weakness("abcdefg1!"),
            Some("Password must contain at least one uppercase letter")
        );
        assert_eq!(
            password_weakness("ABCDEFG1!"),
            Some("Password must contain at least one lowercase letter")
        );
        assert_eq!(
            password_weakness("Abcdefgh!"),
            Some("Password must contain at least one digit")
        );
        assert_eq!(
            password_weakness("Abcdefg12"),
            Some("Password must contain at least one special character")
        );
        assert_eq!(password_weakness("Abcdefg1!"), None);
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(check_length("Name", "ab", 1, 2).is_ok());
        assert!(check_length("Name", "", 1, 2).is_err());
        assert!(check_length("Name", "éé", 1, 2).is_ok());
        assert!(check_length("Name", "abc", 1, 2).is_err());
    }

    #[test]
    fn test_range_rejects_nan() {
        assert!(check_range("Multiplier", 1.0, 0.1, 10.0).is_ok());
        assert!(check_range("Multiplier", 0.05, 0.1, 10.0).is_err());
        assert!(check_range("Multiplier", f64::NAN, 0.1, 10.0).is_err());
    }
}
