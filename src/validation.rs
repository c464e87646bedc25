//! Field-level validation shared by the repositories.

use rust_decimal::Decimal;
use validator::ValidateEmail;

/// Trims surrounding whitespace and lower-cases the address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks the address with `validator`, additionally requiring a dotted
/// domain with a top-level label of at least two characters. `localhost`
/// and bracketed IP literals are accepted as domains.
pub fn is_valid_email(email: &str) -> bool {
    if !email.to_string().validate_email() {
        return false;
    }

    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };

    if domain.eq_ignore_ascii_case("localhost") || domain.starts_with('[') {
        return true;
    }

    domain
        .rsplit_once('.')
        .is_some_and(|(_, tld)| tld.len() >= 2)
}

/// Whether `value` fits a `NUMERIC(max_digits, decimal_places)` column
/// without rounding.
pub fn fits_decimal(value: Decimal, max_digits: u32, decimal_places: u32) -> bool {
    let normalized = value.normalize();
    if normalized.scale() > decimal_places {
        return false;
    }

    let integer_digits = normalized
        .abs()
        .trunc()
        .normalize()
        .to_string()
        .trim_start_matches('0')
        .len() as u32;
    integer_digits <= max_digits - decimal_places
}

/// Two ASCII letters, e.g. `RU` or `gb`.
pub fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_normalize_email_lowercases_whole_address() {
        assert_eq!(normalize_email("ALICE@Example.com"), "alice@example.com");
        assert_eq!(normalize_email("  bob@EXAMPLE.org "), "bob@example.org");
    }

    #[test]
    fn test_valid_emails() {
        for email in [
            "alice@example.com",
            "first.last+tag@sub.example.co.uk",
            "o'neil@example.ru",
            "admin@localhost",
            "user@[127.0.0.1]",
            "user@[::1]",
        ] {
            assert!(is_valid_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in [
            "",
            "not-an-email",
            "@example.com",
            "alice@",
            "alice@example",
            "alice@-example.com",
            "alice@example.c",
            "alice@example.com-",
            "alice@exa mple.com",
            "alice@[999.1.1.1]",
        ] {
            assert!(!is_valid_email(email), "{email} should be invalid");
        }
    }

    #[test]
    fn test_email_length_limits() {
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(!is_valid_email(&long_local));

        let long_domain = format!("alice@{}.com", "a".repeat(250));
        assert!(!is_valid_email(&long_domain));
    }

    #[test]
    fn test_fits_decimal() {
        let d = |s: &str| Decimal::from_str(s).unwrap();
        assert!(fits_decimal(d("999999.99"), 8, 2));
        assert!(fits_decimal(d("0.13"), 6, 2));
        assert!(fits_decimal(d("1.50"), 4, 2));
        assert!(fits_decimal(d("1.500"), 4, 2));
        assert!(!fits_decimal(d("1000000.00"), 8, 2));
        assert!(!fits_decimal(d("0.125"), 6, 2));
        assert!(!fits_decimal(d("100.00"), 4, 2));
    }

    #[test]
    fn test_country_code() {
        assert!(is_country_code("RU"));
        assert!(is_country_code("gb"));
        assert!(!is_country_code("RUS"));
        assert!(!is_country_code("R1"));
    }
}
