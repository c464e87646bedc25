//! Listing identifiers: title normalization, slugs and reference codes.
//!
//! Reference codes come from a [`RefCodeGenerator`] so callers can inject a
//! deterministic source in tests instead of the thread-local RNG.

use std::sync::Mutex;

use deunicode::deunicode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of characters in a listing reference code
pub const REF_CODE_LEN: usize = 10;

/// Maximum slug length, including any `-N` uniqueness suffix
pub const SLUG_MAX_LEN: usize = 50;

const REF_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of fresh listing reference codes.
pub trait RefCodeGenerator: Send + Sync {
    /// Returns a new candidate code. Uniqueness is checked by the caller.
    fn next_code(&self) -> String;
}

/// Generator backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRefCodes;

impl RefCodeGenerator for RandomRefCodes {
    fn next_code(&self) -> String {
        let mut rng = rand::thread_rng();
        generate_ref_code(&mut rng)
    }
}

/// Deterministic generator for tests and reproducible fixtures.
#[derive(Debug)]
pub struct SeededRefCodes {
    rng: Mutex<StdRng>,
}

impl SeededRefCodes {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RefCodeGenerator for SeededRefCodes {
    fn next_code(&self) -> String {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        generate_ref_code(&mut *rng)
    }
}

/// Draws [`REF_CODE_LEN`] characters uniformly from `A-Z0-9`.
pub fn generate_ref_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..REF_CODE_LEN)
        .map(|_| REF_CODE_ALPHABET[rng.gen_range(0..REF_CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn is_valid_ref_code(code: &str) -> bool {
    code.len() == REF_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Title-cases a string: the first letter of every run of letters is
/// upper-cased and the rest lower-cased ("3rd floor flat" -> "3Rd Floor Flat").
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_is_letter = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

/// Derives a URL slug: the input transliterated to ASCII (`Château` becomes
/// `chateau`), then lower-case alphanumerics separated by single hyphens,
/// truncated to [`SLUG_MAX_LEN`]. Falls back to `"property"` when nothing
/// usable remains.
pub fn slugify(input: &str) -> String {
    let folded = deunicode(input);
    let mut slug = String::with_capacity(folded.len());
    let mut pending_separator = false;

    for c in folded.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
        // anything else is dropped without splitting the word
    }

    let slug = truncate_slug(&slug, SLUG_MAX_LEN);
    if slug.is_empty() {
        "property".to_string()
    } else {
        slug
    }
}

/// Candidate slug for the `attempt`-th collision: `base`, `base-2`, `base-3`...
/// The base is shortened so the result never exceeds [`SLUG_MAX_LEN`].
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        return truncate_slug(base, SLUG_MAX_LEN);
    }

    let suffix = format!("-{attempt}");
    let room = SLUG_MAX_LEN.saturating_sub(suffix.len());
    format!("{}{}", truncate_slug(base, room), suffix)
}

fn truncate_slug(slug: &str, max_len: usize) -> String {
    // Slugs are ASCII, so byte and char boundaries coincide.
    let cut = &slug[..slug.len().min(max_len)];
    cut.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_codes_are_ten_upper_alphanumerics() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let code = generate_ref_code(&mut rng);
            assert!(is_valid_ref_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn seeded_generator_is_deterministic() {
        let a = SeededRefCodes::new(7);
        let b = SeededRefCodes::new(7);
        let first: Vec<String> = (0..5).map(|_| a.next_code()).collect();
        let second: Vec<String> = (0..5).map(|_| b.next_code()).collect();
        assert_eq!(first, second);

        let distinct: HashSet<_> = first.iter().collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn ref_code_validation() {
        assert!(is_valid_ref_code("AB12CD34EF"));
        assert!(!is_valid_ref_code("ab12cd34ef"));
        assert!(!is_valid_ref_code("AB12CD34E"));
        assert!(!is_valid_ref_code("AB12CD34EF5"));
        assert!(!is_valid_ref_code("AB12-D34EF"));
    }

    #[test]
    fn title_case_matches_word_rules() {
        assert_eq!(title_case("cozy flat near the PARK"), "Cozy Flat Near The Park");
        assert_eq!(title_case("3rd floor studio"), "3Rd Floor Studio");
        assert_eq!(title_case("o'neil's house"), "O'Neil'S House");
        assert_eq!(title_case("уютная квартира"), "Уютная Квартира");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Cozy Flat Near The Park"), "cozy-flat-near-the-park");
        assert_eq!(slugify("  Lake -- View!  "), "lake-view");
        assert_eq!(slugify("O'Neil's House"), "oneils-house");
        assert_eq!(slugify("!!!"), "property");
    }

    #[test]
    fn slugify_transliterates_accented_titles() {
        assert_eq!(slugify("Café Château"), "cafe-chateau");
        assert_eq!(slugify("Über Straße 5"), "uber-strasse-5");
        assert_eq!(slugify("Квартира у парка"), "kvartira-u-parka");
    }

    #[test]
    fn slugify_truncates_to_max_len() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= SLUG_MAX_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn slug_candidates_append_suffix_within_limit() {
        assert_eq!(slug_candidate("lake-view", 1), "lake-view");
        assert_eq!(slug_candidate("lake-view", 2), "lake-view-2");
        assert_eq!(slug_candidate("lake-view", 13), "lake-view-13");

        let base = "a".repeat(SLUG_MAX_LEN);
        let candidate = slug_candidate(&base, 7);
        assert_eq!(candidate.len(), SLUG_MAX_LEN);
        assert!(candidate.ends_with("-7"));
    }
}
