//! Shared utility functions for travel-cloud

use chrono::{DateTime, Utc};
use rand::Rng;

/// Reference-code alphabet without look-alike glyphs (0/O, 1/I/L)
const REFERENCE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";
const REFERENCE_SUFFIX_LEN: usize = 5;

/// Booking reference in the form `BK-YYMMDD-XXXXX`.
///
/// Not unique by construction; the `bookings.reference_code` unique index
/// catches collisions and the caller regenerates.
pub fn generate_reference_code() -> String {
    reference_code_at(Utc::now(), &mut rand::thread_rng())
}

fn reference_code_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..REFERENCE_SUFFIX_LEN)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("BK-{}-{suffix}", now.format("%y%m%d"))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Emails are compared case-insensitively; store them trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn is_reference_code(code: &str) -> bool {
        let parts: Vec<&str> = code.split('-').collect();
        parts.len() == 3
            && parts[0] == "BK"
            && parts[1].len() == 6
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && parts[2].len() == REFERENCE_SUFFIX_LEN
            && parts[2].bytes().all(|b| REFERENCE_ALPHABET.contains(&b))
    }

    #[test]
    fn test_reference_code_format() {
        for _ in 0..200 {
            let code = generate_reference_code();
            assert!(is_reference_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_reference_code_uses_utc_date() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 0).unwrap();
        let code = reference_code_at(now, &mut rand::thread_rng());
        assert!(code.starts_with("BK-250314-"));
    }

    #[test]
    fn test_alphabet_excludes_ambiguous() {
        for c in [b'0', b'1', b'O', b'I', b'L'] {
            assert!(!REFERENCE_ALPHABET.contains(&c));
        }
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }
}
