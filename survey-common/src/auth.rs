//! Admin password hashing
//!
//! Passwords are stored as bcrypt hashes. The encoded hash carries its own
//! salt and cost, so one column holds everything needed to verify. Pure
//! functions only; the admin table itself is in [`crate::db::admins`].

use crate::{Error, Result};

/// Work factor for new password hashes
pub const DEFAULT_HASH_COST: u32 = bcrypt::DEFAULT_COST;

/// Cheapest work factor bcrypt accepts
pub const MIN_HASH_COST: u32 = 4; // bcrypt::MIN_COST is private in bcrypt 0.15

/// Hash a password with a fresh random salt
///
/// # Examples
///
/// ```
/// use survey_common::auth::{hash_password, verify_password, MIN_HASH_COST};
///
/// let hash = hash_password("secret", MIN_HASH_COST).unwrap();
/// assert!(hash.starts_with("$2b$04$"));
/// assert!(verify_password("secret", &hash));
/// assert_ne!(hash, hash_password("secret", MIN_HASH_COST).unwrap());
/// ```
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Check a password attempt against a stored hash
///
/// A malformed stored hash never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password() {
        let stored = hash_password("correct horse", MIN_HASH_COST).unwrap();

        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn test_hash_records_cost() {
        let stored = hash_password("pw", MIN_HASH_COST + 1).unwrap();
        assert!(stored.starts_with("$2b$05$"));
        assert_eq!(stored.len(), 60);
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(matches!(
            hash_password("pw", MIN_HASH_COST - 1),
            Err(Error::PasswordHash(_))
        ));
    }

    #[test]
    fn test_malformed_stored_hash_never_matches() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("pw", "not-a-bcrypt-hash"));
    }
}
