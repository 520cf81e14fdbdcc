//! Password hashing and strength policy

use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::DomainError;

/// Minimum number of characters in a password
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// bcrypt only reads this many bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordError {
    /// Rejected by the strength policy
    #[error("{0}")]
    Weak(String),

    #[error("Failed to hash password: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<PasswordError> for DomainError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Weak(msg) => DomainError::Validation(msg),
            PasswordError::Hashing(err) => DomainError::Internal(err.to_string()),
        }
    }
}

/// Check a password against the policy: at least [`MIN_PASSWORD_LENGTH`]
/// characters, at most [`MAX_PASSWORD_BYTES`] bytes, one letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::Weak(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::Weak(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(PasswordError::Weak(
            "Password must contain at least one letter".into(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::Weak(
            "Password must contain at least one number".into(),
        ));
    }
    Ok(())
}

/// bcrypt-backed credential verifier.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password after enforcing the strength policy.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        validate_password_strength(password)?;
        Ok(hash(password, self.cost)?)
    }

    /// Verify a password against a digest.
    ///
    /// Malformed digests and candidates bcrypt would truncate count as a
    /// mismatch.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        verify(password, digest).unwrap_or(false)
    }

    /// A digest of a random secret at this hasher's cost.
    ///
    /// Login checks unknown accounts against it so every failure path pays
    /// for one bcrypt comparison.
    pub fn decoy_digest(&self) -> String {
        hash(Uuid::new_v4().to_string(), self.cost).unwrap_or_default()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hashed = hasher.hash("secure_password_123").unwrap();

        assert!(hasher.verify("secure_password_123", &hashed));
        assert!(!hasher.verify("wrong_password_123", &hashed));
    }

    #[test]
    fn weak_passwords_are_rejected_before_hashing() {
        let hasher = hasher();
        for weak in ["abc", "abcdefgh", "12345678", ""] {
            assert!(
                matches!(hasher.hash(weak), Err(PasswordError::Weak(_))),
                "{weak:?} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_digest_is_a_mismatch() {
        assert!(!hasher().verify("password123", "not-a-bcrypt-digest"));
    }

    #[test]
    fn shared_72_byte_prefix_does_not_cross_verify() {
        let hasher = hasher();
        let prefix = format!("{}1", "a".repeat(71));
        assert_eq!(prefix.len(), MAX_PASSWORD_BYTES);

        let long = format!("{prefix}CorrectHorse9");
        assert!(matches!(hasher.hash(&long), Err(PasswordError::Weak(_))));

        let digest = hasher.hash(&prefix).unwrap();
        assert!(hasher.verify(&prefix, &digest));
        assert!(!hasher.verify(&format!("{prefix}TotallyDifferent"), &digest));
    }

    #[test]
    fn over_long_password_maps_to_validation() {
        let err: DomainError = validate_password_strength(&format!("{}1", "a".repeat(80)))
            .unwrap_err()
            .into();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn decoy_digest_uses_configured_cost_and_matches_nothing() {
        let hasher = hasher();
        let decoy = hasher.decoy_digest();
        assert!(decoy.starts_with("$2b$04$"), "{decoy}");
        assert!(!hasher.verify("password123", &decoy));
    }

    #[test]
    fn weak_password_maps_to_validation() {
        let err: DomainError = validate_password_strength("abc").unwrap_err().into();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
