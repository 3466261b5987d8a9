//! User Password Value Object
//!
//! Domain wrapper around `platform::password`. Policy violations become
//! `AppError::bad_request` so handlers can attach them to a field.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//!
//! let raw = RawPassword::new("qwerty1".to_string()).unwrap();
//! let hashed = UserPassword::from_raw(&raw, None).unwrap();
//! assert!(hashed.verify(&raw, None));
//! ```

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password, enforcing the 6..=20 character policy
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, .. } => {
                AppError::bad_request(format!("Password must be at least {} characters", min))
            }
            PasswordPolicyError::TooLong { max, .. } => {
                AppError::bad_request(format!("Password must be at most {} characters", max))
            }
            PasswordPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password cannot be empty")
            }
            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Wrap a login attempt; no policy is applied
    pub fn attempt(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id PHC string, safe to store
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a validated raw password
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        let hashed = raw
            .inner()
            .hash(pepper)
            .map_err(|e| AppError::internal("Password hashing failed").with_source(e))?;

        Ok(Self(hashed))
    }

    /// Create from PHC string (from database)
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string)
            .map_err(|e| AppError::internal("Invalid password hash in database").with_source(e))?;

        Ok(Self(hashed))
    }

    /// Get PHC string for database storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("qwerty1".to_string()).is_ok());
        assert!(RawPassword::new("12345".to_string()).is_err());
        assert!(RawPassword::new("a".repeat(21)).is_err());
        assert!(RawPassword::new("".to_string()).is_err());
    }

    #[test]
    fn test_policy_message() {
        let err = RawPassword::new("abc".to_string()).unwrap_err();
        assert_eq!(err.message(), "Password must be at least 6 characters");
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("qwerty1".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None).unwrap();

        assert!(hashed.verify(&raw, None));
        assert!(!hashed.verify(&RawPassword::attempt("qwerty2".to_string()), None));
        // too short to register with, but still just a failed attempt
        assert!(!hashed.verify(&RawPassword::attempt("q".to_string()), None));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("qwerty1".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, Some(b"pepper")).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, Some(b"pepper")));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("Secret12".to_string()).unwrap();
        assert!(!format!("{:?}", raw).contains("Secret"));
    }
}
