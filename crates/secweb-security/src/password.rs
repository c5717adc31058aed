//! Password hashing with Argon2, verification of Argon2 and legacy bcrypt
//!
//! Stored hashes may carry an `{id}` prefix naming the scheme
//! (`{argon2}$argon2id$...`, `{bcrypt}$2a$10$...`). Unprefixed PHC and
//! modular-crypt strings are recognised by their own `$` prefix.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

const BCRYPT_HASH_LEN: usize = 60;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Unsupported password scheme: {0}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Argon2,
    Bcrypt,
}

impl HashScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashScheme::Argon2 => "argon2",
            HashScheme::Bcrypt => "bcrypt",
        }
    }

    /// Splits a stored hash into its scheme and the encoded hash proper.
    pub fn detect(stored: &str) -> Result<(HashScheme, &str), PasswordError> {
        if let Some(rest) = stored.strip_prefix('{') {
            let (id, encoded) = rest
                .split_once('}')
                .ok_or_else(|| PasswordError::UnsupportedScheme(stored.chars().take(12).collect()))?;
            return match id {
                "argon2" => Ok((HashScheme::Argon2, encoded)),
                "bcrypt" => Ok((HashScheme::Bcrypt, encoded)),
                other => Err(PasswordError::UnsupportedScheme(other.to_string())),
            };
        }

        if stored.starts_with("$argon2") {
            Ok((HashScheme::Argon2, stored))
        } else if ["$2a$", "$2b$", "$2x$", "$2y$"]
            .iter()
            .any(|p| stored.starts_with(p))
        {
            Ok((HashScheme::Bcrypt, stored))
        } else {
            Err(PasswordError::UnsupportedScheme("unprefixed".to_string()))
        }
    }
}

pub struct PasswordService;

impl PasswordService {
    /// Hashes with Argon2id, returning an `{argon2}`-prefixed PHC string.
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| format!("{{{}}}{}", HashScheme::Argon2.as_str(), h))
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    /// CPU-bound; call from a blocking context.
    pub fn verify(password: &str, stored: &str) -> Result<bool, PasswordError> {
        let (scheme, encoded) = HashScheme::detect(stored)?;
        match scheme {
            HashScheme::Argon2 => {
                let parsed_hash = PasswordHash::new(encoded)
                    .map_err(|e| PasswordError::HashError(e.to_string()))?;
                Ok(Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok())
            }
            HashScheme::Bcrypt => bcrypt::verify(password, encoded)
                .map_err(|e| PasswordError::HashError(e.to_string())),
        }
    }

    /// Checks a stored hash is well formed without verifying anything.
    pub fn validate_stored(stored: &str) -> Result<HashScheme, PasswordError> {
        let (scheme, encoded) = HashScheme::detect(stored)?;
        match scheme {
            HashScheme::Argon2 => {
                PasswordHash::new(encoded).map_err(|e| PasswordError::HashError(e.to_string()))?;
            }
            HashScheme::Bcrypt => {
                if encoded.len() != BCRYPT_HASH_LEN {
                    return Err(PasswordError::HashError(format!(
                        "bcrypt hash must be {} characters",
                        BCRYPT_HASH_LEN
                    )));
                }
            }
        }
        Ok(scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt(cost 10) of "user"
    const LEGACY_USER_HASH: &str =
        "{bcrypt}$2a$10$iJAaEIeg9PGshTJhFAQb5efHOJ3/lhroe/Ndq8DkYhUfcObb19nIO";

    #[test]
    fn test_hash_is_prefixed_argon2() {
        let hash = PasswordService::hash("user").unwrap();
        assert!(hash.starts_with("{argon2}$argon2id$"));
        assert!(PasswordService::verify("user", &hash).unwrap());
        assert!(!PasswordService::verify("User", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = PasswordService::hash("user").unwrap();
        let b = PasswordService::hash("user").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_legacy_bcrypt() {
        assert!(PasswordService::verify("user", LEGACY_USER_HASH).unwrap());
        assert!(!PasswordService::verify("invalidpassword", LEGACY_USER_HASH).unwrap());
    }

    #[test]
    fn test_unprefixed_bcrypt_detected() {
        let hash = bcrypt::hash("pw", 4).unwrap();
        assert_eq!(HashScheme::detect(&hash).unwrap().0, HashScheme::Bcrypt);
        assert!(PasswordService::verify("pw", &hash).unwrap());
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        assert!(matches!(
            PasswordService::verify("user", "{noop}user"),
            Err(PasswordError::UnsupportedScheme(id)) if id == "noop"
        ));
        assert!(matches!(
            PasswordService::verify("user", "plaintext"),
            Err(PasswordError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_validate_stored() {
        assert_eq!(
            PasswordService::validate_stored(LEGACY_USER_HASH).unwrap(),
            HashScheme::Bcrypt
        );
        assert!(PasswordService::validate_stored("{bcrypt}$2a$10$short").is_err());
        assert!(PasswordService::validate_stored("{argon2}$argon2id$garbage").is_err());
    }
}
