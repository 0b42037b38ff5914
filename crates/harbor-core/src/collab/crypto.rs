//! Crypto collaborator: password hashing and random values

use crate::Result;

/// Password hashing parameters.
///
/// Replaces the original arity-overloaded `hashPassword` call: callers that
/// want the defaults pass `HashConfig::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    /// Key-stretching iteration count
    pub iteration_count: u32,
    /// Derived key length in bytes
    pub key_length: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            iteration_count: 100_000,
            key_length: 64,
        }
    }
}

/// Result of a password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    /// Encoded salt
    pub salt: String,
    /// Encoded derived key
    pub password_hash: String,
    /// Iteration count actually used
    pub iteration_count: u32,
    /// Key length actually used
    pub key_length: u32,
}

/// Opaque crypto collaborator.
///
/// The hash scheme is assumed and pluggable; algorithm selection is out of
/// scope.
pub trait Crypto: Send + Sync {
    /// Hash a password with the given parameters
    fn hash_password(&self, value: &str, config: &HashConfig) -> Result<HashedPassword>;

    /// Uniform random integer in `[min, max]` inclusive
    fn random_integer(&self, min: i64, max: i64) -> i64;

    /// Short numeric confirmation code suitable for email/SMS challenges
    fn confirmation_code(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hash_config() {
        let config = HashConfig::default();
        assert_eq!(config.iteration_count, 100_000);
        assert_eq!(config.key_length, 64);
    }
}
