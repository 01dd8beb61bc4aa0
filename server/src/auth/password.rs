//! Password hashing.
//!
//! Passwords are hashed with Argon2id at a fixed cost: 19 MiB of memory,
//! 2 passes, 1 lane (`argon2::Params::DEFAULT`). On current server hardware
//! one hash or verification takes a few tens of milliseconds, which keeps
//! interactive logins fast while making offline guessing expensive.
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel with
//! the hash and verification does not depend on the current defaults.
//!
//! # Invariants
//! - Every hash uses a fresh 16-byte random salt.
//! - Verification compares tags in constant time.
//! - Rejecting an unknown account costs one verification, the same as
//!   rejecting a wrong password.

use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Error returned when hashing fails.
#[derive(Debug)]
pub struct HashError(argon2::password_hash::Error);

impl std::fmt::Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to hash password: {}", self.0)
    }
}

impl std::error::Error for HashError {}

/// Salted, adaptive-cost password hashing.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }
}

impl PasswordHasher {
    /// A hasher with the minimum Argon2 cost. Only for tests.
    #[cfg(test)]
    #[must_use]
    pub fn insecure_fast() -> Self {
        #[allow(clippy::expect_used)]
        let params = Params::new(
            Params::MIN_M_COST,
            Params::MIN_T_COST,
            Params::MIN_P_COST,
            None,
        )
        .expect("minimum argon2 params are valid");
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Post-conditions
    /// - The result is a PHC string and never equals the plaintext.
    pub fn hash(&self, password: &str) -> Result<Vec<u8>, HashError> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(HashError)?;

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(HashError)?;
        Ok(hash.to_string().into_bytes())
    }

    /// Check a password against a stored hash.
    ///
    /// A stored hash that cannot be parsed never verifies.
    #[must_use]
    pub fn verify(&self, hash: &[u8], password: &str) -> bool {
        let Ok(hash) = std::str::from_utf8(hash) else {
            return false;
        };
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// A well-formed hash at this hasher's cost that no password matches.
    fn dummy_hash(&self) -> String {
        format!(
            "$argon2id$v=19$m={},t={},p={}${}${}",
            self.params.m_cost(),
            self.params.t_cost(),
            self.params.p_cost(),
            "A".repeat(22),
            "A".repeat(43),
        )
    }

    /// Spend one full verification on a password with no stored hash.
    ///
    /// Always returns `false`.
    #[must_use]
    pub fn verify_missing(&self, password: &str) -> bool {
        let dummy = self.dummy_hash();
        let _ = self.verify(dummy.as_bytes(), password);
        false
    }
}
