//! Identity records.
//!
//! # Invariants
//! - `email` is non-empty and unique across all users of a store.
//! - `pass_hash` is never the plaintext password and is never printed.

use std::fmt;

use super::UserId;

/// A registered user.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Argon2 PHC string bytes.
    pub pass_hash: Vec<u8>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("pass_hash", &"<redacted>")
            .finish()
    }
}
