//! Authentication.
//!
//! [`AuthService`] implements the four operations exposed to clients
//! (login, registration, the admin check, app creation) on top of a
//! credential [`Storage`](crate::storage::Storage), a [`PasswordHasher`] and
//! a [`TokenIssuer`].
//!
//! # Invariants
//! - Plaintext passwords are never stored, logged, or returned.
//! - Every token is signed with the secret of exactly one app.

pub mod error;
pub mod jwt;
pub mod password;
pub mod service;

pub use error::{AuthError, ErrorKind};
pub use jwt::{Claims, TokenError, TokenIssuer};
pub use password::{HashError, PasswordHasher};
pub use service::AuthService;
