//! JWT issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the secret of the app they were issued
//! for.
//!
//! # Pre-conditions
//! - The app secret must be non-empty.
//!
//! # Post-conditions
//! - `issue` sets `exp` to the issuer's current time plus the TTL.
//! - `verify` only returns claims whose signature checked out against the
//!   given app's secret, whose `app_id` is that app, and whose `exp` is
//!   still in the future.
//!
//! # Invariants
//! - The signature is checked before any claim is interpreted.
//! - Malformed tokens and bad signatures produce the same error, so callers
//!   cannot tell which check failed.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::time::{SystemTimeSource, TimeSource};
use crate::types::{App, User};

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    pub uid: i64,
    /// Subject email.
    pub email: String,
    /// Id of the app the token was issued for.
    pub app_id: i64,
    /// Absolute expiry, Unix seconds.
    pub exp: u64,
}

/// Error returned when issuing or verifying a token fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The app has no secret to sign with.
    EmptySecret,
    /// The signature is valid but the token has expired.
    Expired,
    /// The token is malformed, signed with another key, or meant for
    /// another app.
    Invalid,
    /// The signing library rejected the input.
    Signing(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "app secret must not be empty"),
            Self::Expired => write!(f, "token was expired"),
            Self::Invalid => write!(f, "invalid token"),
            Self::Signing(reason) => write!(f, "failed to sign token: {reason}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Signs and checks tokens against per-app secrets.
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer<T = SystemTimeSource> {
    clock: T,
}

impl TokenIssuer<SystemTimeSource> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock: SystemTimeSource,
        }
    }
}

impl<T: TimeSource> TokenIssuer<T> {
    /// Create an issuer that reads time from `clock`.
    #[must_use]
    pub const fn with_clock(clock: T) -> Self {
        Self { clock }
    }

    /// Issue a token for `user`, scoped to `app`, valid for `ttl`.
    ///
    /// # Errors
    /// `TokenError::EmptySecret` if the app has no secret.
    pub fn issue(&self, user: &User, app: &App, ttl: Duration) -> Result<String, TokenError> {
        if app.secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let claims = Claims {
            uid: user.id.get(),
            email: user.email.clone(),
            app_id: app.id.get(),
            exp: self.clock.now_secs().saturating_add(ttl.as_secs()),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&app.secret),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token against `app` and return its claims.
    ///
    /// # Errors
    /// `TokenError::Invalid` for any structural or signature failure,
    /// `TokenError::Expired` if the signature is good but `exp` has passed.
    pub fn verify(&self, token: &str, app: &App) -> Result<Claims, TokenError> {
        if app.secret.is_empty() {
            return Err(TokenError::Invalid);
        }

        // Expiry is checked below, after the signature, against our clock
        // and with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &DecodingKey::from_secret(&app.secret), &validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;

        if claims.app_id != app.id.get() {
            return Err(TokenError::Invalid);
        }
        if claims.exp <= self.clock.now_secs() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
