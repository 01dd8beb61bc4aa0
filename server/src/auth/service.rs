//! Core business logic for the authentication system.
//!
//! `AuthService` orchestrates the credential store, the password hasher and
//! the token issuer. It holds no per-request state and no locks; all
//! concurrency control lives in the store.
//!
//! # Invariants
//! - An unknown email and a wrong password fail identically
//!   (`InvalidCredentials`), so callers cannot enumerate accounts.
//! - `create_app` authenticates, then checks admin rights, then mutates.
//!   No path creates an app without passing both checks in that order.
//! - Store failures are never swallowed or retried.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthError, Claims, ErrorKind, PasswordHasher, TokenError, TokenIssuer};
use crate::storage::{Storage, StorageError};
use crate::types::{AppId, User, UserId};

/// Map a store failure to the caller-facing error kind.
fn storage_error(op: &'static str, error: StorageError) -> AuthError {
    let kind = match error {
        StorageError::UserNotFound | StorageError::AppNotFound => ErrorKind::NotFound,
        StorageError::UserExists | StorageError::AppExists => ErrorKind::AlreadyExists,
        StorageError::Io(_) | StorageError::Corrupt { .. } | StorageError::LockPoisoned => {
            ErrorKind::Internal
        }
    };
    AuthError::new(op, kind).with_source(error)
}

fn internal(op: &'static str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> AuthError {
    AuthError::new(op, ErrorKind::Internal).with_source(source)
}

/// The authentication service.
pub struct AuthService<S> {
    storage: Arc<S>,
    token_ttl: Duration,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl<S: Storage> AuthService<S> {
    /// Create a service issuing tokens valid for `token_ttl`.
    #[must_use]
    pub fn new(storage: Arc<S>, token_ttl: Duration) -> Self {
        Self {
            storage,
            token_ttl,
            hasher: PasswordHasher::default(),
            tokens: TokenIssuer::new(),
        }
    }

    /// Replace the password hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    #[must_use]
    pub const fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Log a user in to `app_id` and return a signed token.
    ///
    /// # Errors
    /// - `InvalidCredentials` if the email is unknown or the password wrong.
    /// - `NotFound` if the app does not exist.
    /// - `Internal` on store or signing failure.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        app_id: AppId,
    ) -> Result<String, AuthError> {
        const OP: &str = "auth.login";

        let user = self.authenticate(OP, email, password).await?;
        let app = self
            .storage
            .app(app_id)
            .await
            .map_err(|e| storage_error(OP, e))?;

        self.tokens
            .issue(&user, &app, self.token_ttl)
            .map_err(|e| internal(OP, e))
    }

    /// Register a new user and return its id.
    ///
    /// # Errors
    /// - `InvalidArgument` if the email or password is empty.
    /// - `AlreadyExists` if the email is taken.
    /// - `Internal` on store or hashing failure.
    pub async fn register_new_user(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        const OP: &str = "auth.register_new_user";

        if email.is_empty() {
            return Err(AuthError::new(OP, ErrorKind::InvalidArgument("email must not be empty")));
        }
        if password.is_empty() {
            return Err(AuthError::new(
                OP,
                ErrorKind::InvalidArgument("password must not be empty"),
            ));
        }

        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let pass_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| internal(OP, e))?
            .map_err(|e| internal(OP, e))?;

        self.storage
            .save_user(email, &pass_hash)
            .await
            .map_err(|e| storage_error(OP, e))
    }

    /// Whether the user holds admin rights.
    ///
    /// # Errors
    /// - `NotFound` if the user id is unknown.
    pub async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError> {
        const OP: &str = "auth.is_admin";

        self.storage
            .is_admin(user_id)
            .await
            .map_err(|e| storage_error(OP, e))
    }

    /// Provision a new app. The caller must be an admin and re-proves their
    /// password on every call.
    ///
    /// # Errors
    /// - `InvalidArgument` if the app name or secret is empty.
    /// - `InvalidCredentials` if authentication fails.
    /// - `NotAdminRights` if the authenticated user is not an admin.
    /// - `AlreadyExists` if the app name is taken.
    pub async fn create_app(
        &self,
        email: &str,
        password: &str,
        app_name: &str,
        app_secret: &str,
    ) -> Result<AppId, AuthError> {
        const OP: &str = "auth.create_app";

        if app_name.is_empty() {
            return Err(AuthError::new(
                OP,
                ErrorKind::InvalidArgument("app_name must not be empty"),
            ));
        }
        // Every token for an app with an empty secret would be forgeable.
        if app_secret.is_empty() {
            return Err(AuthError::new(
                OP,
                ErrorKind::InvalidArgument("app_secret must not be empty"),
            ));
        }

        let user = self.authenticate(OP, email, password).await?;

        let is_admin = self
            .storage
            .is_admin(user.id)
            .await
            .map_err(|e| storage_error(OP, e))?;
        if !is_admin {
            return Err(AuthError::new(OP, ErrorKind::NotAdminRights));
        }

        self.storage
            .create_app(app_name, app_secret.as_bytes())
            .await
            .map_err(|e| storage_error(OP, e))
    }

    /// Verify a token issued for `app_id` and return its claims.
    ///
    /// # Errors
    /// - `NotFound` if the app does not exist.
    /// - `InvalidToken` if the token is malformed or its signature fails.
    /// - `ExpiredToken` if the signature is valid but the token expired.
    pub async fn verify_token(&self, token: &str, app_id: AppId) -> Result<Claims, AuthError> {
        const OP: &str = "auth.verify_token";

        let app = self
            .storage
            .app(app_id)
            .await
            .map_err(|e| storage_error(OP, e))?;

        self.tokens.verify(token, &app).map_err(|e| match e {
            TokenError::Expired => AuthError::new(OP, ErrorKind::ExpiredToken),
            TokenError::Invalid | TokenError::EmptySecret | TokenError::Signing(_) => {
                AuthError::new(OP, ErrorKind::InvalidToken)
            }
        })
    }

    /// Check an email/password pair and return the user.
    ///
    /// An empty email or password, an unknown email, and a wrong password
    /// all yield `InvalidCredentials`.
    async fn authenticate(
        &self,
        op: &'static str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::new(op, ErrorKind::InvalidCredentials));
        }

        // An unknown email still pays for one verification.
        let user = match self.storage.user(email).await {
            Ok(user) => Some(user),
            Err(StorageError::UserNotFound) => None,
            Err(e) => return Err(storage_error(op, e)),
        };

        let hasher = self.hasher.clone();
        let pass_hash = user.as_ref().map(|u| u.pass_hash.clone());
        let password = password.to_owned();
        let valid = tokio::task::spawn_blocking(move || {
            pass_hash.map_or_else(
                || hasher.verify_missing(&password),
                |pass_hash| hasher.verify(&pass_hash, &password),
            )
        })
        .await
        .map_err(|e| internal(op, e))?;

        let Some(user) = user.filter(|_| valid) else {
            return Err(AuthError::new(op, ErrorKind::InvalidCredentials));
        };
        Ok(user)
    }
}
