//! Errors returned by the auth service.
//!
//! Every failure carries the name of the operation that produced it and an
//! [`ErrorKind`] callers match on. Backend failures keep their cause as the
//! error source for logging, but the display text never includes it, and
//! nothing here ever holds a password or an app secret.

use std::fmt;

/// What went wrong, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required field was missing or empty. Holds a short description.
    InvalidArgument(&'static str),
    /// The email/password pair does not authenticate. Used both for an
    /// unknown email and for a wrong password.
    InvalidCredentials,
    /// Authenticated, but the user is not an admin.
    NotAdminRights,
    /// A referenced app or user id does not exist.
    NotFound,
    /// The email or app name is already taken.
    AlreadyExists,
    /// The token signature is valid but its expiry has passed.
    ExpiredToken,
    /// The token is malformed or its signature does not verify.
    InvalidToken,
    /// Anything else, such as an unavailable store.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::NotAdminRights => write!(f, "user doesn't have admin rights"),
            Self::NotFound => write!(f, "not found"),
            Self::AlreadyExists => write!(f, "already exists"),
            Self::ExpiredToken => write!(f, "token was expired"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::Internal => write!(f, "internal error"),
        }
    }
}

type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An auth service failure: operation name, kind, and optional cause.
#[derive(Debug)]
pub struct AuthError {
    op: &'static str,
    kind: ErrorKind,
    source: Option<Source>,
}

impl AuthError {
    #[must_use]
    pub const fn new(op: &'static str, kind: ErrorKind) -> Self {
        Self {
            op,
            kind,
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<Source>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub const fn op(&self) -> &'static str {
        self.op
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.op, self.kind)
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
