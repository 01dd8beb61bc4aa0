//! Credential storage.
//!
//! The auth service depends only on the capability traits in this module:
//! [`UserSaver`], [`UserProvider`] and [`AppProvider`], bundled as
//! [`Storage`]. Any backing store that honors them can be plugged in.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStorage`]: an in-memory index, lost on restart.
//! - [`FileStorage`]: the same index made durable by an append-only,
//!   checksummed record log that is replayed on open.
//!
//! # Invariants
//!
//! - Email uniquely identifies at most one user.
//! - App name uniquely identifies at most one app.
//! - Identifiers are assigned sequentially from 1 and never reused.
//! - A mutation is either fully visible to later reads or not at all.

use std::future::Future;

use crate::types::{App, AppId, User, UserId};

mod file;
mod index;
mod log;
mod memory;

pub use file::FileStorage;
pub use index::CredentialIndex;
pub use log::{LOG_MAGIC, LogRecord};
pub use memory::MemoryStorage;

/// Errors returned by credential stores.
#[derive(Debug)]
pub enum StorageError {
    /// A user with this email is already registered.
    UserExists,
    /// No user matches the lookup key.
    UserNotFound,
    /// An app with this name already exists.
    AppExists,
    /// No app matches the lookup key.
    AppNotFound,
    /// The backing file could not be read or written.
    Io(std::io::Error),
    /// The backing file contains data that cannot be replayed.
    Corrupt {
        /// Byte offset of the offending record.
        offset: u64,
        /// What was wrong with it.
        reason: String,
    },
    /// A thread panicked while holding the store lock.
    LockPoisoned,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserExists => write!(f, "user already exists"),
            Self::UserNotFound => write!(f, "user not found"),
            Self::AppExists => write!(f, "app already exists"),
            Self::AppNotFound => write!(f, "app not found"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Corrupt { offset, reason } => {
                write!(f, "corrupt record at offset {offset}: {reason}")
            }
            Self::LockPoisoned => write!(f, "storage lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Persists new users.
pub trait UserSaver: Send + Sync {
    /// Store a new user and return its identifier.
    ///
    /// # Errors
    /// `StorageError::UserExists` if the email is already registered.
    fn save_user(
        &self,
        email: &str,
        pass_hash: &[u8],
    ) -> impl Future<Output = Result<UserId, StorageError>> + Send;
}

/// Reads users and their privileges.
pub trait UserProvider: Send + Sync {
    /// Look up a user by email.
    ///
    /// # Errors
    /// `StorageError::UserNotFound` if no user has this email.
    fn user(&self, email: &str) -> impl Future<Output = Result<User, StorageError>> + Send;

    /// Whether the user holds admin rights.
    ///
    /// # Errors
    /// `StorageError::UserNotFound` if the id is unknown.
    fn is_admin(&self, user_id: UserId)
    -> impl Future<Output = Result<bool, StorageError>> + Send;
}

/// Reads and provisions apps.
pub trait AppProvider: Send + Sync {
    /// Look up an app by id.
    ///
    /// # Errors
    /// `StorageError::AppNotFound` if the id is unknown.
    fn app(&self, app_id: AppId) -> impl Future<Output = Result<App, StorageError>> + Send;

    /// Store a new app and return its identifier.
    ///
    /// # Errors
    /// `StorageError::AppExists` if the name is taken.
    fn create_app(
        &self,
        name: &str,
        secret: &[u8],
    ) -> impl Future<Output = Result<AppId, StorageError>> + Send;
}

/// Every capability the auth service needs from a store.
pub trait Storage: UserSaver + UserProvider + AppProvider {}

impl<T: UserSaver + UserProvider + AppProvider> Storage for T {}
