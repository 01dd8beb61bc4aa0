//! In-memory credential index shared by every store implementation.
//!
//! Mutations are two-phase: `prepare_*` validates uniqueness against the
//! current state and produces the [`LogRecord`] describing the change, and
//! [`CredentialIndex::apply`] makes it visible. Stores run both phases under
//! one exclusive lock, with any durable write in between, so a failed write
//! never leaves a partially applied record.
//!
//! # Invariants
//! - `users` and `emails_by_id` describe the same set of users.
//! - `apps` and `app_ids_by_name` describe the same set of apps.
//! - Every id in `admins` belongs to a known user.

use std::collections::{HashMap, HashSet};

use crate::storage::{LogRecord, StorageError};
use crate::types::{App, AppId, User, UserId};

#[derive(Debug, Default)]
pub struct CredentialIndex {
    users: HashMap<String, User>,
    emails_by_id: HashMap<UserId, String>,
    admins: HashSet<UserId>,
    apps: HashMap<AppId, App>,
    app_ids_by_name: HashMap<String, AppId>,
    last_user_id: i64,
    last_app_id: i64,
}

impl CredentialIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a new user and describe its creation.
    ///
    /// # Errors
    /// `StorageError::UserExists` if the email is taken.
    pub fn prepare_user(
        &self,
        email: &str,
        pass_hash: &[u8],
    ) -> Result<(UserId, LogRecord), StorageError> {
        if self.users.contains_key(email) {
            return Err(StorageError::UserExists);
        }
        let id = UserId(self.last_user_id + 1);
        Ok((
            id,
            LogRecord::UserCreated {
                id,
                email: email.to_string(),
                pass_hash: pass_hash.to_vec(),
            },
        ))
    }

    /// Validate a new app and describe its creation.
    ///
    /// # Errors
    /// `StorageError::AppExists` if the name is taken.
    pub fn prepare_app(
        &self,
        name: &str,
        secret: &[u8],
    ) -> Result<(AppId, LogRecord), StorageError> {
        if self.app_ids_by_name.contains_key(name) {
            return Err(StorageError::AppExists);
        }
        let id = AppId(self.last_app_id + 1);
        Ok((
            id,
            LogRecord::AppCreated {
                id,
                name: name.to_string(),
                secret: secret.to_vec(),
            },
        ))
    }

    /// Describe a change to a user's admin flag.
    ///
    /// # Errors
    /// `StorageError::UserNotFound` if the id is unknown.
    pub fn prepare_admin(&self, user_id: UserId, is_admin: bool) -> Result<LogRecord, StorageError> {
        if !self.emails_by_id.contains_key(&user_id) {
            return Err(StorageError::UserNotFound);
        }
        Ok(LogRecord::AdminSet { user_id, is_admin })
    }

    /// Make a record visible to reads.
    ///
    /// Re-validates the record, so replaying a log that contradicts itself
    /// fails instead of silently overwriting.
    pub fn apply(&mut self, record: LogRecord) -> Result<(), StorageError> {
        match record {
            LogRecord::UserCreated {
                id,
                email,
                pass_hash,
            } => {
                if self.users.contains_key(&email) || self.emails_by_id.contains_key(&id) {
                    return Err(StorageError::UserExists);
                }
                self.last_user_id = self.last_user_id.max(id.get());
                self.emails_by_id.insert(id, email.clone());
                self.users.insert(
                    email.clone(),
                    User {
                        id,
                        email,
                        pass_hash,
                    },
                );
            }
            LogRecord::AppCreated { id, name, secret } => {
                if self.app_ids_by_name.contains_key(&name) || self.apps.contains_key(&id) {
                    return Err(StorageError::AppExists);
                }
                self.last_app_id = self.last_app_id.max(id.get());
                self.app_ids_by_name.insert(name.clone(), id);
                self.apps.insert(id, App { id, name, secret });
            }
            LogRecord::AdminSet { user_id, is_admin } => {
                if !self.emails_by_id.contains_key(&user_id) {
                    return Err(StorageError::UserNotFound);
                }
                if is_admin {
                    self.admins.insert(user_id);
                } else {
                    self.admins.remove(&user_id);
                }
            }
        }
        Ok(())
    }

    pub fn user(&self, email: &str) -> Result<User, StorageError> {
        self.users.get(email).cloned().ok_or(StorageError::UserNotFound)
    }

    pub fn user_by_id(&self, user_id: UserId) -> Result<User, StorageError> {
        self.emails_by_id
            .get(&user_id)
            .and_then(|email| self.users.get(email))
            .cloned()
            .ok_or(StorageError::UserNotFound)
    }

    pub fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        if !self.emails_by_id.contains_key(&user_id) {
            return Err(StorageError::UserNotFound);
        }
        Ok(self.admins.contains(&user_id))
    }

    pub fn app(&self, app_id: AppId) -> Result<App, StorageError> {
        self.apps.get(&app_id).cloned().ok_or(StorageError::AppNotFound)
    }

    #[must_use]
    pub fn app_by_name(&self, name: &str) -> Option<App> {
        self.app_ids_by_name
            .get(name)
            .and_then(|id| self.apps.get(id))
            .cloned()
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn app_count(&self) -> usize {
        self.apps.len()
    }
}
