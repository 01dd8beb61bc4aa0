//! Volatile credential store.
//!
//! Holds a [`CredentialIndex`] behind an `RwLock`: lookups share the lock,
//! mutations take it exclusively for their whole check-then-insert step.

use std::sync::RwLock;

use crate::storage::{AppProvider, CredentialIndex, StorageError, UserProvider, UserSaver};
use crate::types::{App, AppId, User, UserId};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    index: RwLock<CredentialIndex>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&CredentialIndex) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let index = self.index.read().map_err(|_| StorageError::LockPoisoned)?;
        f(&index)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut CredentialIndex) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut index = self.index.write().map_err(|_| StorageError::LockPoisoned)?;
        f(&mut index)
    }

    /// Grant or revoke admin rights.
    pub fn set_admin(&self, user_id: UserId, is_admin: bool) -> Result<(), StorageError> {
        self.write(|index| {
            let record = index.prepare_admin(user_id, is_admin)?;
            index.apply(record)
        })
    }

    pub fn user_by_id(&self, user_id: UserId) -> Result<User, StorageError> {
        self.read(|index| index.user_by_id(user_id))
    }

    pub fn app_by_name(&self, name: &str) -> Result<Option<App>, StorageError> {
        self.read(|index| Ok(index.app_by_name(name)))
    }

    pub fn app_count(&self) -> Result<usize, StorageError> {
        self.read(|index| Ok(index.app_count()))
    }
}

impl UserSaver for MemoryStorage {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<UserId, StorageError> {
        self.write(|index| {
            let (id, record) = index.prepare_user(email, pass_hash)?;
            index.apply(record)?;
            Ok(id)
        })
    }
}

impl UserProvider for MemoryStorage {
    async fn user(&self, email: &str) -> Result<User, StorageError> {
        self.read(|index| index.user(email))
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        self.read(|index| index.is_admin(user_id))
    }
}

impl AppProvider for MemoryStorage {
    async fn app(&self, app_id: AppId) -> Result<App, StorageError> {
        self.read(|index| index.app(app_id))
    }

    async fn create_app(&self, name: &str, secret: &[u8]) -> Result<AppId, StorageError> {
        self.write(|index| {
            let (id, record) = index.prepare_app(name, secret)?;
            index.apply(record)?;
            Ok(id)
        })
    }
}
