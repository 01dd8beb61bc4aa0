//! Durable credential store backed by an append-only record log.
//!
//! On open, every record in the file is replayed into a [`CredentialIndex`].
//! Each mutation then appends one record and syncs it before the change is
//! applied to the index.
//!
//! Writers are serialized by the log mutex and prepare against the index
//! under a read lock, so lookups never wait on a disk sync. The index write
//! lock is held only to apply an already durable record. Async callers run
//! mutations on the blocking pool.
//!
//! # Recovery
//!
//! - A record cut short at the end of the file is a torn write from a crash
//!   mid-append. It was never acknowledged, so it is truncated away.
//! - A truncated record followed by any complete record, a checksum
//!   mismatch, an unknown record type, or a record that contradicts earlier
//!   state is corruption and fails the open.
//! - If a failed append cannot be rolled back, the log refuses further
//!   writes until the store is reopened.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::storage::log::{LogError, find_complete_record};
use crate::storage::{
    AppProvider, CredentialIndex, LOG_MAGIC, LogRecord, StorageError, UserProvider, UserSaver,
};
use crate::types::{App, AppId, User, UserId};

struct LogFile {
    file: File,
    /// Length of the durable, fully written prefix of the file.
    len: u64,
    /// Set when a failed append could not be rolled back. The bytes after
    /// `len` are then unknown, so nothing more may be appended.
    poisoned: bool,
}

impl LogFile {
    const fn new(file: File, len: u64) -> Self {
        Self {
            file,
            len,
            poisoned: false,
        }
    }

    /// Append a record and sync it.
    ///
    /// On failure the file is cut back to its previous length so a later
    /// append never lands after a partial record. If that also fails the
    /// log is poisoned.
    fn append(&mut self, record: &LogRecord) -> Result<(), StorageError> {
        if self.poisoned {
            return Err(StorageError::Io(std::io::Error::other(
                "credential log is poisoned by an earlier failed write",
            )));
        }

        let bytes = record.to_bytes();
        let result = self
            .file
            .write_all(&bytes)
            .and_then(|()| self.file.sync_data());

        if let Err(e) = result {
            let rollback = self
                .file
                .set_len(self.len)
                .and_then(|()| self.file.seek(SeekFrom::Start(self.len)).map(|_| ()));
            if let Err(rollback_error) = rollback {
                tracing::error!(
                    "Failed to roll back credential log to {} bytes after write error ({e}): \
                     {rollback_error}; refusing further writes",
                    self.len
                );
                self.poisoned = true;
            }
            return Err(StorageError::Io(e));
        }

        self.len += bytes.len() as u64;
        Ok(())
    }
}

struct Shared {
    path: PathBuf,
    log: Mutex<LogFile>,
    index: RwLock<CredentialIndex>,
}

impl Shared {
    fn read<T>(
        &self,
        f: impl FnOnce(&CredentialIndex) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let index = self.index.read().map_err(|_| StorageError::LockPoisoned)?;
        f(&index)
    }

    /// Prepare, persist, then apply a record.
    ///
    /// Holding the log mutex throughout keeps the prepared record valid until
    /// it is applied, since no other writer can run in between.
    fn mutate<T>(
        &self,
        prepare: impl FnOnce(&CredentialIndex) -> Result<(T, LogRecord), StorageError>,
    ) -> Result<T, StorageError> {
        let mut log = self.log.lock().map_err(|_| StorageError::LockPoisoned)?;
        let (value, record) = self.read(prepare)?;
        log.append(&record)?;
        self.index
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .apply(record)?;
        Ok(value)
    }
}

/// A credential store persisted to a single log file.
pub struct FileStorage {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.shared.path)
            .finish_non_exhaustive()
    }
}

impl FileStorage {
    /// Open the log at `path`, creating it if it does not exist.
    ///
    /// # Errors
    /// `StorageError::Io` if the file cannot be opened or read,
    /// `StorageError::Corrupt` if its contents cannot be replayed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        if contents.len() < LOG_MAGIC.len() && LOG_MAGIC.starts_with(&contents) {
            // New file, or a crash while writing the header.
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(LOG_MAGIC)?;
            file.sync_all()?;
            contents.clear();
            contents.extend_from_slice(LOG_MAGIC);
        } else if !contents.starts_with(LOG_MAGIC) {
            return Err(StorageError::Corrupt {
                offset: 0,
                reason: "missing credential log header".to_string(),
            });
        }

        let (index, valid_len) = replay(&contents)?;
        if valid_len < contents.len() {
            tracing::warn!(
                "Truncating torn record at offset {valid_len} in {}",
                path.display()
            );
            file.set_len(valid_len as u64)?;
            file.sync_all()?;
        }
        file.seek(SeekFrom::Start(valid_len as u64))?;

        tracing::info!(
            "Opened credential log {}: {} users, {} apps",
            path.display(),
            index.user_count(),
            index.app_count()
        );

        Ok(Self {
            shared: Arc::new(Shared {
                path: path.to_path_buf(),
                log: Mutex::new(LogFile::new(file, valid_len as u64)),
                index: RwLock::new(index),
            }),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Run a mutation on the blocking pool.
    async fn mutate_blocking<T: Send + 'static>(
        &self,
        prepare: impl FnOnce(&CredentialIndex) -> Result<(T, LogRecord), StorageError>
        + Send
        + 'static,
    ) -> Result<T, StorageError> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || shared.mutate(prepare))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
    }

    /// Grant or revoke admin rights.
    pub fn set_admin(&self, user_id: UserId, is_admin: bool) -> Result<(), StorageError> {
        self.shared
            .mutate(|index| Ok(((), index.prepare_admin(user_id, is_admin)?)))
    }

    /// Grant admin rights to the user registered under `email`.
    pub fn promote_admin(&self, email: &str) -> Result<UserId, StorageError> {
        self.shared.mutate(|index| {
            let user = index.user(email)?;
            Ok((user.id, index.prepare_admin(user.id, true)?))
        })
    }

    pub fn user_by_id(&self, user_id: UserId) -> Result<User, StorageError> {
        self.shared.read(|index| index.user_by_id(user_id))
    }

    pub fn app_by_name(&self, name: &str) -> Result<Option<App>, StorageError> {
        self.shared.read(|index| Ok(index.app_by_name(name)))
    }
}

/// Replay every complete record after the header.
///
/// Returns the index and the length of the valid prefix of `contents`.
fn replay(contents: &[u8]) -> Result<(CredentialIndex, usize), StorageError> {
    let mut index = CredentialIndex::new();
    let mut offset = LOG_MAGIC.len();

    while offset < contents.len() {
        match LogRecord::from_bytes(&contents[offset..]) {
            Ok((record, consumed)) => {
                index
                    .apply(record)
                    .map_err(|e| StorageError::Corrupt {
                        offset: offset as u64,
                        reason: format!("record contradicts earlier state: {e}"),
                    })?;
                offset += consumed;
            }
            Err(LogError::Truncated) => {
                // Only the final record can be torn.
                if let Some(next) = find_complete_record(&contents[offset + 1..]) {
                    return Err(StorageError::Corrupt {
                        offset: offset as u64,
                        reason: format!(
                            "record runs past end of file but a complete record starts at offset {}",
                            offset + 1 + next
                        ),
                    });
                }
                break;
            }
            Err(e) => {
                return Err(StorageError::Corrupt {
                    offset: offset as u64,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok((index, offset))
}

impl UserSaver for FileStorage {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<UserId, StorageError> {
        let email = email.to_owned();
        let pass_hash = pass_hash.to_vec();
        self.mutate_blocking(move |index| index.prepare_user(&email, &pass_hash))
            .await
    }
}

impl UserProvider for FileStorage {
    async fn user(&self, email: &str) -> Result<User, StorageError> {
        self.shared.read(|index| index.user(email))
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        self.shared.read(|index| index.is_admin(user_id))
    }
}

impl AppProvider for FileStorage {
    async fn app(&self, app_id: AppId) -> Result<App, StorageError> {
        self.shared.read(|index| index.app(app_id))
    }

    async fn create_app(&self, name: &str, secret: &[u8]) -> Result<AppId, StorageError> {
        let name = name.to_owned();
        let secret = secret.to_vec();
        self.mutate_blocking(move |index| index.prepare_app(&name, &secret))
            .await
    }
}
