//! Credential log record format.
//!
//! The file store is a magic header followed by a sequence of records. Each
//! record has the following layout:
//! ```text
//! +----------+--------------------------------------------------+
//! | 0-3      | record_length (4 bytes, includes header+checksum)|
//! | 4        | record_type (1 byte)                             |
//! | 5-N      | payload (variable, depends on type)              |
//! | N-N+3    | CRC32 checksum (4 bytes)                         |
//! +----------+--------------------------------------------------+
//! ```
//!
//! Payload integers are little-endian. Strings and byte strings are
//! prefixed with their length as a `u32`.

// record_length fits in u32, field lengths are bounded by it
#![allow(clippy::cast_possible_truncation)]

use std::fmt;

use crate::types::{AppId, UserId};

/// Magic bytes at the start of every credential log file.
pub const LOG_MAGIC: &[u8; 8] = b"AUTHLOG1";

/// `record_length` (4) + `record_type` (1).
const RECORD_HEADER_SIZE: usize = 5;

/// CRC32 checksum size at end of record.
const CHECKSUM_SIZE: usize = 4;

/// Log record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum LogRecordType {
    UserCreated = 0x01,
    AppCreated = 0x02,
    AdminSet = 0x03,
}

impl TryFrom<u8> for LogRecordType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::UserCreated),
            0x02 => Ok(Self::AppCreated),
            0x03 => Ok(Self::AdminSet),
            _ => Err(value),
        }
    }
}

/// Errors from decoding a log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// The buffer ends before the record does. At the tail of a file this
    /// is a torn write.
    Truncated,
    /// Stored checksum does not match the record contents.
    ChecksumMismatch { expected: u32, actual: u32 },
    /// Unknown record type byte.
    InvalidRecordType(u8),
    /// The record framing or payload is inconsistent.
    Malformed(&'static str),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "record truncated"),
            Self::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch (expected {expected:#010x}, got {actual:#010x})")
            }
            Self::InvalidRecordType(t) => write!(f, "invalid record type {t:#04x}"),
            Self::Malformed(reason) => write!(f, "malformed record: {reason}"),
        }
    }
}

impl std::error::Error for LogError {}

/// One durable mutation of the credential store.
#[derive(Clone, PartialEq, Eq)]
pub enum LogRecord {
    UserCreated {
        id: UserId,
        email: String,
        pass_hash: Vec<u8>,
    },
    AppCreated {
        id: AppId,
        name: String,
        secret: Vec<u8>,
    },
    AdminSet {
        user_id: UserId,
        is_admin: bool,
    },
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserCreated { id, email, .. } => f
                .debug_struct("UserCreated")
                .field("id", id)
                .field("email", email)
                .finish_non_exhaustive(),
            Self::AppCreated { id, name, .. } => f
                .debug_struct("AppCreated")
                .field("id", id)
                .field("name", name)
                .finish_non_exhaustive(),
            Self::AdminSet { user_id, is_admin } => f
                .debug_struct("AdminSet")
                .field("user_id", user_id)
                .field("is_admin", is_admin)
                .finish(),
        }
    }
}

impl LogRecord {
    const fn record_type(&self) -> LogRecordType {
        match self {
            Self::UserCreated { .. } => LogRecordType::UserCreated,
            Self::AppCreated { .. } => LogRecordType::AppCreated,
            Self::AdminSet { .. } => LogRecordType::AdminSet,
        }
    }

    fn payload_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            Self::UserCreated {
                id,
                email,
                pass_hash,
            } => {
                bytes.extend_from_slice(&id.get().to_le_bytes());
                put_bytes(&mut bytes, email.as_bytes());
                put_bytes(&mut bytes, pass_hash);
            }
            Self::AppCreated { id, name, secret } => {
                bytes.extend_from_slice(&id.get().to_le_bytes());
                put_bytes(&mut bytes, name.as_bytes());
                put_bytes(&mut bytes, secret);
            }
            Self::AdminSet { user_id, is_admin } => {
                bytes.extend_from_slice(&user_id.get().to_le_bytes());
                bytes.push(u8::from(*is_admin));
            }
        }
        bytes
    }

    /// Serialize this record to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload = self.payload_bytes();
        let total_len = RECORD_HEADER_SIZE + payload.len() + CHECKSUM_SIZE;

        let mut bytes = Vec::with_capacity(total_len);
        bytes.extend_from_slice(&(total_len as u32).to_le_bytes());
        bytes.push(self.record_type() as u8);
        bytes.extend_from_slice(&payload);

        // CRC32 checksum (4 bytes) - computed over everything before it
        let checksum = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());

        bytes
    }

    /// Deserialize a record from the front of `bytes`.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), LogError> {
        if bytes.len() < RECORD_HEADER_SIZE {
            return Err(LogError::Truncated);
        }

        let record_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        if record_len < RECORD_HEADER_SIZE + CHECKSUM_SIZE {
            return Err(LogError::Malformed("record length smaller than header"));
        }
        if record_len > bytes.len() {
            return Err(LogError::Truncated);
        }

        let stored_checksum = u32::from_le_bytes([
            bytes[record_len - 4],
            bytes[record_len - 3],
            bytes[record_len - 2],
            bytes[record_len - 1],
        ]);
        let computed_checksum = crc32fast::hash(&bytes[..record_len - CHECKSUM_SIZE]);
        if stored_checksum != computed_checksum {
            return Err(LogError::ChecksumMismatch {
                expected: stored_checksum,
                actual: computed_checksum,
            });
        }

        let record_type = LogRecordType::try_from(bytes[4]).map_err(LogError::InvalidRecordType)?;
        let mut payload = PayloadReader::new(&bytes[RECORD_HEADER_SIZE..record_len - CHECKSUM_SIZE]);

        let record = match record_type {
            LogRecordType::UserCreated => Self::UserCreated {
                id: UserId(payload.read_i64()?),
                email: payload.read_string()?,
                pass_hash: payload.read_bytes()?.to_vec(),
            },
            LogRecordType::AppCreated => Self::AppCreated {
                id: AppId(payload.read_i64()?),
                name: payload.read_string()?,
                secret: payload.read_bytes()?.to_vec(),
            },
            LogRecordType::AdminSet => Self::AdminSet {
                user_id: UserId(payload.read_i64()?),
                is_admin: payload.read_u8()? != 0,
            },
        };
        payload.finish()?;

        Ok((record, record_len))
    }
}

/// Offset of the first complete, checksum-valid record anywhere in `bytes`.
///
/// A torn append leaves a prefix of a single record, so a complete record
/// after a truncated one means the truncation is corruption, not a crash.
#[must_use]
pub fn find_complete_record(bytes: &[u8]) -> Option<usize> {
    (0..bytes.len()).find(|&start| LogRecord::from_bytes(&bytes[start..]).is_ok())
}

fn put_bytes(out: &mut Vec<u8>, value: &[u8]) {
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value);
}

/// Cursor over a checksummed payload. Any overrun is a malformed record,
/// never a torn write, since the checksum already matched.
struct PayloadReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> PayloadReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], LogError> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(LogError::Malformed("payload shorter than declared"))?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, LogError> {
        Ok(self.take(1)?[0])
    }

    fn read_i64(&mut self) -> Result<i64, LogError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(buf))
    }

    fn read_bytes(&mut self) -> Result<&'a [u8], LogError> {
        let mut len = [0u8; 4];
        len.copy_from_slice(self.take(4)?);
        self.take(u32::from_le_bytes(len) as usize)
    }

    fn read_string(&mut self) -> Result<String, LogError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| LogError::Malformed("string is not UTF-8"))
    }

    const fn finish(&self) -> Result<(), LogError> {
        if self.position == self.bytes.len() {
            Ok(())
        } else {
            Err(LogError::Malformed("trailing bytes in payload"))
        }
    }
}
