//! Command-log persistence.
//!
//! # Responsibility
//! - Render a record list as replayable `add` command lines.
//! - Read and write those lines through a `LogStore` backend.
//!
//! # Invariants
//! - The command log is the only durable representation of a list.
//! - Saves rewrite the whole log; nothing is appended.
//! - An empty list is never written; the previous log stays untouched.
//!
//! # See also
//! - `command::replay` for the load side.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod command_log;
pub mod log_store;

pub use command_log::{render_log, save_records, LogLines, SaveOutcome};
pub use log_store::{FileLogStore, LogStore, MemoryLogStore, StoredLog, LIST_FILE_NAME};

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend failure.
#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "storage_io",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "storage error at `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}
