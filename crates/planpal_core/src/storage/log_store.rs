//! Log store backends.
//!
//! # Invariants
//! - File layout is `<root>/<kind dir>/list.txt`, one command per line.
//! - Missing root or kind directories mean "no prior data", not an error.
//! - Every file handle is opened and closed within one call.

use crate::model::entity::EntityKind;
use crate::storage::command_log::LogLines;
use crate::storage::{StorageError, StorageResult};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the per-kind command log.
pub const LIST_FILE_NAME: &str = "list.txt";

/// One stored log in replay order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLog {
    pub kind: EntityKind,
    /// File name (or backend label) for user-facing load notices.
    pub source: String,
    pub log: LogLines,
    /// Line numbers, counted like replay line numbers, that could not be
    /// decoded and are missing from `log`.
    pub undecodable: Vec<usize>,
}

/// Durable backend for command logs.
pub trait LogStore {
    /// Replaces the whole log of `kind` with `log`.
    fn save_list(&mut self, kind: EntityKind, log: &LogLines) -> StorageResult<()>;
    /// Returns every stored log, kind by kind in `EntityKind::ALL` order.
    fn load_lists(&self) -> StorageResult<Vec<StoredLog>>;
}

/// Directory-tree backend.
#[derive(Debug, Clone)]
pub struct FileLogStore {
    root: PathBuf,
}

impl FileLogStore {
    /// Uses `root` as storage directory. Nothing is created until first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the command log for `kind`.
    pub fn list_path(&self, kind: EntityKind) -> PathBuf {
        self.root.join(kind.storage_dir()).join(LIST_FILE_NAME)
    }
}

impl LogStore for FileLogStore {
    fn save_list(&mut self, kind: EntityKind, log: &LogLines) -> StorageResult<()> {
        let dir = self.root.join(kind.storage_dir());
        fs::create_dir_all(&dir).map_err(|err| StorageError::io(&dir, err))?;

        // Truncating rewrite; a crash mid-write can leave a short log.
        let path = dir.join(LIST_FILE_NAME);
        let mut file = fs::File::create(&path).map_err(|err| StorageError::io(&path, err))?;
        file.write_all(log.to_text().as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| StorageError::io(&path, err))?;
        debug!(
            "event=log_write module=storage status=ok kind={} lines={}",
            kind,
            log.len()
        );
        Ok(())
    }

    fn load_lists(&self) -> StorageResult<Vec<StoredLog>> {
        if !self.root.is_dir() {
            debug!("event=log_load module=storage status=skip reason=no_storage_root");
            return Ok(Vec::new());
        }

        let mut stored = Vec::new();
        for kind in EntityKind::ALL {
            let dir = self.root.join(kind.storage_dir());
            if !dir.is_dir() {
                continue;
            }

            let mut files = Vec::new();
            for entry in fs::read_dir(&dir).map_err(|err| StorageError::io(&dir, err))? {
                let entry = entry.map_err(|err| StorageError::io(&dir, err))?;
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                }
            }
            files.sort();

            for path in files {
                let bytes = match fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warn!(
                            "event=log_load module=storage status=error kind={} error_code=storage_io error={}",
                            kind, err
                        );
                        continue;
                    }
                };
                let source = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let (log, undecodable) = LogLines::decode(&bytes);
                if !undecodable.is_empty() {
                    warn!(
                        "event=log_load module=storage status=partial kind={} undecodable_lines={}",
                        kind,
                        undecodable.len()
                    );
                }
                stored.push(StoredLog {
                    kind,
                    source,
                    log,
                    undecodable,
                });
            }
        }
        Ok(stored)
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogStore {
    logs: HashMap<EntityKind, LogLines>,
    writes: usize,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a stored log, as if written by an earlier session.
    pub fn with_log(mut self, kind: EntityKind, log: LogLines) -> Self {
        self.logs.insert(kind, log);
        self
    }

    pub fn get(&self, kind: EntityKind) -> Option<&LogLines> {
        self.logs.get(&kind)
    }

    /// Number of successful `save_list` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl LogStore for MemoryLogStore {
    fn save_list(&mut self, kind: EntityKind, log: &LogLines) -> StorageResult<()> {
        self.logs.insert(kind, log.clone());
        self.writes += 1;
        Ok(())
    }

    fn load_lists(&self) -> StorageResult<Vec<StoredLog>> {
        Ok(EntityKind::ALL
            .iter()
            .filter_map(|kind| {
                self.logs.get(kind).map(|log| StoredLog {
                    kind: *kind,
                    source: LIST_FILE_NAME.to_string(),
                    log: log.clone(),
                    undecodable: Vec::new(),
                })
            })
            .collect())
    }
}
