// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cursor persistence.
//
// The cursor file holds one decimal integer and nothing else.  Saves go
// through a temporary file in the same directory that is fsynced and then
// renamed over the target, so a crash leaves either the old or the new value
// on disk, never a torn one.  A single process owns the file; concurrent
// pollers on the same state file are not supported.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use orderwerk_core::error::{OrderwerkError, Result};

/// Durable record of the last printed order id.
pub trait CursorStore: Send + Sync {
    /// Last persisted cursor.  Falls back to 0 (so the next candidate is 1)
    /// when nothing usable is stored.  Never fails.
    fn load(&self) -> u64;

    /// Replace the stored cursor.
    fn save(&self, cursor: u64) -> Result<()>;
}

/// Cursor kept in a plain text file.
#[derive(Debug, Clone)]
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> u64 {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no cursor file; starting from order 1");
                return 0;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cursor file unreadable; starting from order 1");
                return 0;
            }
        };

        match parse_cursor(&text) {
            Some(cursor) => {
                debug!(path = %self.path.display(), cursor, "cursor loaded");
                cursor
            }
            None => {
                warn!(
                    path = %self.path.display(),
                    content = %text.chars().take(32).collect::<String>(),
                    "cursor file corrupt; starting from order 1"
                );
                0
            }
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn save(&self, cursor: u64) -> Result<()> {
        let dir = self.dir();
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        write!(tmp, "{cursor}")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| OrderwerkError::Cursor(format!("rename into {}: {}", self.path.display(), e.error)))?;

        // Make the rename itself durable (best effort).
        #[cfg(unix)]
        if let Ok(handle) = std::fs::File::open(dir) {
            let _ = handle.sync_all();
        }

        debug!(cursor, "cursor saved");
        Ok(())
    }
}

/// Parse the cursor file contents.  Surrounding whitespace is tolerated;
/// anything else that is not a non-negative integer is rejected.
pub fn parse_cursor(text: &str) -> Option<u64> {
    text.trim().parse().ok()
}

/// Cursor held in memory only.  Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    cursor: Mutex<u64>,
}

impl MemoryCursorStore {
    pub fn new(cursor: u64) -> Self {
        Self {
            cursor: Mutex::new(cursor),
        }
    }

    pub fn current(&self) -> u64 {
        self.load()
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> u64 {
        self.cursor.lock().map(|c| *c).unwrap_or(0)
    }

    fn save(&self, cursor: u64) -> Result<()> {
        let mut guard = self
            .cursor
            .lock()
            .map_err(|_| OrderwerkError::Cursor("cursor lock poisoned".into()))?;
        *guard = cursor;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> FileCursorStore {
        FileCursorStore::new(dir.join("last_order.txt"))
    }

    #[test]
    fn missing_file_starts_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(dir.path()).load(), 0);
    }

    #[test]
    fn saved_value_is_bare_decimal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(6).unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "6");
        assert_eq!(store.load(), 6);
    }

    #[test]
    fn save_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(9).unwrap();
        store.save(10).unwrap();

        assert_eq!(store.load(), 10);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "only the cursor file should remain");
    }

    #[test]
    fn corrupt_contents_fall_back_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        for bad in ["", "abc", "-3", "4 5", "7\0"] {
            std::fs::write(store.path(), bad).unwrap();
            assert_eq!(store.load(), 0, "content {bad:?} must be rejected");
        }
    }

    #[test]
    fn whitespace_around_value_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.path(), "  41\n").unwrap();
        assert_eq!(store.load(), 41);
    }

    #[test]
    fn unpersisted_temp_write_does_not_replace_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(12).unwrap();

        // A save interrupted before the rename leaves only a stray temp file.
        let mut partial = NamedTempFile::new_in(dir.path()).unwrap();
        write!(partial, "1").unwrap();

        assert_eq!(store.load(), 12);
    }

    #[test]
    fn save_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCursorStore::new(dir.path().join("state").join("last_order.txt"));
        store.save(3).unwrap();
        assert_eq!(store.load(), 3);
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryCursorStore::new(4);
        assert_eq!(store.load(), 4);
        store.save(5).unwrap();
        assert_eq!(store.current(), 5);
    }
}
