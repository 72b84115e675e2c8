use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::io::lock::{DEFAULT_LOCK_TIMEOUT, VaultLock};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::store::{DocumentStore, StoreError};

/// Name of the per-vault state directory (config, lock, recovery log)
pub const STATE_DIR: &str = ".tickmark";

/// Documents stored as files under a vault root directory.
#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        VaultStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Map a vault-relative path to a file path, refusing anything that
    /// could escape the vault.
    fn full_path(&self, path: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(path);
        let inside = !path.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(rel))
    }

    fn write(&self, path: &str, full: &Path, content: &str) -> Result<(), StoreError> {
        if let Err(e) = recovery::atomic_write(full, content.as_bytes()) {
            recovery::log_recovery(
                &self.state_dir(),
                RecoveryEntry::new(RecoveryCategory::Write, "document write failed")
                    .field("Target", path)
                    .field("Error", e.to_string())
                    .body(content),
            );
            return Err(StoreError::Write {
                path: full.to_path_buf(),
                source: e,
            });
        }
        Ok(())
    }
}

impl DocumentStore for VaultStore {
    fn exists(&self, path: &str) -> bool {
        self.full_path(path).is_ok_and(|p| p.is_file())
    }

    fn read(&self, path: &str) -> Result<String, StoreError> {
        let full = self.full_path(path)?;
        if !full.is_file() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        fs::read_to_string(&full).map_err(|e| StoreError::Read {
            path: full,
            source: e,
        })
    }

    fn create(&self, path: &str, initial: &str) -> Result<(), StoreError> {
        let full = self.full_path(path)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_string()),
                _ => StoreError::Write {
                    path: full.clone(),
                    source: e,
                },
            })?;
        file.write_all(initial.as_bytes())
            .map_err(|e| StoreError::Write {
                path: full.clone(),
                source: e,
            })
    }

    fn process<F, E>(&self, path: &str, f: F) -> Result<(), E>
    where
        F: FnOnce(&str) -> Result<String, E>,
        E: From<StoreError>,
    {
        let full = self.full_path(path)?;
        let _lock = VaultLock::acquire(&self.state_dir(), DEFAULT_LOCK_TIMEOUT)
            .map_err(StoreError::from)?;
        let current = self.read(path)?;
        let updated = f(&current)?;
        if updated != current {
            self.write(path, &full, &updated)?;
        }
        Ok(())
    }
}
