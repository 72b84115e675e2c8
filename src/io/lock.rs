use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a document update waits for another writer before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const LOCK_FILE: &str = ".lock";
const FIRST_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open vault lock {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("vault lock {path} still held after {waited:?}: another tm process is updating a document")]
    Timeout { path: PathBuf, waited: Duration },
}

/// Exclusive hold on a vault for one document read-modify-write.
///
/// The lock file stays on disk after release. Unlinking it would let a
/// waiter holding the old inode and a newcomer creating a fresh file both
/// believe they own the vault.
pub struct VaultLock {
    _file: File,
}

impl VaultLock {
    /// Take `<state_dir>/.lock`, creating the state directory on first use.
    /// Polls with growing back-off until `timeout` runs out.
    pub fn acquire(state_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = state_dir.join(LOCK_FILE);
        let file = open_lock_file(state_dir, &path)
            .map_err(|source| LockError::Open { path: path.clone(), source })?;

        let start = Instant::now();
        let mut backoff = FIRST_BACKOFF;
        while !try_exclusive(&file) {
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(LockError::Timeout { path, waited });
            }
            std::thread::sleep(backoff.min(timeout - waited));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
        Ok(VaultLock { _file: file })
    }
}

fn open_lock_file(state_dir: &Path, path: &Path) -> std::io::Result<File> {
    fs::create_dir_all(state_dir)?;
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
}

// flock is released when the descriptor closes with the guard
#[cfg(unix)]
fn try_exclusive(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_exclusive(_file: &File) -> bool {
    true
}
