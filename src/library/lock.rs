//! Per-file edit locks.
//!
//! Read-modify-write cycles on the same icon are serialized within this
//! process. Locks are keyed by the canonical path when the file exists, so
//! `a/../a/x.svg` and `a/x.svg` share one lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

#[derive(Debug, Default)]
pub struct FileLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

/// Held while a file is being edited.
///
/// Dropping the last guard for a path removes its entry from the table.
pub struct EditGuard<'a> {
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
    key: PathBuf,
    locks: &'a FileLocks,
}

impl FileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `path` is free, then hold it until the guard drops.
    pub fn lock(&self, path: &Path) -> EditGuard<'_> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        // Clone out of the map so the shard is not held while blocking.
        let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());
        EditGuard {
            guard: Some(lock.lock_arc()),
            key,
            locks: self,
        }
    }

    /// Number of paths currently locked or waited on.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for EditGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the table holds the mutex now: nobody is waiting on it.
        self.locks
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_same_path_is_exclusive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.svg");
        std::fs::write(&path, "").unwrap();

        let locks = Arc::new(FileLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (locks, inside, max_inside, path) = (
                    Arc::clone(&locks),
                    Arc::clone(&inside),
                    Arc::clone(&max_inside),
                    path.clone(),
                );
                thread::spawn(move || {
                    let _guard = locks.lock(&path);
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_equivalent_paths_share_key_and_release() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("a/x.svg"), "").unwrap();

        let canonical = dir.path().join("a/x.svg").canonicalize().unwrap();

        let locks = FileLocks::new();
        let guard = locks.lock(&dir.path().join("a/../a/x.svg"));
        assert!(locks.locks.contains_key(&canonical));
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert_eq!(locks.len(), 0);
    }
}
