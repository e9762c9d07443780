//! Cache collaborator for rule-set snapshots.
//!
//! Implementations own their TTL: an expired entry reads as absent, and a
//! failed store is reported through the return value, never as an error.

use hashbrown::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

/// Key/value store for rule-set snapshots, keyed by their source URI.
pub trait SnapshotCache {
    /// The snapshot stored for `uri`, if present and fresh.
    fn fetch(&self, uri: &str) -> Option<String>;

    /// Stores `snapshot` under `uri`; returns whether it was persisted.
    fn store(&self, uri: &str, snapshot: &str) -> bool;
}

/// In-process cache for tests and short-lived tools.
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, String)>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl SnapshotCache for MemoryCache {
    fn fetch(&self, uri: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        let (stored_at, snapshot) = entries.get(uri)?;
        if stored_at.elapsed() < self.ttl {
            Some(snapshot.clone())
        } else {
            None
        }
    }

    fn store(&self, uri: &str, snapshot: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(uri.to_owned(), (Instant::now(), snapshot.to_owned()));
                true
            }
            Err(_) => false,
        }
    }
}

/// One snapshot file per URI under a directory; freshness is derived from
/// the file's modification time.
pub struct FsCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FsCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    fn path_for(&self, uri: &str) -> PathBuf {
        let mut name: String = uri
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        name.push_str(".json");
        self.dir.join(name)
    }
}

impl SnapshotCache for FsCache {
    fn fetch(&self, uri: &str) -> Option<String> {
        let path = self.path_for(uri);
        let modified = std::fs::metadata(&path).ok()?.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age >= self.ttl {
            debug!(?path, ?age, "cached snapshot expired");
            return None;
        }
        std::fs::read_to_string(&path).ok()
    }

    fn store(&self, uri: &str, snapshot: &str) -> bool {
        if let Err(err) = std::fs::create_dir_all(&self.dir) {
            warn!(?err, dir = ?self.dir, "could not create snapshot cache directory");
            return false;
        }
        let path = self.path_for(uri);
        match std::fs::write(&path, snapshot) {
            Ok(()) => true,
            Err(err) => {
                warn!(?err, ?path, "could not write snapshot");
                false
            }
        }
    }
}
