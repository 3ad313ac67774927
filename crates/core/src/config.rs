use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the in-memory store and its snapshot persistence.
///
/// # Example
///
/// ```rust
/// use kettle_core::config::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::new()
///     .snapshot_path("/var/lib/kettle/snapshot.json")
///     .flush_debounce(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Where the snapshot document is written. `None` disables persistence
    /// entirely (useful for tests and throwaway instances).
    pub snapshot_path: Option<PathBuf>,

    /// Quiet period after the last mutation before the snapshot is flushed.
    /// A burst of writes inside the window coalesces into a single flush;
    /// each new write resets the timer.
    pub flush_debounce: Duration,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory only, no snapshot file.
    pub fn ephemeral() -> Self {
        Self {
            snapshot_path: None,
            ..Self::default()
        }
    }

    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn flush_debounce(mut self, debounce: Duration) -> Self {
        self.flush_debounce = debounce;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            flush_debounce: Duration::from_millis(500),
        }
    }
}
