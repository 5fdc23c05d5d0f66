//! The player-preference store.
//!
//! Reads are served from an in-memory cache. Mutations update the cache and
//! the in-memory document together, then schedule a debounced background
//! flush. `flush_sync` is the blocking path used at shutdown.
//!
//! Locking:
//! - `document` is the single critical section. Every mutation of the
//!   document and the cache, every serialization, every file write, and the
//!   pending→idle transition of the flush flag happen while it is held.
//! - `cache` is a read-write lock taken for writing only while `document` is
//!   held, so `get`/`has` never wait on disk I/O.
//! - `flush.pending` is taken last (document → pending), never the other way.

use crate::document::{DocumentFormat, PlayerDocument, YamlFormat};
use crate::error::{Result, StoreError};
use crate::file::DataFile;
use crate::scheduler::TaskScheduler;
use crate::user_id::UserId;
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default ceiling on how long `flush_sync` waits for a background flush.
pub const DEFAULT_FLUSH_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Cached, file-backed mapping from player to color name.
///
/// Cloning is cheap and yields another handle to the same store.
#[derive(Clone)]
pub struct PreferenceStore {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("location", &self.shared.file.location())
            .field("entries", &self.len())
            .field("flush_pending", &self.is_flush_pending())
            .finish_non_exhaustive()
    }
}

struct Shared {
    file: Arc<dyn DataFile>,
    format: Box<dyn DocumentFormat>,
    scheduler: Arc<dyn TaskScheduler>,
    flush_wait_timeout: Duration,
    document: Mutex<PlayerDocument>,
    cache: RwLock<HashMap<UserId, String>>,
    flush: FlushFlag,
}

/// Single-slot flush intent plus its completion signal.
#[derive(Default)]
struct FlushFlag {
    pending: Mutex<bool>,
    idle: Condvar,
}

impl FlushFlag {
    /// Claim the slot. Returns `false` if a flush is already pending.
    fn try_claim(&self) -> bool {
        let mut pending = self.pending.lock();
        if *pending {
            return false;
        }
        *pending = true;
        true
    }

    fn release(&self) {
        *self.pending.lock() = false;
        self.idle.notify_all();
    }

    fn is_pending(&self) -> bool {
        *self.pending.lock()
    }

    /// Block until no flush is pending or `timeout` elapses.
    /// Returns `true` if a flush is still pending.
    fn wait_idle(&self, timeout: Duration) -> bool {
        let mut pending = self.pending.lock();
        if *pending {
            let _ = self
                .idle
                .wait_while_for(&mut pending, |pending| *pending, timeout);
        }
        *pending
    }
}

/// Owns the claimed flush slot. Dropping it releases the slot, whether the
/// task ran to completion, failed, panicked, or was never run at all.
struct PendingFlush {
    shared: Arc<Shared>,
}

impl PendingFlush {
    fn run(self) {
        let shared = Arc::clone(&self.shared);
        let document = shared.document.lock();
        // Render right before writing so every change made while this task
        // was queued is captured.
        match shared.write_locked(&document) {
            Ok(()) => log::debug!(
                "Saved player data to {}",
                shared.file.location().display()
            ),
            Err(e) => shared.log_write_failure(&e),
        }
        // Release the slot inside the critical section.
        drop(self);
        drop(document);
    }
}

impl Drop for PendingFlush {
    fn drop(&mut self) {
        self.shared.flush.release();
    }
}

impl Shared {
    /// Serialize `document` and overwrite the file. Caller holds `document`.
    fn write_locked(&self, document: &PlayerDocument) -> Result<()> {
        let contents = document.render(self.format.as_ref())?;
        if contents.trim().is_empty() {
            return Err(StoreError::EmptyContent {
                path: self.file.location(),
            });
        }
        self.file.write_all(&contents)
    }

    fn log_write_failure(&self, error: &StoreError) {
        match error {
            StoreError::EmptyContent { .. } => log::error!(
                "Attempted to save empty player data - aborting to prevent data loss ({error})"
            ),
            _ => log::error!(
                "Could not save player data to {}: {error}",
                self.file.location().display()
            ),
        }
    }

    fn read_document(&self) -> Result<PlayerDocument> {
        let contents = self.file.read_to_string()?;
        PlayerDocument::parse(&contents, self.format.as_ref())
    }

    /// Replace document and cache. Caller holds `document`.
    fn install_locked(&self, slot: &mut PlayerDocument, document: PlayerDocument) -> usize {
        let colors = document.colors();
        let count = colors.len();
        *slot = document;
        *self.cache.write() = colors;
        log::info!("Loaded {count} player colors into cache");
        count
    }
}

/// Configures and opens a [`PreferenceStore`].
pub struct StoreBuilder {
    file: Arc<dyn DataFile>,
    scheduler: Arc<dyn TaskScheduler>,
    format: Box<dyn DocumentFormat>,
    flush_wait_timeout: Duration,
}

impl StoreBuilder {
    /// Replace the YAML encoding of the data file.
    pub fn format(mut self, format: impl DocumentFormat + 'static) -> Self {
        self.format = Box::new(format);
        self
    }

    /// How long `flush_sync` waits for a pending background flush.
    pub fn flush_wait_timeout(mut self, timeout: Duration) -> Self {
        self.flush_wait_timeout = timeout;
        self
    }

    /// Create the data file if needed, load it, and populate the cache.
    ///
    /// Never fails: a file that cannot be created or parsed is logged and
    /// the store starts empty.
    pub fn open(self) -> PreferenceStore {
        let shared = Arc::new(Shared {
            file: self.file,
            format: self.format,
            scheduler: self.scheduler,
            flush_wait_timeout: self.flush_wait_timeout,
            document: Mutex::new(PlayerDocument::new()),
            cache: RwLock::new(HashMap::new()),
            flush: FlushFlag::default(),
        });

        let location = shared.file.location();
        let loaded = match shared.file.ensure_exists() {
            Ok(()) => shared.read_document().unwrap_or_else(|e| {
                log::error!(
                    "Could not load player data from {}: {e}",
                    location.display()
                );
                PlayerDocument::new()
            }),
            Err(e) => {
                log::error!(
                    "Could not create player data file {}: {e}",
                    location.display()
                );
                PlayerDocument::new()
            }
        };

        {
            let mut document = shared.document.lock();
            shared.install_locked(&mut document, loaded);
        }

        PreferenceStore { shared }
    }
}

impl PreferenceStore {
    /// Start configuring a store over `file`, flushing on `scheduler`.
    pub fn builder(file: Arc<dyn DataFile>, scheduler: Arc<dyn TaskScheduler>) -> StoreBuilder {
        StoreBuilder {
            file,
            scheduler,
            format: Box::new(YamlFormat),
            flush_wait_timeout: DEFAULT_FLUSH_WAIT_TIMEOUT,
        }
    }

    /// Open a store with default settings. See [`StoreBuilder::open`].
    pub fn open(file: Arc<dyn DataFile>, scheduler: Arc<dyn TaskScheduler>) -> Self {
        Self::builder(file, scheduler).open()
    }

    /// The saved color for `user`, if any. Cache only, never touches disk.
    pub fn get(&self, user: &UserId) -> Option<String> {
        self.shared.cache.read().get(user).cloned()
    }

    /// Whether `user` has a saved color.
    pub fn has(&self, user: &UserId) -> bool {
        self.shared.cache.read().contains_key(user)
    }

    /// Number of players with a saved color.
    pub fn len(&self) -> usize {
        self.shared.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All saved preferences, ordered by player id.
    pub fn entries(&self) -> Vec<(UserId, String)> {
        let mut entries: Vec<(UserId, String)> = self
            .shared
            .cache
            .read()
            .iter()
            .map(|(id, color)| (*id, color.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Save `color` for `user` and schedule a background flush.
    pub fn set(&self, user: UserId, color: impl Into<String>) {
        let color = color.into();
        {
            let mut document = self.shared.document.lock();
            document.set_color(&user, &color);
            self.shared.cache.write().insert(user, color);
        }
        self.schedule_flush();
    }

    /// Forget `user`'s color and schedule a background flush.
    pub fn remove(&self, user: &UserId) {
        {
            let mut document = self.shared.document.lock();
            document.remove_player(user);
            self.shared.cache.write().remove(user);
        }
        self.schedule_flush();
    }

    /// Whether a background flush is queued or running.
    pub fn is_flush_pending(&self) -> bool {
        self.shared.flush.is_pending()
    }

    /// Queue one background flush unless one is already pending.
    fn schedule_flush(&self) {
        if !self.shared.flush.try_claim() {
            log::trace!("Player data flush already pending; coalescing");
            return;
        }

        let pending = PendingFlush {
            shared: Arc::clone(&self.shared),
        };
        // On failure the task (and with it the claimed slot) is dropped.
        if let Err(e) = self.shared.scheduler.spawn(Box::new(move || pending.run())) {
            log::error!("Could not schedule player data save: {e}");
        }
    }

    /// Write the current state to disk on the calling thread.
    ///
    /// Waits (bounded) for a pending background flush first, then writes
    /// regardless of whether it finished. Failures are logged and returned.
    pub fn flush_sync(&self) -> Result<()> {
        if self.shared.flush.wait_idle(self.shared.flush_wait_timeout) {
            log::warn!("Background player data save still pending during shutdown - forcing synchronous save");
        }

        let document = self.shared.document.lock();
        let result = self.shared.write_locked(&document);
        if let Err(e) = &result {
            self.shared.log_write_failure(e);
        }
        result
    }

    /// Re-read the data file and rebuild the cache from it.
    ///
    /// Unflushed in-memory changes are discarded. If the file cannot be read
    /// or parsed, the current state is kept and the error is returned.
    /// Returns the number of entries loaded.
    pub fn reload_from_disk(&self) -> Result<usize> {
        let mut document = self.shared.document.lock();
        match self.shared.read_document() {
            Ok(loaded) => Ok(self.shared.install_locked(&mut document, loaded)),
            Err(e) => {
                log::error!(
                    "Could not reload player data from {}: {e}",
                    self.shared.file.location().display()
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::MemoryDataFile;
    use crate::scheduler::ManualScheduler;

    fn id(n: u128) -> UserId {
        UserId::from_uuid(uuid::Uuid::from_u128(n))
    }

    fn open_manual() -> (PreferenceStore, Arc<MemoryDataFile>, Arc<ManualScheduler>) {
        let file = Arc::new(MemoryDataFile::new());
        let scheduler = Arc::new(ManualScheduler::new());
        let store = PreferenceStore::builder(file.clone(), scheduler.clone())
            .flush_wait_timeout(Duration::from_millis(50))
            .open();
        (store, file, scheduler)
    }

    #[test]
    fn test_open_creates_missing_file() {
        let (store, file, _) = open_manual();
        assert!(store.is_empty());
        assert_eq!(file.contents().as_deref(), Some(""));
        assert_eq!(file.write_count(), 0);
    }

    #[test]
    fn test_set_does_not_write_until_task_runs() {
        let (store, file, scheduler) = open_manual();
        store.set(id(1), "red");

        assert_eq!(store.get(&id(1)).as_deref(), Some("red"));
        assert!(store.is_flush_pending());
        assert_eq!(file.write_count(), 0);

        assert_eq!(scheduler.run_pending(), 1);
        assert!(!store.is_flush_pending());
        assert_eq!(file.write_count(), 1);
        assert!(file.contents().unwrap().contains("color: red"));
    }

    #[test]
    fn test_pending_flag_coalesces_mutations() {
        let (store, _, scheduler) = open_manual();
        store.set(id(1), "red");
        store.set(id(2), "blue");
        store.remove(&id(1));
        assert_eq!(scheduler.queued(), 1);
    }

    #[test]
    fn test_failed_write_releases_flag_and_keeps_cache() {
        let (store, file, scheduler) = open_manual();
        file.set_fail_writes(true);
        store.set(id(1), "gold");
        scheduler.run_pending();

        assert!(!store.is_flush_pending());
        assert_eq!(store.get(&id(1)).as_deref(), Some("gold"));

        // Next mutation schedules a fresh attempt.
        file.set_fail_writes(false);
        store.set(id(2), "aqua");
        assert_eq!(scheduler.run_pending(), 1);
        let contents = file.contents().unwrap();
        assert!(contents.contains("gold") && contents.contains("aqua"));
    }

    #[test]
    fn test_dropped_task_releases_flag() {
        let (store, _, scheduler) = open_manual();
        store.set(id(1), "red");
        assert_eq!(scheduler.discard_pending(), 1);
        assert!(!store.is_flush_pending());

        store.set(id(1), "blue");
        assert_eq!(scheduler.queued(), 1);
    }

    #[test]
    fn test_flush_sync_times_out_and_still_writes() {
        let (store, file, scheduler) = open_manual();
        store.set(id(7), "green");

        // Nothing drains the scheduler, so the wait must give up.
        store.flush_sync().unwrap();
        assert_eq!(file.write_count(), 1);
        assert!(file.contents().unwrap().contains("green"));

        // The queued task still runs later and rewrites the same content.
        scheduler.run_pending();
        assert_eq!(file.write_count(), 2);
        assert!(!store.is_flush_pending());
    }

    #[test]
    fn test_reload_failure_keeps_current_state() {
        let file = Arc::new(MemoryDataFile::with_contents("players: {}\n"));
        let scheduler = Arc::new(ManualScheduler::new());
        let store = PreferenceStore::open(file.clone(), scheduler.clone());
        store.set(id(3), "yellow");
        scheduler.run_pending();

        file.write_all("players: [unclosed\n").unwrap();
        assert!(store.reload_from_disk().is_err());
        assert_eq!(store.get(&id(3)).as_deref(), Some("yellow"));
    }
}
