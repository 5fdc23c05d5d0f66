//! Player-preference store for namecolor.
//!
//! This crate provides the persistence core behind the `/namecolor` command:
//!
//! - An in-memory cache of player → color name, the only thing reads touch
//! - A YAML document (`playerdata.yml`) mirrored from the cache
//! - Debounced background flushes through a pluggable task scheduler
//! - A bounded, blocking flush for clean shutdown
//!
//! The store does not know what a color is, who may use it, or who is online.

pub mod document;
pub mod error;
pub mod file;
pub mod scheduler;
pub mod store;
mod user_id;

pub use document::{DocumentFormat, PlayerDocument, YamlFormat};
pub use error::{Result, StoreError};
pub use file::{DataFile, FsDataFile, MemoryDataFile};
#[cfg(feature = "tokio")]
pub use scheduler::TokioScheduler;
pub use scheduler::{ManualScheduler, Task, TaskScheduler, ThreadScheduler};
pub use store::{DEFAULT_FLUSH_WAIT_TIMEOUT, PreferenceStore, StoreBuilder};
pub use user_id::UserId;

/// Default file name of the player data file inside the data folder.
pub const DATA_FILE_NAME: &str = "playerdata.yml";
