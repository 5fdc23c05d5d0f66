//! Background execution of flush tasks.
//!
//! The store never writes on the caller's thread (except `flush_sync`); it
//! hands a zero-argument task to a [`TaskScheduler`] instead.

use crate::error::{Result, StoreError};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A unit of work run off the foreground path.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks asynchronously with respect to the caller.
///
/// A scheduler may drop a task without running it (for example when its
/// runtime is shutting down). The store tolerates that: dropping a flush
/// task releases the pending-flush flag.
pub trait TaskScheduler: Send + Sync {
    /// Queue `task` for execution. Must not run it inline.
    fn spawn(&self, task: Task) -> Result<()>;
}

/// Spawns one named OS thread per task.
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    thread_name: String,
}

impl ThreadScheduler {
    pub fn new(thread_name: impl Into<String>) -> Self {
        Self {
            thread_name: thread_name.into(),
        }
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new("namecolor-flush")
    }
}

impl TaskScheduler for ThreadScheduler {
    fn spawn(&self, task: Task) -> Result<()> {
        std::thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(task)
            .map(|_| ())
            .map_err(|e| StoreError::Scheduler(format!("thread spawn failed: {e}")))
    }
}

/// Runs tasks on a Tokio runtime's blocking pool.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

#[cfg(feature = "tokio")]
impl TaskScheduler for TokioScheduler {
    fn spawn(&self, task: Task) -> Result<()> {
        // File I/O is blocking; keep it off the async worker threads.
        drop(self.handle.spawn_blocking(task));
        Ok(())
    }
}

/// Holds tasks until [`ManualScheduler::run_pending`] is called.
///
/// Gives tests (and hosts with their own tick loop) full control over when
/// background work happens.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<Task>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("queued", &self.queue.lock().len())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run every queued task, including tasks queued while draining.
    /// Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop under the lock, run outside it: a task may schedule more work.
            let next = self.queue.lock().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Drop every queued task without running it.
    pub fn discard_pending(&self) -> usize {
        let drained: Vec<Task> = self.queue.lock().drain(..).collect();
        drained.len()
    }
}

impl TaskScheduler for ManualScheduler {
    fn spawn(&self, task: Task) -> Result<()> {
        self.queue.lock().push_back(task);
        Ok(())
    }
}
