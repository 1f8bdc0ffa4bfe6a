//! Progress reporting and user cancellation
//!
//! Long operations (connection, multi-collection loads, large identifier
//! scans) report through a `ProgressIndicator` and check `is_canceled`
//! between steps. Cancellation unwinds as `FlintError::Canceled`.

use crate::{FlintError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Progress and cancellation collaborator, driven by the UI
pub trait ProgressIndicator: Send + Sync {
    /// Start (or restart) a determinate progress phase
    fn init_progress(&self, message: &str, total_steps: usize, current_step: usize, step_size: usize);

    /// Start an indeterminate progress phase (unknown duration)
    fn init_indeterminate(&self, message: &str);

    /// Advance by one step
    fn step_progress(&self);

    /// Check whether the user requested cancellation
    fn is_canceled(&self) -> bool;

    /// Mark the operation finished
    fn set_complete(&self);
}

/// Return `FlintError::Canceled` when the indicator has been canceled
pub fn check_canceled(progress: &dyn ProgressIndicator) -> Result<()> {
    if progress.is_canceled() {
        Err(FlintError::Canceled)
    } else {
        Ok(())
    }
}

/// No-op indicator for callers without a progress UI
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressIndicator for NullProgress {
    fn init_progress(&self, _message: &str, _total: usize, _current: usize, _step_size: usize) {}

    fn init_indeterminate(&self, _message: &str) {}

    fn step_progress(&self) {}

    fn is_canceled(&self) -> bool {
        false
    }

    fn set_complete(&self) {}
}

/// Counting indicator with a one-shot cancel trigger.
///
/// Cancels after `cancel_after_steps` calls to `step_progress` when set;
/// also cancelable directly via `cancel()`.
#[derive(Debug, Default)]
pub struct CountingProgress {
    steps: AtomicUsize,
    inits: AtomicUsize,
    canceled: AtomicBool,
    cancel_after_steps: AtomicUsize,
}

impl CountingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation once the given number of steps has elapsed
    pub fn cancel_after(steps: usize) -> Self {
        let p = Self::new();
        p.cancel_after_steps.store(steps, Ordering::Relaxed);
        p
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Relaxed);
    }

    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::Relaxed)
    }
}

impl ProgressIndicator for CountingProgress {
    fn init_progress(&self, _message: &str, _total: usize, _current: usize, _step_size: usize) {
        self.inits.fetch_add(1, Ordering::Relaxed);
    }

    fn init_indeterminate(&self, _message: &str) {
        self.inits.fetch_add(1, Ordering::Relaxed);
    }

    fn step_progress(&self) {
        let done = self.steps.fetch_add(1, Ordering::Relaxed) + 1;
        let limit = self.cancel_after_steps.load(Ordering::Relaxed);
        if limit > 0 && done >= limit {
            self.canceled.store(true, Ordering::Relaxed);
        }
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }

    fn set_complete(&self) {}
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
