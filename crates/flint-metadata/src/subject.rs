//! Observer registry with coalesced notification
//!
//! Each observable entity owns a `Subject`. Subscribers are held as weak
//! handles so the UI never keeps metadata alive (and vice versa). While
//! the lock count is above zero, notifications are deferred; the final
//! unlock flushes at most one coalesced signal.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Receives "changed" signals; must re-query current state, there is no
/// payload diff
pub trait MetadataObserver: Send + Sync {
    fn update(&self);
}

#[derive(Default)]
struct SubjectState {
    lock_count: u32,
    dirty: bool,
}

/// Publish/subscribe registry for one observable entity
#[derive(Default)]
pub struct Subject {
    observers: Mutex<Vec<Weak<dyn MetadataObserver>>>,
    state: Mutex<SubjectState>,
}

impl Subject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer; held weakly
    pub fn attach(&self, observer: &Arc<dyn MetadataObserver>) {
        self.observers.lock().push(Arc::downgrade(observer));
    }

    /// Unsubscribe by identity; dead handles are pruned as a side effect
    pub fn detach(&self, observer: &Arc<dyn MetadataObserver>) {
        self.observers.lock().retain(|weak| match weak.upgrade() {
            Some(live) => !Arc::ptr_eq(&live, observer),
            None => false,
        });
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Push a "changed" signal, or mark dirty while locked
    pub fn notify(&self) {
        {
            let mut state = self.state.lock();
            if state.lock_count > 0 {
                state.dirty = true;
                return;
            }
        }
        self.deliver();
    }

    /// Defer notifications; reentrant
    pub fn lock(&self) {
        self.state.lock().lock_count += 1;
    }

    /// Undo one `lock`; the final unlock flushes one coalesced signal if
    /// anything changed while locked
    pub fn unlock(&self) {
        let flush = {
            let mut state = self.state.lock();
            state.lock_count = state.lock_count.saturating_sub(1);
            if state.lock_count == 0 && state.dirty {
                state.dirty = false;
                true
            } else {
                false
            }
        };
        if flush {
            self.deliver();
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock().lock_count > 0
    }

    fn deliver(&self) {
        // snapshot first: an observer may attach/detach from its update
        let live: Vec<Arc<dyn MetadataObserver>> = {
            let mut observers = self.observers.lock();
            observers.retain(|w| w.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in live {
            observer.update();
        }
    }
}

impl std::fmt::Debug for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.observer_count())
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// RAII lock/unlock pair around a bulk mutation
pub struct SubjectGuard<'a> {
    subject: &'a Subject,
}

impl<'a> SubjectGuard<'a> {
    pub fn new(subject: &'a Subject) -> Self {
        subject.lock();
        Self { subject }
    }
}

impl Drop for SubjectGuard<'_> {
    fn drop(&mut self) {
        self.subject.unlock();
    }
}

#[cfg(test)]
#[path = "subject_tests.rs"]
mod tests;
