//! Router collaborator: the three routing primitives the coordinator needs.
//!
//! `MemoryRouter` is a process-local implementation for headless use and
//! tests. It can complete pushes immediately or hold them pending to model a
//! transition that never signals completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

/// Listener invoked with the new path after every observed path change.
pub type PathChangeCallback = Arc<dyn Fn(&str) + Send + Sync>;

pub trait Router: Send + Sync {
    fn current_path(&self) -> String;

    /// Request a transition. Completion is signalled through
    /// [`Router::on_path_change`], if at all.
    fn push(&self, path: &str);

    fn on_path_change(&self, callback: PathChangeCallback);
}

// =============================================================================
// MEMORY ROUTER
// =============================================================================

pub struct MemoryRouter {
    inner: Mutex<MemoryRouterInner>,
    auto_complete: AtomicBool,
}

struct MemoryRouterInner {
    current: String,
    pushes: Vec<String>,
    pending: Option<String>,
    listeners: Vec<PathChangeCallback>,
}

impl MemoryRouter {
    /// Router at `initial` that completes every push immediately.
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self {
            inner: Mutex::new(MemoryRouterInner {
                current: initial.to_owned(),
                pushes: Vec::new(),
                pending: None,
                listeners: Vec::new(),
            }),
            auto_complete: AtomicBool::new(true),
        }
    }

    /// Router whose pushes stay pending until [`MemoryRouter::complete`].
    #[must_use]
    pub fn manual(initial: &str) -> Self {
        let router = Self::new(initial);
        router.auto_complete.store(false, Ordering::SeqCst);
        router
    }

    /// Every path passed to `push`, in order.
    #[must_use]
    pub fn pushes(&self) -> Vec<String> {
        self.lock().pushes.clone()
    }

    #[must_use]
    pub fn pending(&self) -> Option<String> {
        self.lock().pending.clone()
    }

    /// Finish the pending transition, if any.
    pub fn complete(&self) {
        let pending = self.lock().pending.take();
        if let Some(path) = pending {
            self.set_path(&path);
        }
    }

    /// Change the current path from outside (back button, link click).
    /// Listeners fire only when the path actually changes.
    pub fn set_path(&self, path: &str) {
        let listeners = {
            let mut inner = self.lock();
            if inner.current == path {
                return;
            }
            inner.current = path.to_owned();
            inner.listeners.clone()
        };
        for listener in listeners {
            listener(path);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryRouterInner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Router for MemoryRouter {
    fn current_path(&self) -> String {
        self.lock().current.clone()
    }

    fn push(&self, path: &str) {
        {
            let mut inner = self.lock();
            inner.pushes.push(path.to_owned());
            inner.pending = Some(path.to_owned());
        }
        if self.auto_complete.load(Ordering::SeqCst) {
            self.complete();
        }
    }

    fn on_path_change(&self, callback: PathChangeCallback) {
        self.lock().listeners.push(callback);
    }
}
