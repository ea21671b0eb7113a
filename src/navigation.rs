//! Navigation coordinator: programmatic navigation with a bounded loading flag.
//!
//! DESIGN
//! ======
//! `navigate` raises `is_navigating` and asks the router to transition. Two
//! things can lower the flag again:
//!
//! - the router reporting a path change (the primary signal), or
//! - a fixed timeout, because a router transition is not guaranteed to
//!   report completion.
//!
//! Whichever fires first wins. Each navigation bumps a generation counter and
//! the timer only clears the flag if its generation is still current, so a
//! late timer is a no-op. Clearing an already-cleared flag is also a no-op.
//!
//! CONCURRENCY
//! ===========
//! The router may report a path change synchronously from inside `push`, so
//! the tracker lock is never held across a router call.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::router::Router;

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_millis(3000);

/// Snapshot of the loading overlay state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    pub is_navigating: bool,
    pub target_path: Option<String>,
}

#[derive(Clone)]
pub struct NavigationCoordinator {
    shared: Arc<Shared>,
}

struct Shared {
    router: Arc<dyn Router>,
    timeout: Duration,
    tracker: Mutex<Tracker>,
    tx: watch::Sender<NavigationState>,
}

#[derive(Default)]
struct Tracker {
    state: NavigationState,
    generation: u64,
    timer: Option<AbortHandle>,
}

impl NavigationCoordinator {
    /// Build a coordinator and subscribe it to `router` path changes.
    #[must_use]
    pub fn new(router: Arc<dyn Router>, timeout: Duration) -> Self {
        let (tx, _rx) = watch::channel(NavigationState::default());
        let shared = Arc::new(Shared { router, timeout, tracker: Mutex::new(Tracker::default()), tx });

        let weak = Arc::downgrade(&shared);
        shared.router.on_path_change(Arc::new(move |path: &str| {
            if let Some(shared) = weak.upgrade() {
                shared.path_changed(path);
            }
        }));

        Self { shared }
    }

    #[must_use]
    pub fn router(&self) -> &Arc<dyn Router> {
        &self.shared.router
    }

    #[must_use]
    pub fn state(&self) -> NavigationState {
        self.shared.lock().state.clone()
    }

    #[must_use]
    pub fn is_navigating(&self) -> bool {
        self.shared.lock().state.is_navigating
    }

    /// Receiver that sees every state transition, for rendering the overlay.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.shared.tx.subscribe()
    }

    /// Navigate to `target_path`.
    ///
    /// No-op when already there, or when a navigation to the same target is
    /// still in flight.
    pub fn navigate(&self, target_path: &str) {
        if self.shared.router.current_path() == target_path {
            tracing::trace!(target_path, "already at target; skipping navigation");
            return;
        }

        let generation = {
            let mut tracker = self.shared.lock();
            if tracker.state.is_navigating && tracker.state.target_path.as_deref() == Some(target_path) {
                tracing::trace!(target_path, "navigation already in flight");
                return;
            }
            tracker.generation += 1;
            if let Some(timer) = tracker.timer.take() {
                timer.abort();
            }
            tracker.state = NavigationState { is_navigating: true, target_path: Some(target_path.to_owned()) };
            self.shared.publish(&tracker.state);
            tracker.generation
        };

        tracing::debug!(target_path, "navigation started");
        // Armed before `push` so a synchronous path change can cancel it.
        self.arm_timeout(generation);
        self.shared.router.push(target_path);
    }

    /// Manually raise or lower the loading flag.
    pub fn set_loading(&self, loading: bool) {
        if loading {
            let mut tracker = self.shared.lock();
            if !tracker.state.is_navigating {
                tracker.state.is_navigating = true;
                self.shared.publish(&tracker.state);
            }
        } else {
            self.shared.clear();
        }
    }

    fn arm_timeout(&self, generation: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no tokio runtime; navigation timeout not armed");
            return;
        };

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let timeout = self.shared.timeout;
        let task = handle.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(shared) = weak.upgrade() {
                shared.expire(generation);
            }
        });

        let mut tracker = self.shared.lock();
        if tracker.generation == generation && tracker.state.is_navigating {
            tracker.timer = Some(task.abort_handle());
        } else {
            task.abort();
        }
    }
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn publish(&self, state: &NavigationState) {
        self.tx.send_replace(state.clone());
    }

    fn path_changed(&self, path: &str) {
        tracing::debug!(path, "path changed");
        self.clear();
    }

    /// Lower the flag and cancel any pending timer.
    fn clear(&self) {
        let mut tracker = self.lock();
        tracker.generation += 1;
        if let Some(timer) = tracker.timer.take() {
            timer.abort();
        }
        if tracker.state != NavigationState::default() {
            tracker.state = NavigationState::default();
            self.publish(&tracker.state);
        }
    }

    fn expire(&self, generation: u64) {
        let mut tracker = self.lock();
        if tracker.generation != generation {
            return;
        }
        tracker.timer = None;
        if tracker.state.is_navigating {
            tracing::debug!(target_path = ?tracker.state.target_path, "navigation timed out; clearing loading flag");
            tracker.state = NavigationState::default();
            self.publish(&tracker.state);
        }
    }
}
