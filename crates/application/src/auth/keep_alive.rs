//! Proactive token invalidation on tab re-focus.
//!
//! Watches the host's visibility signal and discards the cached access
//! token on each return to the foreground, so the next resolver call goes
//! to the provider instead of presenting a token that expired while the
//! tab was backgrounded.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::auth::TokenStore;

/// Visibility state of the hosting user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The tab/window is in the foreground.
    Visible,
    /// The tab/window is backgrounded.
    Hidden,
}

/// Background policy that invalidates the cached token when the
/// application regains visibility.
///
/// Lifecycle: uninitialized → active → stopped. [`SessionKeepAlive::start`]
/// is idempotent and [`SessionKeepAlive::stop`] when inactive is a no-op.
pub struct SessionKeepAlive {
    store: TokenStore,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl SessionKeepAlive {
    /// Creates an inactive keep-alive over the given token store.
    #[must_use]
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            watcher: Mutex::new(None),
        }
    }

    /// Starts watching the visibility signal.
    ///
    /// A second call while active is a no-op. The token is discarded once
    /// per hidden→visible transition; repeated visibility pings while
    /// already visible do nothing.
    pub fn start(&self, visibility: watch::Receiver<Visibility>) {
        let mut watcher = lock_watcher(&self.watcher);
        if watcher.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!("session keep-alive already running");
            return;
        }

        debug!("session keep-alive started, will refresh token on tab focus");
        let store = self.store.clone();
        *watcher = Some(tokio::spawn(watch_visibility(store, visibility)));
    }

    /// Stops watching. Calling while inactive is a no-op.
    pub fn stop(&self) {
        if let Some(task) = lock_watcher(&self.watcher).take() {
            task.abort();
            debug!("session keep-alive stopped");
        }
    }

    /// Returns true while the watcher task is running.
    pub fn is_active(&self) -> bool {
        lock_watcher(&self.watcher)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SessionKeepAlive {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock_watcher(watcher: &Mutex<Option<JoinHandle<()>>>) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
    watcher.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn watch_visibility(store: TokenStore, mut visibility: watch::Receiver<Visibility>) {
    let mut last = *visibility.borrow();

    // Runs until the sender side is dropped.
    while visibility.changed().await.is_ok() {
        let current = *visibility.borrow();
        if last == Visibility::Hidden && current == Visibility::Visible {
            debug!("tab focused, discarding cached access token");
            store.clear_access_token().await;
        }
        last = current;
    }
}
