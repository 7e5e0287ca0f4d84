//! Cooperative cancellation for the choreographer's tasks.
//!
//! A single coordinator owns the signal; cheap cloneable handles are passed
//! to the pipeline task, the inactivity-timer actor, and validators (via
//! the validation context) so every layer can observe cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Owner side of the cancellation signal.
pub struct ShutdownCoordinator {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Signal cancellation. Idempotent; only the first call notifies.
    pub fn signal(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!("shutdown signalled");
            self.notify.notify_waiters();
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            cancelled: Arc::clone(&self.cancelled),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable observer of the cancellation signal.
#[derive(Clone)]
pub struct ShutdownHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    pub fn is_shutting_down(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn signal(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Wait until cancellation is signalled.
    pub async fn wait(&self) {
        // Subscribe before checking the flag: if signal() lands between the
        // check and the await, the enabled Notified still sees it.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }
}
