//! The inactivity-timer actor.
//!
//! Emits an [`Intent::InteractionTimeout`] after the current screen's
//! timeout elapses without interaction. Every pulse (a user interaction,
//! a current-node change, a lock change) cancels the pending timer and
//! re-arms it from scratch. While a lock reason is held, no timer is
//! armed at all.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::graph::NO_TIMEOUT;
use crate::intent::{Intent, Sender};
use crate::shutdown::ShutdownHandle;
use crate::state::CurrentNode;

/// Pulses waiting in the touch channel coalesce; a deep backlog carries no
/// extra information.
const TOUCH_CHANNEL_CAPACITY: usize = 8;

/// Opaque token that suppresses inactivity timeouts while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockReason(&'static str);

impl LockReason {
    pub const fn new(reason: &'static str) -> Self {
        Self(reason)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Control surface of the timer actor. Cloneable and usable from any
/// thread; acquire and release are idempotent.
#[derive(Clone)]
pub struct TimerHandle {
    touch_tx: mpsc::Sender<()>,
    lock_tx: Arc<watch::Sender<Option<LockReason>>>,
}

impl TimerHandle {
    /// Report a user interaction, restarting the pending timer.
    pub fn touch(&self) {
        // A full channel already has pulses queued; dropping this one is
        // equivalent.
        let _ = self.touch_tx.try_send(());
    }

    /// Hold the timeout lock. The pending timer is cancelled and none is
    /// armed until release. Last write wins when reasons differ.
    pub fn acquire(&self, reason: LockReason) {
        self.lock_tx.send_if_modified(|slot| {
            if slot.as_ref() == Some(&reason) {
                false
            } else {
                *slot = Some(reason);
                true
            }
        });
    }

    /// Release the timeout lock, scheduling a fresh timer.
    pub fn release(&self) {
        self.lock_tx.send_if_modified(|slot| slot.take().is_some());
    }

    pub fn lock_reason(&self) -> Option<LockReason> {
        *self.lock_tx.borrow()
    }
}

/// The un-spawned timer actor. Created at choreographer construction,
/// driven by [`run`](Self::run) once the choreographer initializes.
pub(crate) struct InactivityTimer {
    node_rx: watch::Receiver<CurrentNode>,
    lock_rx: watch::Receiver<Option<LockReason>>,
    touch_rx: mpsc::Receiver<()>,
    default_timeout: Duration,
    out: mpsc::Sender<Intent>,
}

impl InactivityTimer {
    pub(crate) fn new(
        node_rx: watch::Receiver<CurrentNode>,
        default_timeout: Duration,
        out: mpsc::Sender<Intent>,
    ) -> (Self, TimerHandle) {
        let (touch_tx, touch_rx) = mpsc::channel(TOUCH_CHANNEL_CAPACITY);
        let (lock_tx, lock_rx) = watch::channel(None);
        let actor = Self {
            node_rx,
            lock_rx,
            touch_rx,
            default_timeout,
            out,
        };
        let handle = TimerHandle {
            touch_tx,
            lock_tx: Arc::new(lock_tx),
        };
        (actor, handle)
    }

    /// Drive the actor until shutdown. Arms a fresh timer on entry (the
    /// initial pulse) and after every merged pulse.
    pub(crate) async fn run(mut self, shutdown: ShutdownHandle) {
        let mut touch_open = true;
        loop {
            let deadline = self.arm();
            tokio::select! {
                _ = shutdown.wait() => break,
                pulse = self.touch_rx.recv(), if touch_open => {
                    if pulse.is_none() {
                        // Every handle is gone; interactions can no longer
                        // arrive but node/lock pulses still matter.
                        touch_open = false;
                    }
                }
                changed = self.node_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = self.lock_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = expire(deadline) => {
                    tracing::info!("screen inactivity timeout elapsed");
                    let timeout = Intent::InteractionTimeout {
                        priority: Sender::System.default_priority(),
                    };
                    if self.out.send(timeout).await.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("inactivity timer stopped");
    }

    /// Compute the deadline for the current screen, or `None` when no
    /// timer should pend (lock held, or timeouts disabled for the screen).
    fn arm(&self) -> Option<Instant> {
        if self.lock_rx.borrow().is_some() {
            return None;
        }
        let timeout = self
            .node_rx
            .borrow()
            .node
            .screen_timeout()
            .unwrap_or(self.default_timeout);
        if timeout == NO_TIMEOUT {
            return None;
        }
        Some(Instant::now() + timeout)
    }
}

async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
