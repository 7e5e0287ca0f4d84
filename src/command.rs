//! View-side commands and the broadcast that carries them.
//!
//! A [`Command`] is the validated, ordered counterpart of an intent: the
//! only thing the view layer ever consumes. The [`CommandBus`] fans
//! commands out to every subscriber over bounded channels; the primary
//! send path suspends when a subscriber is saturated so that commands are
//! never silently lost.

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::graph::Route;
use crate::intent::{DialogId, NavOptions, Overlay};

/// A navigation effect for the view layer to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NavigateTo { route: Route, options: NavOptions },
    Back,
    PopUpTo { route: Route, inclusive: bool },
    ClearBackStack,
    Dialog {
        overlay: Overlay,
        /// Overlay to dismiss before showing this one.
        dismiss_first: Option<DialogId>,
    },
    DismissDialog { dialog_id: DialogId },
}

impl Command {
    /// Short variant name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Command::NavigateTo { .. } => "navigate_to",
            Command::Back => "back",
            Command::PopUpTo { .. } => "pop_up_to",
            Command::ClearBackStack => "clear_back_stack",
            Command::Dialog { .. } => "dialog",
            Command::DismissDialog { .. } => "dismiss_dialog",
        }
    }
}

/// Multi-subscriber command broadcast with per-subscriber bounded buffers.
pub struct CommandBus {
    capacity: usize,
    subscribers: Mutex<Vec<mpsc::Sender<Command>>>,
}

impl CommandBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Open a new subscription. Commands sent after this call are delivered
    /// in emission order.
    pub fn subscribe(&self) -> mpsc::Receiver<Command> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver a command to every live subscriber, waiting for buffer space
    /// where necessary. Subscribers that have gone away are pruned.
    pub async fn send(&self, command: Command) {
        let targets: Vec<mpsc::Sender<Command>> = self.subscribers.lock().clone();
        let mut dropped = false;
        for tx in targets {
            if tx.send(command.clone()).await.is_err() {
                dropped = true;
            }
        }
        if dropped {
            self.subscribers.lock().retain(|tx| !tx.is_closed());
        }
    }

    /// Best-effort delivery for error paths: a saturated or closed
    /// subscriber simply misses the command.
    pub fn try_send(&self, command: Command) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| !tx.is_closed());
        for tx in subscribers.iter() {
            if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(command.clone()) {
                tracing::warn!(command = command.label(), "command dropped: subscriber full");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
