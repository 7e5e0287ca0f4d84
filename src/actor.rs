//! Intent-producing actors.
//!
//! An [`Actor`] is a named source of intents with a fixed [`Sender`] tag
//! and a default priority. Its methods translate the high-level navigation
//! API into canonical intents and enqueue them towards the choreographer.
//! Actors are registered at choreographer construction; the set is fixed
//! for the choreographer's lifetime.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::graph::Route;
use crate::intent::{DialogId, Intent, NavOptions, Overlay, Sender};

/// Errors raised when publishing intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActorError {
    #[error("navigation pipeline is no longer accepting intents")]
    PipelineClosed,
}

/// A registered intent source.
#[derive(Clone)]
pub struct Actor {
    name: &'static str,
    sender: Sender,
    default_priority: u8,
    tx: mpsc::Sender<Intent>,
}

impl Actor {
    pub(crate) fn new(
        name: &'static str,
        sender: Sender,
        default_priority: u8,
        tx: mpsc::Sender<Intent>,
    ) -> Self {
        Self {
            name,
            sender,
            default_priority,
            tx,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn default_priority(&self) -> u8 {
        self.default_priority
    }

    /// A copy of this actor publishing at a different priority.
    pub fn with_priority(&self, priority: u8) -> Actor {
        let mut actor = self.clone();
        actor.default_priority = priority;
        actor
    }

    /// A copy of this actor publishing at its sender's elevated priority.
    pub fn prioritized(&self) -> Actor {
        self.with_priority(self.sender.high_priority())
    }

    /// Publish a raw intent, waiting for queue space.
    pub async fn publish(&self, intent: Intent) -> Result<(), ActorError> {
        tracing::debug!(actor = self.name, intent = intent.label(), "publishing intent");
        self.tx
            .send(intent)
            .await
            .map_err(|_| ActorError::PipelineClosed)
    }

    pub async fn navigate(&self, route: Route, options: NavOptions) -> Result<(), ActorError> {
        self.publish(Intent::NavigateTo {
            route,
            options,
            sender: self.sender,
            priority: self.default_priority,
        })
        .await
    }

    pub async fn navigate_back(&self) -> Result<(), ActorError> {
        self.publish(Intent::Back {
            sender: self.sender,
            priority: self.default_priority,
        })
        .await
    }

    pub async fn pop_up_to(&self, route: Route, inclusive: bool) -> Result<(), ActorError> {
        self.publish(Intent::PopUpTo {
            route,
            inclusive,
            sender: self.sender,
            priority: self.default_priority,
        })
        .await
    }

    pub async fn clear_back_stack(&self) -> Result<(), ActorError> {
        self.publish(Intent::ClearBackStack {
            sender: self.sender,
            priority: self.default_priority,
        })
        .await
    }

    pub async fn show_dialog(
        &self,
        overlay: Overlay,
        dismiss_first: Option<DialogId>,
    ) -> Result<(), ActorError> {
        self.publish(Intent::DisplayDialog {
            overlay,
            sender: self.sender,
            priority: self.default_priority,
            dismiss_first,
        })
        .await
    }

    pub async fn dismiss_dialog(&self, dialog_id: DialogId) -> Result<(), ActorError> {
        self.publish(Intent::DismissOverlay {
            dialog_id,
            sender: self.sender,
            priority: self.default_priority,
        })
        .await
    }

    /// Acknowledge that the view layer finished a command belonging to the
    /// active redirect transaction.
    pub async fn complete_transaction(&self, route: Route) -> Result<(), ActorError> {
        self.publish(Intent::CompleteNavTransaction { route }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RouteKey;

    fn actor() -> (Actor, mpsc::Receiver<Intent>) {
        let (tx, rx) = mpsc::channel(4);
        (Actor::new("user", Sender::User, Sender::User.default_priority(), tx), rx)
    }

    #[tokio::test]
    async fn navigate_attaches_sender_and_priority() {
        let (actor, mut rx) = actor();
        actor
            .navigate(Route::new(RouteKey::new("a")), NavOptions::default())
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Intent::NavigateTo {
                sender, priority, ..
            } => {
                assert_eq!(sender, Sender::User);
                assert_eq!(priority, 1);
            }
            other => panic!("unexpected intent: {:?}", other),
        }
    }

    #[tokio::test]
    async fn prioritized_uses_high_priority() {
        let (actor, mut rx) = actor();
        actor.prioritized().navigate_back().await.unwrap();

        match rx.recv().await.unwrap() {
            Intent::Back { priority, .. } => assert_eq!(priority, 10),
            other => panic!("unexpected intent: {:?}", other),
        }
    }

    #[tokio::test]
    async fn publish_fails_once_pipeline_is_gone() {
        let (actor, rx) = actor();
        drop(rx);
        let err = actor.navigate_back().await.unwrap_err();
        assert_eq!(err, ActorError::PipelineClosed);
    }
}
