//! Per-intent navigation policy.
//!
//! A [`Validator`] is an async predicate over `(intent, node)` producing a
//! four-way verdict. Validators are composed by
//! [`CompositeValidator`](composite::CompositeValidator), which runs them
//! in ascending priority order and merges redirects.

mod composite;

pub use composite::CompositeValidator;

use async_trait::async_trait;
use thiserror::Error;

use crate::graph::Node;
use crate::intent::Intent;
use crate::shutdown::ShutdownHandle;

/// Verdict of a validator over a single intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The intent may proceed.
    Valid,
    /// Drop the intent silently.
    Ignore,
    /// Reject the intent; the message surfaces as an error dialog.
    Invalid(String),
    /// The intent may proceed only after a chain of prefix intents
    /// completes.
    Redirect {
        original: Box<Intent>,
        /// Prefix intents, ordered by descending priority.
        chain: Vec<Intent>,
    },
}

/// Failure inside a validator. The composite converts any error into
/// `Invalid("validator error")` so a broken validator cannot take the
/// pipeline down.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("validator '{name}' failed: {message}")]
    Failed { name: &'static str, message: String },
}

impl ValidationError {
    pub fn failed(name: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            name,
            message: message.into(),
        }
    }
}

/// Ambient context handed to every validator invocation.
///
/// Carries the pipeline's cancellation signal; long-running validators
/// must observe it.
#[derive(Clone)]
pub struct ValidationCx {
    shutdown: ShutdownHandle,
}

impl ValidationCx {
    pub fn new(shutdown: ShutdownHandle) -> Self {
        Self { shutdown }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_shutting_down()
    }

    /// Resolve when the pipeline is being cancelled.
    pub async fn cancelled(&self) {
        self.shutdown.wait().await
    }
}

/// An async navigation policy.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluation order within the composite: lower runs first, ties are
    /// broken by registration order.
    fn priority(&self) -> i32 {
        0
    }

    async fn validate(
        &self,
        intent: &Intent,
        node: &Node,
        cx: &ValidationCx,
    ) -> Result<Validation, ValidationError>;
}
