//! Redirect-chain transactions.
//!
//! A redirect suspends its original intent behind an ordered chain of
//! prefix intents. The manager sequences exactly one transaction at a
//! time: each `CompleteNavTransaction` advances the cursor, and exhausting
//! the chain hands the original back for execution.

use std::collections::VecDeque;

use parking_lot::Mutex;
use thiserror::Error;

use crate::intent::Intent;

/// Errors raised by the transaction manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("a navigation transaction is already in progress")]
    InProgress,

    #[error("no navigation transaction is active")]
    NoTransaction,

    #[error("transaction manager state is inconsistent")]
    InvalidState,
}

/// A redirect chain plus the intent it suspends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Prefix intents, ordered by descending priority.
    required_intents: Vec<Intent>,
    original: Intent,
}

impl Transaction {
    pub fn new(required_intents: Vec<Intent>, original: Intent) -> Self {
        Self {
            required_intents,
            original,
        }
    }

    pub fn required_intents(&self) -> &[Intent] {
        &self.required_intents
    }

    pub fn original(&self) -> &Intent {
        &self.original
    }
}

/// One advancement of the active transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The next prefix intent to execute.
    Continue(Intent),
    /// The chain is drained; execute the original.
    BackToOriginal(Intent),
}

#[derive(Debug, Default)]
struct ManagerInner {
    transaction: Option<Transaction>,
    /// Pending prefix intents; `Some` exactly while a transaction is
    /// installed.
    cursor: Option<VecDeque<Intent>>,
    current: Option<Intent>,
}

impl ManagerInner {
    fn reset(&mut self) {
        self.transaction = None;
        self.cursor = None;
        self.current = None;
    }
}

/// Sequences at most one active redirect transaction.
#[derive(Debug, Default)]
pub struct TransactionManager {
    inner: Mutex<ManagerInner>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a transaction. Fails while a previously installed chain
    /// still has pending prefix intents.
    pub fn apply(&self, transaction: Transaction) -> Result<(), TransactionError> {
        let mut inner = self.inner.lock();
        let pending = inner
            .cursor
            .as_ref()
            .map(|cursor| !cursor.is_empty())
            .unwrap_or(false);
        if inner.transaction.is_some() && pending {
            return Err(TransactionError::InProgress);
        }

        inner.cursor = Some(transaction.required_intents.iter().cloned().collect());
        inner.transaction = Some(transaction);
        inner.current = None;
        Ok(())
    }

    /// Advance the active transaction.
    ///
    /// Returns the next pending prefix, or consumes the transaction and
    /// returns the original once the chain is drained.
    pub fn next(&self) -> Result<Step, TransactionError> {
        let mut inner = self.inner.lock();
        if inner.transaction.is_none() {
            return Err(TransactionError::NoTransaction);
        }
        let Some(cursor) = inner.cursor.as_mut() else {
            // Installed transaction without its cursor is a bug, not a
            // recoverable condition. Reset and surface it.
            tracing::error!("transaction installed without cursor; resetting");
            inner.reset();
            return Err(TransactionError::InvalidState);
        };

        if let Some(next) = cursor.pop_front() {
            inner.current = Some(next.clone());
            return Ok(Step::Continue(next));
        }

        let original = inner
            .transaction
            .take()
            .expect("transaction checked above")
            .original;
        inner.cursor = None;
        inner.current = Some(original.clone());
        Ok(Step::BackToOriginal(original))
    }

    /// The intent most recently handed out by [`next`](Self::next).
    pub fn current(&self) -> Option<Intent> {
        self.inner.lock().current.clone()
    }

    /// Abandon the active transaction, if any.
    pub fn cancel(&self) {
        self.inner.lock().reset();
    }

    /// True while an installed transaction still has pending prefix
    /// intents.
    pub fn active(&self) -> bool {
        let inner = self.inner.lock();
        inner.transaction.is_some()
            && inner
                .cursor
                .as_ref()
                .map(|cursor| !cursor.is_empty())
                .unwrap_or(false)
    }
}
