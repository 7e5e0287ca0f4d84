//! The two-tier back-stack.
//!
//! `retained` is the real navigation history; `non_retained` holds
//! transient destinations that evaporate as soon as anything pops. Any pop
//! or unwind clears the transient tier completely before touching history.

use std::sync::Arc;

use thiserror::Error;

use crate::graph::Node;
use crate::intent::NavOptions;

/// Errors raised by back-stack operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("back stack is empty")]
    Empty,

    #[error("no back stack entry matched the requested destination")]
    NoMatch,
}

/// A node together with the options it was pushed under.
#[derive(Debug, Clone)]
pub struct StackEntry {
    pub node: Arc<Node>,
    pub options: NavOptions,
}

/// Ordered history of visited nodes.
#[derive(Debug, Default)]
pub struct BackStack {
    retained: Vec<StackEntry>,
    non_retained: Vec<StackEntry>,
}

impl BackStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a node according to its navigation options.
    ///
    /// `clear_back_stack` drops both tiers first. `add_to_back_stack`
    /// selects the retained tier (clearing the transient one);
    /// otherwise the push is transient. In either tier, `single_top`
    /// suppresses a consecutive duplicate at the effective top.
    pub fn add(&mut self, node: Arc<Node>, options: NavOptions) {
        if options.clear_back_stack {
            self.retained.clear();
            self.non_retained.clear();
        }

        let tier = if options.add_to_back_stack {
            self.non_retained.clear();
            &mut self.retained
        } else {
            &mut self.non_retained
        };

        if options.single_top {
            if let Some(top) = tier.last() {
                if top.node == node {
                    return;
                }
            }
        }

        tier.push(StackEntry { node, options });
    }

    /// Remove the top entry and return the node that becomes current.
    ///
    /// A non-empty transient tier is dropped wholesale without touching
    /// history. Removing the last retained entry is refused: the stack
    /// never pops below one element.
    pub fn pop(&mut self) -> Result<Arc<Node>, StackError> {
        if !self.non_retained.is_empty() {
            self.non_retained.clear();
            return self
                .retained
                .last()
                .map(|entry| entry.node.clone())
                .ok_or(StackError::Empty);
        }

        if self.retained.len() <= 1 {
            return Err(StackError::Empty);
        }
        self.retained.pop();
        Ok(self
            .retained
            .last()
            .expect("retained cannot be empty after guarded pop")
            .node
            .clone())
    }

    /// Pop retained entries until `pred` matches.
    ///
    /// With `inclusive = false` the matched entry is reinstated as the new
    /// top. If nothing matches, the retained tier ends up empty and the
    /// call fails with [`StackError::NoMatch`].
    pub fn pop_until(
        &mut self,
        pred: impl Fn(&Node) -> bool,
        inclusive: bool,
    ) -> Result<(), StackError> {
        self.non_retained.clear();
        if self.retained.is_empty() {
            return Err(StackError::Empty);
        }

        while let Some(entry) = self.retained.pop() {
            if pred(&entry.node) {
                if !inclusive {
                    self.retained.push(entry);
                }
                return Ok(());
            }
        }
        Err(StackError::NoMatch)
    }

    /// The effective top: transient tier first, then history.
    pub fn last(&self) -> Option<&StackEntry> {
        self.non_retained.last().or_else(|| self.retained.last())
    }

    /// Drop every entry in both tiers.
    pub fn clear(&mut self) {
        self.retained.clear();
        self.non_retained.clear();
    }

    pub fn len(&self) -> usize {
        self.retained.len() + self.non_retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty() && self.non_retained.is_empty()
    }
}
