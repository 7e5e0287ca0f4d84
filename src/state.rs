//! The state handler: single owner of the back-stack and publisher of the
//! current node.
//!
//! External observers never touch the stack directly; they watch the
//! [`CurrentNode`] channel. The handler self-heals on underflow and failed
//! unwinds by resetting to the root, so the stack is never observed empty.

use std::sync::Arc;

use tokio::sync::watch;

use crate::graph::{Node, RouteKey};
use crate::intent::NavOptions;
use crate::stack::{BackStack, StackError};

/// The destination the user is considered to be viewing, plus the stack
/// depth behind it.
#[derive(Debug, Clone)]
pub struct CurrentNode {
    pub node: Arc<Node>,
    pub depth: usize,
}

/// Owns the back-stack; mutated only from the choreographer's serial loop.
pub struct StateHandler {
    stack: BackStack,
    root: Arc<Node>,
    current_tx: watch::Sender<CurrentNode>,
}

impl StateHandler {
    /// Create the handler with the root pushed and published.
    pub fn new(root: Arc<Node>) -> Self {
        let mut stack = BackStack::new();
        stack.add(root.clone(), NavOptions::default().add_to_back_stack(true));
        let (current_tx, _) = watch::channel(CurrentNode {
            node: root.clone(),
            depth: stack.len(),
        });
        Self {
            stack,
            root,
            current_tx,
        }
    }

    /// Watch the current node. The receiver always holds the latest value;
    /// consecutive equal values may be coalesced.
    pub fn subscribe(&self) -> watch::Receiver<CurrentNode> {
        self.current_tx.subscribe()
    }

    pub fn current(&self) -> Arc<Node> {
        self.stack
            .last()
            .map(|entry| entry.node.clone())
            .unwrap_or_else(|| self.root.clone())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Push a node and publish it. `options.add_to_back_stack` decides
    /// whether the entry is retained in history.
    pub fn append(&mut self, node: Arc<Node>, options: NavOptions) -> bool {
        self.stack.add(node, options);
        self.publish();
        true
    }

    /// Unwind to the destination with `key` (the matched entry stays on
    /// top). A failed match recovers to the root. Returns `false` only for
    /// an empty stack, in which case nothing is published.
    pub fn pop_until(&mut self, key: RouteKey) -> bool {
        match self.stack.pop_until(|node| node.route_key() == key, false) {
            Ok(()) => {
                self.publish();
                true
            }
            Err(StackError::NoMatch) => {
                tracing::warn!(route = %key, "pop_until matched nothing; resetting to root");
                self.reset_to_root();
                true
            }
            Err(StackError::Empty) => false,
        }
    }

    /// Pop the top entry and publish the node that becomes current.
    /// Underflow is benign: the handler resets to the root.
    pub fn pop(&mut self) -> Arc<Node> {
        match self.stack.pop() {
            Ok(node) => {
                self.publish();
                node
            }
            Err(StackError::Empty) => {
                self.reset_to_root();
                self.root.clone()
            }
            Err(StackError::NoMatch) => unreachable!("pop does not match"),
        }
    }

    /// Drop everything, push the root, publish it.
    pub fn clear(&mut self) {
        self.reset_to_root();
    }

    fn reset_to_root(&mut self) {
        self.stack.clear();
        self.stack.add(
            self.root.clone(),
            NavOptions::default().add_to_back_stack(true),
        );
        self.publish();
    }

    fn publish(&self) {
        self.current_tx.send_replace(CurrentNode {
            node: self.current(),
            depth: self.depth(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RouteKey;

    fn node(key: &'static str) -> Arc<Node> {
        Arc::new(Node::builder(RouteKey::new(key), key).build())
    }

    fn retained() -> NavOptions {
        NavOptions::default().add_to_back_stack(true)
    }

    #[test]
    fn construction_publishes_root() {
        let state = StateHandler::new(node("root"));
        let rx = state.subscribe();
        let current = rx.borrow();
        assert_eq!(current.node.route_key(), RouteKey::new("root"));
        assert_eq!(current.depth, 1);
    }

    #[test]
    fn append_pop_restores_previous_current() {
        let mut state = StateHandler::new(node("root"));
        let before = state.current();

        state.append(node("a"), retained());
        assert_eq!(state.current().route_key(), RouteKey::new("a"));
        assert_eq!(state.depth(), 2);

        let after = state.pop();
        assert_eq!(after, before);
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn pop_on_root_only_is_benign() {
        let mut state = StateHandler::new(node("root"));
        let rx = state.subscribe();

        let current = state.pop();
        assert_eq!(current.route_key(), RouteKey::new("root"));
        assert_eq!(state.depth(), 1);
        assert_eq!(rx.borrow().node.route_key(), RouteKey::new("root"));
    }

    #[test]
    fn pop_until_recovers_to_root_on_no_match() {
        let mut state = StateHandler::new(node("root"));
        state.append(node("a"), retained());
        state.append(node("b"), retained());

        assert!(state.pop_until(RouteKey::new("zzz")));
        assert_eq!(state.current().route_key(), RouteKey::new("root"));
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn pop_until_unwinds_to_match() {
        let mut state = StateHandler::new(node("root"));
        state.append(node("a"), retained());
        state.append(node("b"), retained());
        state.append(node("c"), retained());

        assert!(state.pop_until(RouteKey::new("a")));
        assert_eq!(state.current().route_key(), RouteKey::new("a"));
        assert_eq!(state.depth(), 2);
    }

    #[test]
    fn clear_twice_equals_clear_once() {
        let mut state = StateHandler::new(node("root"));
        state.append(node("a"), retained());

        state.clear();
        let depth_once = state.depth();
        let current_once = state.current();

        state.clear();
        assert_eq!(state.depth(), depth_once);
        assert_eq!(state.current(), current_once);
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn watch_tracks_latest_value() {
        let mut state = StateHandler::new(node("root"));
        let rx = state.subscribe();

        state.append(node("a"), retained());
        state.append(node("b"), retained());
        let current = rx.borrow();
        assert_eq!(current.node.route_key(), RouteKey::new("b"));
        assert_eq!(current.depth, 3);
    }
}
