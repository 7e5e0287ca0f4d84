//! The navigation graph: an immutable table of destinations.
//!
//! The graph is constructed once, validated, and then only queried. Lookup
//! is O(1) by [`RouteKey`]. The builder-DSL that produces graphs lives in
//! the embedding application; this module only defines the frozen result
//! and its invariants:
//!
//! - every route key is unique,
//! - the root key resolves,
//! - every menu child resolves.

mod node;
mod route;

pub use node::{Appearance, AutoRoute, Node, NodeBuilder, Requirement, NO_TIMEOUT};
pub use route::{Route, RouteArgs, RouteKey};

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while constructing or querying a [`NavGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("route '{0}' is registered more than once")]
    DuplicateRoute(RouteKey),

    #[error("root route '{0}' is not registered in the graph")]
    RootNotRegistered(RouteKey),

    #[error("menu node '{parent}' references unregistered child '{child}'")]
    MenuChildMissing { parent: RouteKey, child: RouteKey },

    #[error("route '{0}' is not present in the navigation graph")]
    RouteNotInGraph(RouteKey),

    #[error("route '{0}' is not a menu node")]
    NotAMenu(RouteKey),
}

/// Immutable, validated navigation graph rooted at a single node.
#[derive(Debug, Clone)]
pub struct NavGraph {
    root: RouteKey,
    nodes: HashMap<RouteKey, Arc<Node>>,
}

impl NavGraph {
    /// Build a graph from its node set, validating the structural invariants.
    pub fn new(root: RouteKey, nodes: impl IntoIterator<Item = Node>) -> Result<Self, GraphError> {
        let mut table: HashMap<RouteKey, Arc<Node>> = HashMap::new();
        for node in nodes {
            let key = node.route_key();
            if table.insert(key, Arc::new(node)).is_some() {
                return Err(GraphError::DuplicateRoute(key));
            }
        }

        if !table.contains_key(&root) {
            return Err(GraphError::RootNotRegistered(root));
        }

        for node in table.values() {
            for child in node.menu_children() {
                if !table.contains_key(child) {
                    return Err(GraphError::MenuChildMissing {
                        parent: node.route_key(),
                        child: *child,
                    });
                }
            }
        }

        Ok(Self { root, nodes: table })
    }

    pub fn root_key(&self) -> RouteKey {
        self.root
    }

    pub fn root_node(&self) -> &Arc<Node> {
        &self.nodes[&self.root]
    }

    pub fn lookup(&self, key: RouteKey) -> Option<&Arc<Node>> {
        self.nodes.get(&key)
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a menu node, failing if the key is unknown or the node has
    /// no children.
    pub fn menu_of(&self, key: RouteKey) -> Result<&Arc<Node>, GraphError> {
        let node = self
            .lookup(key)
            .ok_or(GraphError::RouteNotInGraph(key))?;
        if !node.is_menu() {
            return Err(GraphError::NotAMenu(key));
        }
        Ok(node)
    }
}
