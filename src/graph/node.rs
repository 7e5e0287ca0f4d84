//! Graph nodes and their per-destination metadata.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::route::{Route, RouteKey};

/// Explicit "this screen never times out" marker for [`NodeBuilder::screen_timeout`].
pub const NO_TIMEOUT: Duration = Duration::MAX;

/// Opaque access-requirement tag attached to a node.
///
/// The core never interprets requirements; validators do.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Requirement(String);

impl Requirement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Presentation metadata, opaque to the core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Appearance {
    pub title: String,
    pub icon: Option<String>,
}

/// Closure producing a route instance for a node, used by menu-driven
/// navigation where the destination is selected by node rather than by an
/// explicit route value.
pub type AutoRoute = Arc<dyn Fn() -> Route + Send + Sync>;

/// A destination in the navigation graph.
///
/// Node equality is key equality: route keys are unique within a graph, so
/// two nodes compare equal exactly when they are the same destination.
#[derive(Clone)]
pub struct Node {
    route_key: RouteKey,
    appearance: Appearance,
    /// `None` = unspecified (the choreographer's default applies);
    /// `Some(NO_TIMEOUT)` = explicitly never.
    screen_timeout: Option<Duration>,
    requirements: BTreeSet<Requirement>,
    menu_children: Vec<RouteKey>,
    auto_route: Option<AutoRoute>,
}

impl Node {
    pub fn builder(route_key: RouteKey, title: impl Into<String>) -> NodeBuilder {
        NodeBuilder {
            route_key,
            appearance: Appearance {
                title: title.into(),
                icon: None,
            },
            screen_timeout: None,
            requirements: BTreeSet::new(),
            menu_children: Vec::new(),
            auto_route: None,
        }
    }

    pub fn route_key(&self) -> RouteKey {
        self.route_key
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// Per-screen inactivity timeout. `None` means the node did not specify
    /// one; [`NO_TIMEOUT`] means timeouts are disabled for this screen.
    pub fn screen_timeout(&self) -> Option<Duration> {
        self.screen_timeout
    }

    pub fn requirements(&self) -> &BTreeSet<Requirement> {
        &self.requirements
    }

    pub fn requires(&self, tag: &Requirement) -> bool {
        self.requirements.contains(tag)
    }

    /// Ordered child destinations; non-empty only for menu nodes.
    pub fn menu_children(&self) -> &[RouteKey] {
        &self.menu_children
    }

    pub fn is_menu(&self) -> bool {
        !self.menu_children.is_empty()
    }

    /// Produce a route instance for this node, preferring the configured
    /// auto-route closure over a bare key.
    pub fn route(&self) -> Route {
        match &self.auto_route {
            Some(build) => build(),
            None => Route::new(self.route_key),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("route_key", &self.route_key)
            .field("appearance", &self.appearance)
            .field("screen_timeout", &self.screen_timeout)
            .field("requirements", &self.requirements)
            .field("menu_children", &self.menu_children)
            .field("auto_route", &self.auto_route.as_ref().map(|_| "<closure>"))
            .finish()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.route_key == other.route_key
    }
}

impl Eq for Node {}

/// Builder for [`Node`].
pub struct NodeBuilder {
    route_key: RouteKey,
    appearance: Appearance,
    screen_timeout: Option<Duration>,
    requirements: BTreeSet<Requirement>,
    menu_children: Vec<RouteKey>,
    auto_route: Option<AutoRoute>,
}

impl NodeBuilder {
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.appearance.icon = Some(icon.into());
        self
    }

    pub fn screen_timeout(mut self, timeout: Duration) -> Self {
        self.screen_timeout = Some(timeout);
        self
    }

    pub fn no_screen_timeout(mut self) -> Self {
        self.screen_timeout = Some(NO_TIMEOUT);
        self
    }

    pub fn require(mut self, tag: impl Into<String>) -> Self {
        self.requirements.insert(Requirement::new(tag));
        self
    }

    /// Append a child destination, making this node a menu node.
    pub fn menu_child(mut self, child: RouteKey) -> Self {
        self.menu_children.push(child);
        self
    }

    pub fn auto_route(mut self, build: impl Fn() -> Route + Send + Sync + 'static) -> Self {
        self.auto_route = Some(Arc::new(build));
        self
    }

    pub fn build(self) -> Node {
        Node {
            route_key: self.route_key,
            appearance: self.appearance,
            screen_timeout: self.screen_timeout,
            requirements: self.requirements,
            menu_children: self.menu_children,
            auto_route: self.auto_route,
        }
    }
}
