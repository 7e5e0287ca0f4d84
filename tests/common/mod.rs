//! Shared fixtures for the choreographer integration tests.

#![allow(dead_code)]

use std::time::Duration;

use tokio::sync::mpsc;

use screenflow::{
    Actor, Choreographer, ChoreographerBuilder, ChoreographerConfig, Command, NavGraph,
    NavOptions, Node, Route, RouteKey, Sender, Validator,
};

pub const ROOT: RouteKey = RouteKey::new("root");
pub const SCREEN_A: RouteKey = RouteKey::new("screen-a");
pub const SCREEN_B: RouteKey = RouteKey::new("screen-b");
pub const LOGIN: RouteKey = RouteKey::new("login");

/// Root plus two plain screens and a login screen.
pub fn small_graph() -> NavGraph {
    NavGraph::new(
        ROOT,
        [
            Node::builder(ROOT, "Root").build(),
            Node::builder(SCREEN_A, "Screen A").build(),
            Node::builder(SCREEN_B, "Screen B").build(),
            Node::builder(LOGIN, "Login").build(),
        ],
    )
    .expect("fixture graph is valid")
}

/// Same graph, but screen A times out after two minutes.
pub fn graph_with_timeout() -> NavGraph {
    NavGraph::new(
        ROOT,
        [
            Node::builder(ROOT, "Root").build(),
            Node::builder(SCREEN_A, "Screen A")
                .screen_timeout(Duration::from_secs(120))
                .build(),
            Node::builder(SCREEN_B, "Screen B").build(),
            Node::builder(LOGIN, "Login").build(),
        ],
    )
    .expect("fixture graph is valid")
}

pub struct Harness {
    pub choreographer: Choreographer,
    pub user: Actor,
    pub system: Actor,
    pub commands: mpsc::Receiver<Command>,
}

/// Build and start a choreographer over `graph` with the given validators.
pub fn start(
    graph: NavGraph,
    config: ChoreographerConfig,
    validators: Vec<Box<dyn Validator>>,
) -> Harness {
    let mut builder = ChoreographerBuilder::new(graph)
        .config(config)
        .validators(validators);
    let user = builder.register_actor("user", Sender::User);
    let system = builder.register_actor("system", Sender::System);
    let choreographer = builder.build();
    let commands = choreographer.commands();
    choreographer.initialize();
    Harness {
        choreographer,
        user,
        system,
        commands,
    }
}

pub fn start_plain(graph: NavGraph) -> Harness {
    start(graph, ChoreographerConfig::default(), Vec::new())
}

/// Retained, single-top navigation options as a typical screen push.
pub fn push_options() -> NavOptions {
    NavOptions::default().single_top(true).add_to_back_stack(true)
}

pub fn route(key: RouteKey) -> Route {
    Route::new(key)
}

/// Receive the next command within `within`, panicking on silence.
pub async fn expect_command(rx: &mut mpsc::Receiver<Command>, within: Duration) -> Command {
    tokio::time::timeout(within, rx.recv())
        .await
        .expect("timed out waiting for a command")
        .expect("command stream ended")
}

/// Assert that no command arrives within `within`.
pub async fn expect_silence(rx: &mut mpsc::Receiver<Command>, within: Duration) {
    let result = tokio::time::timeout(within, rx.recv()).await;
    assert!(result.is_err(), "unexpected command: {:?}", result.unwrap());
}
