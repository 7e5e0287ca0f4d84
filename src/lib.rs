//! # screenflow
//!
//! A policy-driven navigation choreographer: converts an unbounded,
//! concurrent stream of navigation intents into a deterministic,
//! validated, ordered sequence of navigation commands for a view layer to
//! execute.
//!
//! # Architecture
//!
//! ```text
//! Actors / Timer ──▶ Choreographer ──▶ Validation ──▶ State ──▶ Commands
//!        ▲                │
//!        └── redirects, dialogs, retries (local source)
//! ```
//!
//! - **Intents** are requests for navigation effects, produced by
//!   registered [`Actor`]s, the inactivity timer and the pipeline itself.
//! - The **[`Choreographer`]** merges every source, debounces duplicates
//!   and dispatches strictly serially.
//! - **[`Validator`]s** accept, reject, ignore or redirect each intent.
//! - The **state handler** keeps the back-stack invariants and publishes
//!   the current node.
//! - **[`Command`]s** are the validated output the view layer consumes.
//!
//! # Example
//!
//! ```no_run
//! use screenflow::{
//!     ChoreographerBuilder, NavGraph, NavOptions, Node, Route, RouteKey, Sender,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! const HOME: RouteKey = RouteKey::new("home");
//! const DETAIL: RouteKey = RouteKey::new("detail");
//!
//! let graph = NavGraph::new(
//!     HOME,
//!     [
//!         Node::builder(HOME, "Home").build(),
//!         Node::builder(DETAIL, "Detail").build(),
//!     ],
//! )?;
//!
//! let mut builder = ChoreographerBuilder::new(graph);
//! let user = builder.register_actor("user", Sender::User);
//! let choreographer = builder.build();
//!
//! let mut commands = choreographer.commands();
//! choreographer.initialize();
//!
//! user.navigate(
//!     Route::new(DETAIL),
//!     NavOptions::default().add_to_back_stack(true),
//! )
//! .await?;
//! let _command = commands.recv().await;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod choreographer;
pub mod command;
pub mod config;
pub mod graph;
pub mod intent;
pub mod shutdown;
pub mod stack;
pub mod state;
pub mod timer;
pub mod transaction;
pub mod validation;

pub use actor::{Actor, ActorError};
pub use choreographer::{Choreographer, ChoreographerBuilder};
pub use command::{Command, CommandBus};
pub use config::ChoreographerConfig;
pub use graph::{
    Appearance, GraphError, NavGraph, Node, NodeBuilder, Requirement, Route, RouteArgs, RouteKey,
    NO_TIMEOUT,
};
pub use intent::{DialogId, Intent, NavOptions, Overlay, Sender, Severity};
pub use shutdown::{ShutdownCoordinator, ShutdownHandle};
pub use stack::{BackStack, StackEntry, StackError};
pub use state::{CurrentNode, StateHandler};
pub use timer::{LockReason, TimerHandle};
pub use transaction::{Step, Transaction, TransactionError, TransactionManager};
pub use validation::{
    CompositeValidator, Validation, ValidationCx, ValidationError, Validator,
};
