//! The choreographer: single serial processor of merged navigation
//! intents.
//!
//! # Pipeline
//!
//! ```text
//! actors ──┐
//! timer  ──┼──▶ merge ──▶ debounce-distinct ──▶ dispatch ──▶ commands
//! local  ──┘                                      │
//!    ▲                                            │ validate / mutate
//!    └── retries, redirect prefixes, dialogs ◀────┘
//! ```
//!
//! Every intent source is merged into one stream and consumed strictly
//! serially: all side effects of one intent (state mutation, command
//! emission, transaction changes) land before the next intent is
//! dispatched. The local source feeds redirect prefixes and synthesised
//! error dialogs back into the same pipeline, so nothing bypasses
//! validation except the two documented paths (the drained transaction's
//! original, and the error dialog which is itself re-validated).

mod debounce;

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{StreamExt, StreamMap};

use crate::actor::Actor;
use crate::command::{Command, CommandBus};
use crate::config::ChoreographerConfig;
use crate::graph::{GraphError, NavGraph, Node, Route};
use crate::intent::{Intent, Overlay, Sender};
use crate::shutdown::{ShutdownCoordinator, ShutdownHandle};
use crate::state::{CurrentNode, StateHandler};
use crate::timer::{InactivityTimer, TimerHandle};
use crate::transaction::{Step, Transaction, TransactionError, TransactionManager};
use crate::validation::{CompositeValidator, Validation, ValidationCx, Validator};

use debounce::DebounceDistinct;

/// Source keys reserved for the pipeline's own streams.
const LOCAL_SOURCE: &str = "local";
const TIMER_SOURCE: &str = "timer";

/// Errors that terminate the dispatch of a single intent. Nothing here
/// escapes the pipeline task.
#[derive(Debug, Error)]
enum DispatchError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl DispatchError {
    /// Inconsistent transaction state is worth another attempt after the
    /// manager has reset itself.
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::Transaction(TransactionError::InvalidState)
        )
    }
}

/// Construction-time dependency injection for [`Choreographer`].
pub struct ChoreographerBuilder {
    graph: Arc<NavGraph>,
    config: ChoreographerConfig,
    validators: Vec<Box<dyn Validator>>,
    sources: Vec<(&'static str, mpsc::Receiver<Intent>)>,
}

impl ChoreographerBuilder {
    pub fn new(graph: NavGraph) -> Self {
        Self {
            graph: Arc::new(graph),
            config: ChoreographerConfig::default(),
            validators: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn config(mut self, config: ChoreographerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = Box<dyn Validator>>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Register an intent source. The returned [`Actor`] publishes with
    /// the sender's default priority. Names must be unique and must not
    /// collide with the reserved `local` and `timer` sources.
    pub fn register_actor(&mut self, name: &'static str, sender: Sender) -> Actor {
        assert!(
            name != LOCAL_SOURCE && name != TIMER_SOURCE,
            "actor name '{name}' is reserved"
        );
        assert!(
            self.sources.iter().all(|(existing, _)| *existing != name),
            "actor name '{name}' is already registered"
        );
        let (tx, rx) = mpsc::channel(self.config.actor_channel_capacity);
        self.sources.push((name, rx));
        Actor::new(name, sender, sender.default_priority(), tx)
    }

    pub fn build(self) -> Choreographer {
        let config = self.config;
        let graph = self.graph;

        let state = StateHandler::new(graph.root_node().clone());
        let current_rx = state.subscribe();

        let (local_tx, local_rx) = mpsc::channel(config.local_source_capacity);
        let (timer_tx, timer_rx) = mpsc::channel(config.actor_channel_capacity);
        let (timer_actor, timer_handle) = InactivityTimer::new(
            current_rx.clone(),
            config.default_screen_timeout,
            timer_tx,
        );

        let mut sources: StreamMap<&'static str, ReceiverStream<Intent>> = StreamMap::new();
        for (name, rx) in self.sources {
            sources.insert(name, ReceiverStream::new(rx));
        }
        sources.insert(LOCAL_SOURCE, ReceiverStream::new(local_rx));
        sources.insert(TIMER_SOURCE, ReceiverStream::new(timer_rx));

        let commands = Arc::new(CommandBus::new(config.command_buffer_capacity));

        let pipeline = Pipeline {
            graph: graph.clone(),
            config: config.clone(),
            state,
            validators: CompositeValidator::new(self.validators),
            transactions: TransactionManager::new(),
            sources,
            local_tx: local_tx.clone(),
            commands: commands.clone(),
        };

        Choreographer {
            graph,
            commands,
            current_rx,
            timer: timer_handle,
            local_tx,
            shutdown: ShutdownCoordinator::new(),
            startup: Mutex::new(Some(Startup {
                pipeline,
                timer: timer_actor,
            })),
            tasks: Mutex::new(Vec::new()),
        }
    }
}

/// Pieces consumed by the first `initialize()` call.
struct Startup {
    pipeline: Pipeline,
    timer: InactivityTimer,
}

/// The navigation choreographer.
///
/// Idle until [`initialize`](Self::initialize)d; afterwards its pipeline
/// task owns the state handler, validation chain and transaction manager,
/// making them observably single-threaded.
pub struct Choreographer {
    graph: Arc<NavGraph>,
    commands: Arc<CommandBus>,
    current_rx: watch::Receiver<CurrentNode>,
    timer: TimerHandle,
    local_tx: mpsc::Sender<Intent>,
    shutdown: ShutdownCoordinator,
    startup: Mutex<Option<Startup>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Choreographer {
    /// Start the pipeline and timer tasks. Idempotent: repeated calls keep
    /// the already-running tasks. Must be called within a Tokio runtime.
    pub fn initialize(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            tracing::debug!("choreographer already initialized");
            return;
        }
        let Some(startup) = self.startup.lock().take() else {
            return;
        };

        let handle = self.shutdown.handle();
        tasks.push(tokio::spawn(startup.timer.run(handle.clone())));
        tasks.push(tokio::spawn(startup.pipeline.run(handle)));
        tracing::info!(root = %self.graph.root_key(), "navigation choreographer started");
    }

    /// Subscribe to the command broadcast.
    pub fn commands(&self) -> mpsc::Receiver<Command> {
        self.commands.subscribe()
    }

    /// Watch the current node and stack depth.
    pub fn current_node(&self) -> watch::Receiver<CurrentNode> {
        self.current_rx.clone()
    }

    /// Control surface of the inactivity timer.
    pub fn timer(&self) -> &TimerHandle {
        &self.timer
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    /// Inject a system-originated intent directly into the local source.
    pub async fn inject(&self, intent: Intent) -> Result<(), crate::actor::ActorError> {
        self.local_tx
            .send(intent)
            .await
            .map_err(|_| crate::actor::ActorError::PipelineClosed)
    }

    /// Signal cancellation to the pipeline, the timer actor and any
    /// in-flight validator.
    pub fn shutdown(&self) {
        self.shutdown.signal();
    }

    /// Signal cancellation and wait for both tasks to finish.
    pub async fn shutdown_and_join(&self) {
        self.shutdown.signal();
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            let _ = task.await;
        }
    }
}

impl Drop for Choreographer {
    fn drop(&mut self) {
        self.shutdown.signal();
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

/// State owned by the pipeline task.
struct Pipeline {
    graph: Arc<NavGraph>,
    config: ChoreographerConfig,
    state: StateHandler,
    validators: CompositeValidator,
    transactions: TransactionManager,
    sources: StreamMap<&'static str, ReceiverStream<Intent>>,
    local_tx: mpsc::Sender<Intent>,
    commands: Arc<CommandBus>,
}

impl Pipeline {
    async fn run(mut self, shutdown: ShutdownHandle) {
        let mut debounce = DebounceDistinct::new(self.config.debounce_window);
        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                next = self.sources.next() => {
                    let Some((source, intent)) = next else {
                        // Every producer is gone.
                        break;
                    };
                    if !debounce.admit(&intent) {
                        tracing::trace!(
                            source,
                            intent = intent.label(),
                            "intent suppressed by debounce"
                        );
                        continue;
                    }
                    self.dispatch_with_retry(source, intent, &shutdown).await;
                }
            }
        }
        tracing::debug!("choreographer pipeline stopped");
    }

    async fn dispatch_with_retry(
        &mut self,
        source: &'static str,
        intent: Intent,
        shutdown: &ShutdownHandle,
    ) {
        let mut attempt = 0;
        loop {
            match self.dispatch(&intent, shutdown).await {
                Ok(()) => return,
                Err(err) if err.is_retryable() && attempt < self.config.max_intent_retries => {
                    attempt += 1;
                    tracing::warn!(
                        source,
                        intent = intent.label(),
                        attempt,
                        error = %err,
                        "retrying intent after inconsistent state"
                    );
                }
                Err(DispatchError::Transaction(TransactionError::NoTransaction)) => {
                    tracing::warn!(
                        source,
                        intent = intent.label(),
                        "no active transaction; dropping intent"
                    );
                    return;
                }
                Err(err) => {
                    tracing::error!(
                        source,
                        intent = intent.label(),
                        error = %err,
                        "dropping intent"
                    );
                    return;
                }
            }
        }
    }

    async fn dispatch(
        &mut self,
        intent: &Intent,
        shutdown: &ShutdownHandle,
    ) -> Result<(), DispatchError> {
        tracing::debug!(
            intent = intent.label(),
            sender = %intent.sender(),
            priority = intent.priority(),
            "dispatching intent"
        );

        match intent {
            Intent::NavigateTo { route, .. } => {
                let node = self
                    .graph
                    .lookup(route.key())
                    .ok_or(GraphError::RouteNotInGraph(route.key()))?
                    .clone();
                let verdict = self.validate(intent, &node, shutdown).await;
                self.apply(verdict, intent, Some(node)).await
            }
            Intent::PopUpTo { route, .. } => {
                if !self.state.pop_until(route.key()) {
                    return Ok(());
                }
                let node = self.state.current();
                let verdict = self.validate(intent, &node, shutdown).await;
                self.apply(verdict, intent, None).await
            }
            Intent::Back { .. } => {
                let node = self.state.pop();
                let verdict = self.validate(intent, &node, shutdown).await;
                let result = self.apply(verdict, intent, None).await;
                self.transactions.cancel();
                result
            }
            Intent::ClearBackStack { .. } | Intent::InteractionTimeout { .. } => {
                self.state.clear();
                let node = self.state.current();
                let verdict = self.validate(intent, &node, shutdown).await;
                let result = self.apply(verdict, intent, None).await;
                self.transactions.cancel();
                result
            }
            Intent::DisplayDialog { .. } | Intent::DismissOverlay { .. } => {
                let node = self.state.current();
                let verdict = self.validate(intent, &node, shutdown).await;
                self.apply(verdict, intent, None).await
            }
            Intent::CompleteNavTransaction { route } => self.advance_transaction(route).await,
        }
    }

    /// Evaluate the validation chain, bounded by the watchdog when one is
    /// configured.
    async fn validate(
        &self,
        intent: &Intent,
        node: &Arc<Node>,
        shutdown: &ShutdownHandle,
    ) -> Validation {
        let cx = ValidationCx::new(shutdown.clone());
        match self.config.validation_watchdog {
            Some(limit) => {
                match tokio::time::timeout(limit, self.validators.evaluate(intent, node, &cx))
                    .await
                {
                    Ok(verdict) => verdict,
                    Err(_) => {
                        tracing::warn!(
                            intent = intent.label(),
                            limit_ms = limit.as_millis() as u64,
                            "validator watchdog expired"
                        );
                        Validation::Invalid("validator_timeout".to_string())
                    }
                }
            }
            None => self.validators.evaluate(intent, node, &cx).await,
        }
    }

    /// Apply a validation verdict. `target` carries the already-resolved
    /// node for `NavigateTo` intents.
    async fn apply(
        &mut self,
        verdict: Validation,
        intent: &Intent,
        target: Option<Arc<Node>>,
    ) -> Result<(), DispatchError> {
        match verdict {
            Validation::Valid => {
                if let Intent::NavigateTo { options, .. } = intent {
                    let node = target.expect("navigate target is resolved before validation");
                    self.state.append(node, *options);
                }
                self.emit(intent).await;
                Ok(())
            }
            Validation::Ignore => {
                tracing::debug!(intent = intent.label(), "intent ignored by validation");
                Ok(())
            }
            Validation::Invalid(message) => {
                tracing::warn!(
                    intent = intent.label(),
                    reason = %message,
                    "intent rejected; surfacing error dialog"
                );
                let dialog = Intent::DisplayDialog {
                    overlay: Overlay::error("Navigation rejected", message),
                    sender: Sender::System,
                    priority: Sender::System.default_priority(),
                    dismiss_first: None,
                };
                self.inject(dialog).await;
                Ok(())
            }
            Validation::Redirect { original, chain } => {
                tracing::info!(
                    intent = intent.label(),
                    prefixes = chain.len(),
                    "redirecting through transaction"
                );
                self.transactions.cancel();
                self.transactions
                    .apply(Transaction::new(chain, *original))?;
                if self.transactions.active() {
                    if let Step::Continue(prefix) = self.transactions.next()? {
                        self.inject(prefix).await;
                    }
                }
                Ok(())
            }
        }
    }

    /// Advance the active transaction on `CompleteNavTransaction`.
    async fn advance_transaction(&mut self, completed: &Route) -> Result<(), DispatchError> {
        match self.transactions.next() {
            Ok(Step::Continue(prefix)) => {
                tracing::debug!(
                    completed = %completed,
                    next = prefix.label(),
                    "transaction continues with next prefix"
                );
                self.inject(prefix).await;
                Ok(())
            }
            Ok(Step::BackToOriginal(original)) => {
                tracing::debug!(
                    completed = %completed,
                    original = original.label(),
                    "transaction drained; executing original"
                );
                // The original already passed validation when it was
                // redirected; it is applied directly.
                if let Intent::NavigateTo {
                    route: target,
                    options,
                    ..
                } = &original
                {
                    let node = self
                        .graph
                        .lookup(target.key())
                        .ok_or(GraphError::RouteNotInGraph(target.key()))?
                        .clone();
                    self.state.append(node, *options);
                }
                self.emit(&original).await;
                Ok(())
            }
            Err(err) => {
                self.transactions.cancel();
                Err(err.into())
            }
        }
    }

    async fn emit(&self, intent: &Intent) {
        if let Some(command) = intent.command() {
            tracing::info!(command = command.label(), "emitting command");
            self.commands.send(command).await;
        }
    }

    /// Feed an intent back into the pipeline through the local source.
    async fn inject(&self, intent: Intent) {
        let label = intent.label();
        if self.local_tx.send(intent).await.is_err() {
            tracing::debug!(intent = label, "local source closed; dropping injected intent");
        }
    }
}
