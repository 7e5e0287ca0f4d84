//! Choreographer tunables.

use std::time::Duration;

/// Configuration of the intent pipeline. Constructed programmatically by
/// the embedding application; every field has a sensible default.
#[derive(Debug, Clone)]
pub struct ChoreographerConfig {
    /// Window within which consecutive equal intents are suppressed.
    pub debounce_window: Duration,
    /// How many times an inconsistent-state dispatch error is retried
    /// before the intent is dropped.
    pub max_intent_retries: u32,
    /// Inactivity timeout for screens that do not specify their own.
    pub default_screen_timeout: Duration,
    /// Per-subscriber buffer of the command broadcast.
    pub command_buffer_capacity: usize,
    /// Capacity of the local source used for retries, redirect prefixes
    /// and synthesised dialogs.
    pub local_source_capacity: usize,
    /// Capacity of each registered actor's intent channel.
    pub actor_channel_capacity: usize,
    /// When set, a validator chain running longer than this is aborted and
    /// treated as `Invalid("validator_timeout")`.
    pub validation_watchdog: Option<Duration>,
}

impl Default for ChoreographerConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(70),
            max_intent_retries: 3,
            default_screen_timeout: Duration::from_secs(300),
            command_buffer_capacity: 64,
            local_source_capacity: 16,
            actor_channel_capacity: 32,
            validation_watchdog: None,
        }
    }
}
