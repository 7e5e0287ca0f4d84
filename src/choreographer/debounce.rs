//! Debounce-distinct admission for the merged intent stream.

use std::time::Duration;

use tokio::time::Instant;

use crate::intent::Intent;

/// Suppresses consecutive equal intents arriving within a time window.
///
/// The key is the intent itself under structural equality, and the window
/// is measured from the previous *admission*: suppressed duplicates do not
/// extend it, so a burst of equal intents admits the first and then one
/// more per elapsed window.
///
/// Uses [`tokio::time::Instant`] so a paused test clock drives admission.
pub(crate) struct DebounceDistinct {
    window: Duration,
    last: Option<(Intent, Instant)>,
}

impl DebounceDistinct {
    pub(crate) fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Whether `intent` passes the gate. Admission records the intent as
    /// the new comparison key.
    pub(crate) fn admit(&mut self, intent: &Intent) -> bool {
        let now = Instant::now();
        if let Some((last_intent, admitted_at)) = &self.last {
            if last_intent == intent && now.duration_since(*admitted_at) < self.window {
                return false;
            }
        }
        self.last = Some((intent.clone(), now));
        true
    }
}
