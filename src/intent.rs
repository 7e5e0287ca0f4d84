//! The canonical navigation intent taxonomy.
//!
//! Intents are the unit of input to the choreographer pipeline. Every
//! producer (user actors, system actors, the inactivity timer, the local
//! retry source) speaks this vocabulary; the pipeline validates intents and
//! turns the surviving ones into [`Command`](crate::command::Command)s.
//!
//! Intents derive structural equality so the debounce-distinct stage can
//! compare consecutive arrivals directly.

use std::fmt;

use uuid::Uuid;

use crate::graph::Route;

/// Who produced an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    System,
}

impl Sender {
    /// The baseline priority for intents from this sender.
    pub const fn default_priority(self) -> u8 {
        match self {
            Sender::User => 1,
            Sender::System => 2,
        }
    }

    /// The elevated priority for intents from this sender.
    pub const fn high_priority(self) -> u8 {
        match self {
            Sender::User => 10,
            Sender::System => 20,
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => f.write_str("user"),
            Sender::System => f.write_str("system"),
        }
    }
}

/// How a destination is pushed onto the back-stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NavOptions {
    /// Suppress a consecutive duplicate at the top of the stack.
    pub single_top: bool,
    /// Push onto the retained history rather than the transient tier.
    pub add_to_back_stack: bool,
    /// Drop the entire stack before pushing.
    pub clear_back_stack: bool,
}

impl NavOptions {
    pub fn single_top(mut self, value: bool) -> Self {
        self.single_top = value;
        self
    }

    pub fn add_to_back_stack(mut self, value: bool) -> Self {
        self.add_to_back_stack = value;
        self
    }

    pub fn clear_back_stack(mut self, value: bool) -> Self {
        self.clear_back_stack = value;
        self
    }
}

/// Identity of a displayed overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogId(Uuid);

impl DialogId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual severity of an overlay, opaque to the core beyond its use in
/// synthesised error dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// An overlay payload handed through to the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Overlay {
    pub id: DialogId,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Overlay {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: DialogId::new(),
            severity,
            title: title.into(),
            message: message.into(),
        }
    }

    /// An error-severity overlay, as synthesised for rejected intents.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }
}

/// A request for a navigation effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Show a destination.
    NavigateTo {
        route: Route,
        options: NavOptions,
        sender: Sender,
        priority: u8,
    },
    /// Return to the previous destination.
    Back { sender: Sender, priority: u8 },
    /// Unwind the stack to a destination.
    PopUpTo {
        route: Route,
        inclusive: bool,
        sender: Sender,
        priority: u8,
    },
    /// Drop the history back to the root.
    ClearBackStack { sender: Sender, priority: u8 },
    /// The inactivity timer elapsed; handled like a system stack clear.
    InteractionTimeout { priority: u8 },
    /// Show an overlay, optionally dismissing a previous one first.
    DisplayDialog {
        overlay: Overlay,
        sender: Sender,
        priority: u8,
        dismiss_first: Option<DialogId>,
    },
    /// Dismiss a displayed overlay.
    DismissOverlay {
        dialog_id: DialogId,
        sender: Sender,
        priority: u8,
    },
    /// The view layer finished executing a command belonging to the active
    /// redirect transaction.
    CompleteNavTransaction { route: Route },
}

impl Intent {
    pub fn sender(&self) -> Sender {
        match self {
            Intent::NavigateTo { sender, .. }
            | Intent::Back { sender, .. }
            | Intent::PopUpTo { sender, .. }
            | Intent::ClearBackStack { sender, .. }
            | Intent::DisplayDialog { sender, .. }
            | Intent::DismissOverlay { sender, .. } => *sender,
            Intent::InteractionTimeout { .. } | Intent::CompleteNavTransaction { .. } => {
                Sender::System
            }
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            Intent::NavigateTo { priority, .. }
            | Intent::Back { priority, .. }
            | Intent::PopUpTo { priority, .. }
            | Intent::ClearBackStack { priority, .. }
            | Intent::InteractionTimeout { priority }
            | Intent::DisplayDialog { priority, .. }
            | Intent::DismissOverlay { priority, .. } => *priority,
            Intent::CompleteNavTransaction { .. } => 0,
        }
    }

    /// Short variant name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::NavigateTo { .. } => "navigate_to",
            Intent::Back { .. } => "back",
            Intent::PopUpTo { .. } => "pop_up_to",
            Intent::ClearBackStack { .. } => "clear_back_stack",
            Intent::InteractionTimeout { .. } => "interaction_timeout",
            Intent::DisplayDialog { .. } => "display_dialog",
            Intent::DismissOverlay { .. } => "dismiss_overlay",
            Intent::CompleteNavTransaction { .. } => "complete_nav_transaction",
        }
    }

    /// The view-side command this intent turns into once validated.
    ///
    /// `CompleteNavTransaction` is pipeline-internal and has no command
    /// form; a timed-out screen is left via a stack clear.
    pub fn command(&self) -> Option<crate::command::Command> {
        use crate::command::Command;
        match self {
            Intent::NavigateTo { route, options, .. } => Some(Command::NavigateTo {
                route: route.clone(),
                options: *options,
            }),
            Intent::Back { .. } => Some(Command::Back),
            Intent::PopUpTo {
                route, inclusive, ..
            } => Some(Command::PopUpTo {
                route: route.clone(),
                inclusive: *inclusive,
            }),
            Intent::ClearBackStack { .. } | Intent::InteractionTimeout { .. } => {
                Some(Command::ClearBackStack)
            }
            Intent::DisplayDialog {
                overlay,
                dismiss_first,
                ..
            } => Some(Command::Dialog {
                overlay: overlay.clone(),
                dismiss_first: *dismiss_first,
            }),
            Intent::DismissOverlay { dialog_id, .. } => Some(Command::DismissDialog {
                dialog_id: *dialog_id,
            }),
            Intent::CompleteNavTransaction { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::graph::RouteKey;

    fn route() -> Route {
        Route::new(RouteKey::new("a"))
    }

    #[test]
    fn priority_defaults_match_contract() {
        assert_eq!(Sender::User.default_priority(), 1);
        assert_eq!(Sender::User.high_priority(), 10);
        assert_eq!(Sender::System.default_priority(), 2);
        assert_eq!(Sender::System.high_priority(), 20);
    }

    #[test]
    fn timeout_and_complete_are_system_intents() {
        let timeout = Intent::InteractionTimeout { priority: 2 };
        assert_eq!(timeout.sender(), Sender::System);

        let complete = Intent::CompleteNavTransaction { route: route() };
        assert_eq!(complete.sender(), Sender::System);
        assert_eq!(complete.priority(), 0);
    }

    #[test]
    fn command_mapping_is_one_to_one() {
        let nav = Intent::NavigateTo {
            route: route(),
            options: NavOptions::default().single_top(true),
            sender: Sender::User,
            priority: 1,
        };
        assert!(matches!(
            nav.command(),
            Some(Command::NavigateTo { options, .. }) if options.single_top
        ));

        let timeout = Intent::InteractionTimeout { priority: 2 };
        assert_eq!(timeout.command(), Some(Command::ClearBackStack));

        let complete = Intent::CompleteNavTransaction { route: route() };
        assert_eq!(complete.command(), None);
    }

    #[test]
    fn identical_payloads_compare_equal() {
        let a = Intent::Back {
            sender: Sender::User,
            priority: 1,
        };
        let b = Intent::Back {
            sender: Sender::User,
            priority: 1,
        };
        assert_eq!(a, b);
    }
}
