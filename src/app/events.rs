//! Page events and the result of dispatching them

use serde::Serialize;

use crate::dialogs::{Key, Outcome};
use crate::page::ElementId;

/// User gestures delivered to the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// An element was clicked
    Click { target: ElementId },

    /// A key went down while `target` had focus
    KeyDown { target: ElementId, key: Key },

    /// The user typed into a field, leaving `value` in it
    Input { target: ElementId, value: String },

    /// A field's value was committed (file chosen, select changed)
    Change { target: ElementId },
}

impl PageEvent {
    pub fn target(&self) -> ElementId {
        match self {
            PageEvent::Click { target }
            | PageEvent::KeyDown { target, .. }
            | PageEvent::Input { target, .. }
            | PageEvent::Change { target } => *target,
        }
    }
}

/// What happened while handling one event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dispatch {
    /// A handler suppressed the browser's default action
    pub default_prevented: bool,

    /// A handler kept the event from reaching the document
    pub propagation_stopped: bool,

    /// Result of the dialog or widget handler that ran, if any
    pub outcome: Option<Outcome>,
}

impl Dispatch {
    /// A handler consumed the event entirely
    pub fn handled(outcome: Option<Outcome>) -> Self {
        Self {
            default_prevented: true,
            propagation_stopped: true,
            outcome,
        }
    }

    pub fn unhandled() -> Self {
        Self::default()
    }
}
