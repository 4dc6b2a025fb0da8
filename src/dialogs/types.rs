//! Core dialog types shared by the manager and both flows

use crate::page::{ElementId, PageError};
use serde::Serialize;
use std::fmt;

/// The two dialogs a page may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    /// Yes/no confirmation of a pending action
    Confirmation,
    /// Free-text prompt
    Input,
}

impl DialogKind {
    pub const ALL: [DialogKind; 2] = [DialogKind::Confirmation, DialogKind::Input];

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogKind::Confirmation => "confirmation",
            DialogKind::Input => "input",
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the input dialog does with the submitted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InputMode {
    /// Start a build of `repo_id` at the typed ref
    Navigate { repo_id: String },
    /// Hand the text to a registered callback, or back to the embedder
    /// when no callback is named
    Callback { name: Option<String> },
}

/// Result of handling a gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Opened(DialogKind),
    Cancelled(DialogKind),
    Navigated(String),
    FormSubmitted(ElementId),
    CallbackInvoked(String),
    /// Text submitted from a prompt that names no callback
    InputSubmitted(String),
    /// Navigate-mode submission with an empty field
    EmptyInputIgnored,
    /// A dialog button was pressed with nothing armed
    Idle,
}

/// Result type for dialog operations
pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Dialog-specific error types
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Cannot open the {requested} dialog while the {open} dialog is open")]
    AnotherDialogOpen {
        open: DialogKind,
        requested: DialogKind,
    },

    #[error("No callback registered under '{0}'")]
    UnknownCallback(String),

    #[error("Callback '{name}' failed: {source}")]
    Callback {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Confirmation caller {0} is neither a link nor a form button")]
    NoTerminalAction(ElementId),

    #[error("Page has no {0} dialog")]
    MissingDialog(DialogKind),

    #[error("Page error: {0}")]
    Page(#[from] PageError),
}
