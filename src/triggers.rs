//! Trigger scanning
//!
//! Elements open dialogs through data attributes written by the page
//! templates:
//!
//! | Convention | Required | Optional |
//! |---|---|---|
//! | `[data-confirmation]` | message | |
//! | `#action-new-build` | `data-repository` | |
//! | `[data-input]` | prompt | `data-input-value`, `data-input-callback` |
//!
//! Scanning only reads the page. Binding the result is up to the caller,
//! which keys bindings by element so a rescan cannot double-bind.

use crate::dialogs::{DialogKind, InputMode};
use crate::page::{ElementId, Page, PageResult};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const CONFIRMATION_ATTR: &str = "data-confirmation";
pub const NEW_BUILD_SELECTOR: &str = "#action-new-build";
pub const REPOSITORY_ATTR: &str = "data-repository";
pub const INPUT_ATTR: &str = "data-input";
pub const INPUT_VALUE_ATTR: &str = "data-input-value";
pub const INPUT_CALLBACK_ATTR: &str = "data-input-callback";

/// Dialog configuration read from a trigger element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum Trigger {
    /// Ask before following a link or submitting a form
    Confirm { message: String },
    /// Prompt for a Git ref and start a build
    NewBuild { repo_id: String },
    /// Prompt for text and hand it to a callback
    Input {
        message: String,
        prefill: Option<String>,
        callback: Option<String>,
    },
}

impl Trigger {
    pub fn dialog(&self) -> DialogKind {
        match self {
            Trigger::Confirm { .. } => DialogKind::Confirmation,
            Trigger::NewBuild { .. } | Trigger::Input { .. } => DialogKind::Input,
        }
    }

    /// Input mode for triggers that open the input dialog
    pub fn input_mode(&self) -> Option<InputMode> {
        match self {
            Trigger::Confirm { .. } => None,
            Trigger::NewBuild { repo_id } => Some(InputMode::Navigate {
                repo_id: repo_id.clone(),
            }),
            Trigger::Input { callback, .. } => Some(InputMode::Callback {
                name: callback.clone(),
            }),
        }
    }
}

/// Finds trigger elements on a page
pub struct TriggerScanner;

impl TriggerScanner {
    /// Every trigger on `page`, keyed by element. When an element matches
    /// more than one convention, the first in the table above wins.
    pub fn scan(page: &Page) -> PageResult<BTreeMap<ElementId, Trigger>> {
        let mut triggers = BTreeMap::new();

        for id in page.select(&attr_selector(CONFIRMATION_ATTR))? {
            let message = page.attr(id, CONFIRMATION_ATTR).unwrap_or_default();
            triggers.insert(id, Trigger::Confirm { message: message.to_string() });
        }

        for id in page.select(NEW_BUILD_SELECTOR)? {
            let Some(repo_id) = page.attr(id, REPOSITORY_ATTR).filter(|r| !r.is_empty()) else {
                warn!("New build trigger {} has no {}", id, REPOSITORY_ATTR);
                continue;
            };
            insert(&mut triggers, id, Trigger::NewBuild { repo_id: repo_id.to_string() });
        }

        for id in page.select(&attr_selector(INPUT_ATTR))? {
            let trigger = Trigger::Input {
                message: page.attr(id, INPUT_ATTR).unwrap_or_default().to_string(),
                prefill: non_empty(page.attr(id, INPUT_VALUE_ATTR)),
                callback: non_empty(page.attr(id, INPUT_CALLBACK_ATTR)),
            };
            insert(&mut triggers, id, trigger);
        }

        debug!("Found {} triggers", triggers.len());
        Ok(triggers)
    }
}

fn insert(triggers: &mut BTreeMap<ElementId, Trigger>, id: ElementId, trigger: Trigger) {
    if let Some(existing) = triggers.get(&id) {
        warn!(
            "Element {} already opens the {} dialog, ignoring {:?}",
            id,
            existing.dialog(),
            trigger
        );
        return;
    }
    triggers.insert(id, trigger);
}

fn attr_selector(attr: &str) -> String {
    format!("[{attr}]")
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
