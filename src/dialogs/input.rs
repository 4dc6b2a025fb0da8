//! Free-text input dialog flow
//!
//! The dialog either starts a build at the typed Git ref (navigate mode) or
//! hands the text to a registered callback. OK, Cancel and their keyboard
//! shortcuts all go through [`InputFlow::on_ok`] and [`InputFlow::on_cancel`].

use super::keys::{InputAction, InputKeyMap, Key};
use super::manager::{DialogManager, INPUT_DIALOG};
use super::registry::CallbackRegistry;
use super::slot::HandlerSlot;
use super::types::{DialogError, DialogKind, DialogResult, InputMode, Outcome};
use crate::config::Config;
use crate::page::{ElementId, Page, PageResult};
use tracing::{debug, error, info};

const MESSAGE: &str = "#input-dialog .input-message";
const FIELD: &str = "#input-dialog .input-text";
const OK: &str = "#input-dialog .input-ok";
const CANCEL: &str = "#input-dialog .input-cancel";

/// The prompt waiting for text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    pub caller: ElementId,
    pub mode: InputMode,
}

/// Drives the text prompt
#[derive(Debug)]
pub struct InputFlow {
    message: ElementId,
    field: ElementId,
    ok: ElementId,
    cancel: ElementId,
    pending: HandlerSlot<PendingInput>,
    keys: InputKeyMap,
    build_path: String,
    select_prefill: bool,
}

impl InputFlow {
    /// Bind to the input dialog of `page`, if it has one
    pub fn attach(page: &Page, config: &Config) -> PageResult<Option<Self>> {
        if page.select_first(INPUT_DIALOG)?.is_none() {
            return Ok(None);
        }

        Ok(Some(Self {
            message: page.require(MESSAGE)?,
            field: page.require(FIELD)?,
            ok: page.require(OK)?,
            cancel: page.require(CANCEL)?,
            pending: HandlerSlot::new(),
            keys: InputKeyMap::default(),
            build_path: config.build_path.clone(),
            select_prefill: config.select_prefill,
        }))
    }

    pub fn field(&self) -> ElementId {
        self.field
    }

    pub fn ok_button(&self) -> ElementId {
        self.ok
    }

    pub fn cancel_button(&self) -> ElementId {
        self.cancel
    }

    pub fn pending(&self) -> Option<&PendingInput> {
        self.pending.current()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_armed()
    }

    /// Prompt with `message` on behalf of `caller`, replacing any prompt
    /// armed earlier, and focus the text field. The field starts from
    /// `prefill`, or empty, never from an earlier prompt's text.
    pub fn configure_and_open(
        &mut self,
        page: &mut Page,
        manager: &mut DialogManager,
        caller: ElementId,
        message: &str,
        prefill: Option<&str>,
        mode: InputMode,
    ) -> DialogResult<Outcome> {
        manager.ensure_can_open(DialogKind::Input)?;

        page.set_text(self.message, message);
        let prefill = prefill.unwrap_or_default();
        page.set_value(self.field, prefill);
        if !prefill.is_empty() && self.select_prefill {
            page.select_all(self.field);
        }

        if let Some(previous) = self.pending.arm(PendingInput { caller, mode }) {
            debug!("Discarding unsubmitted prompt of {}", previous.caller);
        }
        if !manager.is_visible(DialogKind::Input) {
            manager.toggle_dialog(page, DialogKind::Input)?;
        }
        page.focus(self.field);

        Ok(Outcome::Opened(DialogKind::Input))
    }

    /// "Cancel": clear the field, forget the prompt, close
    pub fn on_cancel(&mut self, page: &mut Page, manager: &mut DialogManager) -> Outcome {
        page.set_value(self.field, "");
        self.pending.clear();
        manager.close_dialog(page, DialogKind::Input);
        Outcome::Cancelled(DialogKind::Input)
    }

    /// "OK": close, consume the field, then run the armed prompt's action
    pub fn on_ok(
        &mut self,
        page: &mut Page,
        manager: &mut DialogManager,
        registry: &mut CallbackRegistry,
    ) -> DialogResult<Outcome> {
        let pending = self.pending.take();
        manager.close_dialog(page, DialogKind::Input);

        let text = page.value(self.field).to_string();
        page.set_value(self.field, "");

        let Some(PendingInput { mode, .. }) = pending else {
            return Ok(Outcome::Idle);
        };

        match mode {
            InputMode::Navigate { repo_id } => {
                if text.is_empty() {
                    debug!("Empty ref submitted, not starting a build");
                    return Ok(Outcome::EmptyInputIgnored);
                }
                let url = self.build_url(&repo_id, &text);
                page.navigate(&url);
                Ok(Outcome::Navigated(url))
            }
            InputMode::Callback { name: Some(name) } => match registry.invoke(&name, &text) {
                Ok(()) => {
                    info!("Callback '{}' received input", name);
                    Ok(Outcome::CallbackInvoked(name))
                }
                Err(err) => {
                    error!("Input submission failed: {}", err);
                    page.report_error(&err.to_string());
                    Err(err)
                }
            },
            InputMode::Callback { name: None } => Ok(Outcome::InputSubmitted(text)),
        }
    }

    /// Enter and Escape on the focused field act like OK and Cancel.
    /// Returns `None` for keys without a shortcut.
    pub fn on_key(
        &mut self,
        page: &mut Page,
        manager: &mut DialogManager,
        registry: &mut CallbackRegistry,
        key: &Key,
    ) -> DialogResult<Option<Outcome>> {
        match self.keys.action(key) {
            Some(InputAction::Submit) => self.on_ok(page, manager, registry).map(Some),
            Some(InputAction::Dismiss) => Ok(Some(self.on_cancel(page, manager))),
            None => Ok(None),
        }
    }

    /// `<build_path>?repo_id=<id>&ref=<text>` with both values encoded
    pub fn build_url(&self, repo_id: &str, git_ref: &str) -> String {
        format!(
            "{}?repo_id={}&ref={}",
            self.build_path,
            urlencoding::encode(repo_id),
            urlencoding::encode(git_ref)
        )
    }
}
