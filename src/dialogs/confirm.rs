//! Confirmation dialog flow
//!
//! Idle → Armed on [`ConfirmationFlow::configure_and_open`], then back to Idle
//! through "yes" (fires the caller's action) or "no" (discards it).

use super::manager::{DialogManager, CONFIRM_DIALOG};
use super::slot::HandlerSlot;
use super::types::{DialogError, DialogKind, DialogResult, Outcome};
use crate::page::{ElementId, Page, PageResult};
use tracing::{debug, error};

const MESSAGE: &str = "#confirm-dialog .confirm-message";
const YES: &str = "#confirm-dialog .confirm-yes";
const NO: &str = "#confirm-dialog .confirm-no";

/// The element whose action waits for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAction {
    pub caller: ElementId,
}

/// Drives the yes/no dialog
#[derive(Debug)]
pub struct ConfirmationFlow {
    message: ElementId,
    yes: ElementId,
    no: ElementId,
    pending: HandlerSlot<PendingAction>,
}

impl ConfirmationFlow {
    /// Bind to the confirmation dialog of `page`, if it has one
    pub fn attach(page: &Page) -> PageResult<Option<Self>> {
        if page.select_first(CONFIRM_DIALOG)?.is_none() {
            return Ok(None);
        }

        Ok(Some(Self {
            message: page.require(MESSAGE)?,
            yes: page.require(YES)?,
            no: page.require(NO)?,
            pending: HandlerSlot::new(),
        }))
    }

    pub fn yes_button(&self) -> ElementId {
        self.yes
    }

    pub fn no_button(&self) -> ElementId {
        self.no
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.current()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_armed()
    }

    /// Show `message` and wait for the user to confirm `caller`'s action.
    /// An action armed earlier is discarded without firing.
    pub fn configure_and_open(
        &mut self,
        page: &mut Page,
        manager: &mut DialogManager,
        caller: ElementId,
        message: &str,
    ) -> DialogResult<Outcome> {
        manager.ensure_can_open(DialogKind::Confirmation)?;

        page.set_text(self.message, message);
        if let Some(previous) = self.pending.arm(PendingAction { caller }) {
            debug!("Discarding unconfirmed action of {}", previous.caller);
        }
        if !manager.is_visible(DialogKind::Confirmation) {
            manager.toggle_dialog(page, DialogKind::Confirmation)?;
        }

        Ok(Outcome::Opened(DialogKind::Confirmation))
    }

    /// "Yes": close, then run the armed caller's action exactly once
    pub fn on_yes(&mut self, page: &mut Page, manager: &mut DialogManager) -> DialogResult<Outcome> {
        let pending = self.pending.take();
        manager.close_dialog(page, DialogKind::Confirmation);

        match pending {
            Some(PendingAction { caller }) => perform(page, caller),
            None => Ok(Outcome::Idle),
        }
    }

    /// "No": close and forget the armed action
    pub fn on_no(&mut self, page: &mut Page, manager: &mut DialogManager) -> Outcome {
        if let Some(discarded) = self.pending.take() {
            debug!("Confirmation declined for {}", discarded.caller);
        }
        manager.close_dialog(page, DialogKind::Confirmation);
        Outcome::Cancelled(DialogKind::Confirmation)
    }
}

/// Follow a link, or submit the form a button belongs to
fn perform(page: &mut Page, caller: ElementId) -> DialogResult<Outcome> {
    if let Some(href) = page.attr(caller, "href").map(str::to_string) {
        page.navigate(&href);
        return Ok(Outcome::Navigated(href));
    }

    if page.tag(caller) == Some("button") {
        if let Some(form) = owning_form(page, caller)? {
            page.submit_form(form);
            return Ok(Outcome::FormSubmitted(form));
        }
    }

    error!("Confirmed element {} has no link target and no form", caller);
    Err(DialogError::NoTerminalAction(caller))
}

/// The form named by the `form` attribute, else the enclosing form
fn owning_form(page: &Page, button: ElementId) -> PageResult<Option<ElementId>> {
    if let Some(form) = page
        .attr(button, "form")
        .and_then(|dom_id| page.by_id(dom_id))
        .filter(|&form| page.tag(form) == Some("form"))
    {
        return Ok(Some(form));
    }
    page.closest(button, "form")
}
