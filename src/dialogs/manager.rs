//! Dialog state controller
//!
//! The manager is the only owner of dialog visibility and of the page-wide
//! inert state. Flows never touch either directly; they go through
//! [`DialogManager::open_dialog`], [`DialogManager::close_dialog`] and
//! [`DialogManager::toggle_dialog`].
//!
//! # Invariants
//!
//! - At most one dialog is visible. Opening the other kind while one is open
//!   is rejected with [`DialogError::AnotherDialogOpen`].
//! - A dialog and its overlay are shown and hidden together.
//! - The page is inert (inert regions carry the blur class) iff a dialog is
//!   visible.

use super::types::{DialogError, DialogKind, DialogResult};
use crate::config::Config;
use crate::page::{ElementId, Page, PageResult};
use tracing::debug;

pub const CONFIRM_DIALOG: &str = "#confirm-dialog";
pub const CONFIRM_OVERLAY: &str = "#confirm-overlay";
pub const INPUT_DIALOG: &str = "#input-dialog";
pub const INPUT_OVERLAY: &str = "#input-overlay";

/// The box and overlay making up one dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogElements {
    pub dialog: ElementId,
    pub overlay: ElementId,
}

impl DialogElements {
    /// Resolve a dialog by selector. A page without the dialog box yields
    /// `None`; a dialog box without its overlay is an error.
    fn resolve(page: &Page, dialog: &str, overlay: &str) -> PageResult<Option<Self>> {
        let Some(dialog) = page.select_first(dialog)? else {
            return Ok(None);
        };
        let overlay = page.require(overlay)?;
        Ok(Some(Self { dialog, overlay }))
    }
}

/// Owns dialog visibility and the inert state of the page
#[derive(Debug)]
pub struct DialogManager {
    confirmation: Option<DialogElements>,
    input: Option<DialogElements>,
    /// Regions blurred while a dialog is open
    inert_regions: Vec<ElementId>,
    blur_class: String,
    /// The dialog currently shown, if any
    visible: Option<DialogKind>,
}

impl DialogManager {
    /// Find the dialogs on `page` and put them in their hidden initial state
    pub fn attach(page: &mut Page, config: &Config) -> PageResult<Self> {
        let confirmation = DialogElements::resolve(page, CONFIRM_DIALOG, CONFIRM_OVERLAY)?;
        let input = DialogElements::resolve(page, INPUT_DIALOG, INPUT_OVERLAY)?;

        let mut inert_regions = Vec::new();
        for region in &config.inert_regions {
            inert_regions.extend(page.select(region)?);
        }

        let manager = Self {
            confirmation,
            input,
            inert_regions,
            blur_class: config.blur_class.clone(),
            visible: None,
        };
        manager.apply(page);

        debug!(
            "Dialog manager attached (confirmation: {}, input: {}, {} inert regions)",
            manager.confirmation.is_some(),
            manager.input.is_some(),
            manager.inert_regions.len()
        );
        Ok(manager)
    }

    pub fn elements(&self, kind: DialogKind) -> Option<DialogElements> {
        match kind {
            DialogKind::Confirmation => self.confirmation,
            DialogKind::Input => self.input,
        }
    }

    pub fn has_dialog(&self, kind: DialogKind) -> bool {
        self.elements(kind).is_some()
    }

    pub fn is_visible(&self, kind: DialogKind) -> bool {
        self.visible == Some(kind)
    }

    pub fn visible_dialog(&self) -> Option<DialogKind> {
        self.visible
    }

    pub fn is_inert(&self) -> bool {
        self.visible.is_some()
    }

    /// Check that `kind` exists and could be opened now
    pub fn ensure_can_open(&self, kind: DialogKind) -> DialogResult<()> {
        if !self.has_dialog(kind) {
            return Err(DialogError::MissingDialog(kind));
        }
        match self.visible {
            Some(open) if open != kind => Err(DialogError::AnotherDialogOpen {
                open,
                requested: kind,
            }),
            _ => Ok(()),
        }
    }

    /// Show `kind` and make the rest of the page inert
    pub fn open_dialog(&mut self, page: &mut Page, kind: DialogKind) -> DialogResult<()> {
        self.ensure_can_open(kind)?;
        if self.visible == Some(kind) {
            return Ok(());
        }

        self.visible = Some(kind);
        self.apply(page);
        debug!("Opened {} dialog", kind);
        Ok(())
    }

    /// Hide `kind`; no-op when it is not the visible dialog
    pub fn close_dialog(&mut self, page: &mut Page, kind: DialogKind) {
        if self.visible != Some(kind) {
            return;
        }

        self.visible = None;
        self.apply(page);
        debug!("Closed {} dialog", kind);
    }

    /// Close `kind` when visible, open it otherwise. Returns whether it is
    /// now open.
    pub fn toggle_dialog(&mut self, page: &mut Page, kind: DialogKind) -> DialogResult<bool> {
        if self.is_visible(kind) {
            self.close_dialog(page, kind);
            Ok(false)
        } else {
            self.open_dialog(page, kind)?;
            Ok(true)
        }
    }

    /// Project the state onto the page
    fn apply(&self, page: &mut Page) {
        for kind in DialogKind::ALL {
            if let Some(elements) = self.elements(kind) {
                let shown = self.is_visible(kind);
                page.set_visible(elements.dialog, shown);
                page.set_visible(elements.overlay, shown);
            }
        }

        for &region in &self.inert_regions {
            if self.is_inert() {
                page.add_class(region, &self.blur_class);
            } else {
                page.remove_class(region, &self.blur_class);
            }
        }
    }
}
