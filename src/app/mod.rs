//! Page wiring and event dispatch
//!
//! [`App`] is the page's single event loop: it owns the document, the dialog
//! manager, both flows, the callback registry and every binding made at
//! initialization. Events are handled one at a time to completion.

mod events;

pub use events::*;

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::config::Config;
use crate::dialogs::{
    CallbackRegistry, ConfirmationFlow, DialogError, DialogKind, DialogManager, DialogResult,
    InputFlow, Key, Outcome,
};
use crate::page::{Element, ElementId, Page};
use crate::triggers::{Trigger, TriggerScanner};
use crate::widgets::Widgets;

/// Static click bindings
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Trigger(Trigger),
    ConfirmYes,
    ConfirmNo,
    InputOk,
    InputCancel,
}

/// Main application structure
pub struct App {
    page: Page,
    config: Config,
    manager: DialogManager,
    confirmation: Option<ConfirmationFlow>,
    input: Option<InputFlow>,
    registry: CallbackRegistry,
    bindings: HashMap<ElementId, Binding>,
    widgets: Widgets,
}

impl App {
    /// Attach to `page`: hide the dialogs, then scan and bind triggers and
    /// widgets once
    pub fn new(mut page: Page, config: Config, registry: CallbackRegistry) -> DialogResult<Self> {
        debug!("Creating new App instance");

        let manager = DialogManager::attach(&mut page, &config)?;
        let confirmation = ConfirmationFlow::attach(&page)?;
        let input = InputFlow::attach(&page, &config)?;
        let widgets = Widgets::scan(&page)?;

        let mut app = Self {
            page,
            config,
            manager,
            confirmation,
            input,
            registry,
            bindings: HashMap::new(),
            widgets,
        };
        app.bind()?;
        Ok(app)
    }

    /// Rebuild every binding from the page. Bindings are keyed by element,
    /// so scanning again never binds an element twice.
    pub fn rescan(&mut self) -> DialogResult<usize> {
        self.widgets = Widgets::scan(&self.page)?;
        self.bind()
    }

    fn bind(&mut self) -> DialogResult<usize> {
        let mut bindings = HashMap::new();

        for (element, trigger) in TriggerScanner::scan(&self.page)? {
            let kind = trigger.dialog();
            if !self.manager.has_dialog(kind) {
                warn!("Trigger {} needs the {} dialog, which the page lacks", element, kind);
                continue;
            }
            bindings.insert(element, Binding::Trigger(trigger));
        }

        if let Some(flow) = &self.confirmation {
            bindings.insert(flow.yes_button(), Binding::ConfirmYes);
            bindings.insert(flow.no_button(), Binding::ConfirmNo);
        }
        if let Some(flow) = &self.input {
            bindings.insert(flow.ok_button(), Binding::InputOk);
            bindings.insert(flow.cancel_button(), Binding::InputCancel);
        }

        let triggers = bindings
            .values()
            .filter(|binding| matches!(binding, Binding::Trigger(_)))
            .count();
        debug!("Bound {} triggers and {} widgets", triggers, self.widgets.len());

        self.bindings = bindings;
        Ok(triggers)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &DialogManager {
        &self.manager
    }

    pub fn confirmation(&self) -> Option<&ConfirmationFlow> {
        self.confirmation.as_ref()
    }

    pub fn input(&self) -> Option<&InputFlow> {
        self.input.as_ref()
    }

    pub fn registry_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.registry
    }

    pub fn widgets(&self) -> &Widgets {
        &self.widgets
    }

    /// Bound triggers in document order
    pub fn triggers(&self) -> BTreeMap<ElementId, &Trigger> {
        self.bindings
            .iter()
            .filter_map(|(&element, binding)| match binding {
                Binding::Trigger(trigger) => Some((element, trigger)),
                _ => None,
            })
            .collect()
    }

    /// Handle one event to completion. Errors are returned after the
    /// dialog involved has been closed and its armed handler dropped.
    pub fn dispatch(&mut self, event: PageEvent) -> DialogResult<Dispatch> {
        debug!("Dispatching {:?}", event);

        match event {
            PageEvent::Click { target } => self.click(target),
            PageEvent::KeyDown { target, key } => self.key_down(target, &key),
            PageEvent::Input { target, value } => {
                self.page.set_value(target, &value);
                Ok(Dispatch::unhandled())
            }
            PageEvent::Change { target } => match self.widgets.on_change(target) {
                Some(widget) => {
                    widget.activate(&mut self.page);
                    Ok(Dispatch::handled(None))
                }
                None => Ok(Dispatch::unhandled()),
            },
        }
    }

    /// Clicks bubble from `target` up to the first element with a handler,
    /// which stops propagation. Every element reached on the way that is
    /// not a dropdown button closes the dropdown menus.
    fn click(&mut self, target: ElementId) -> DialogResult<Dispatch> {
        let mut current = Some(target);

        while let Some(element) = current {
            if !self.widgets.is_dropdown(element) {
                self.widgets.dismiss_menus(&mut self.page);
            }

            if let Some(binding) = self.bindings.get(&element).cloned() {
                if element != target {
                    debug!("Click on {} handled by {}", target, element);
                }
                return Ok(Dispatch::handled(Some(self.run(element, binding)?)));
            }

            if let Some(widget) = self.widgets.on_click(element) {
                widget.activate(&mut self.page);
                return Ok(Dispatch::handled(None));
            }

            current = self.page.element(element).and_then(Element::parent);
        }

        Ok(Dispatch::unhandled())
    }

    fn run(&mut self, target: ElementId, binding: Binding) -> DialogResult<Outcome> {
        match binding {
            Binding::Trigger(trigger) => self.activate(target, trigger),
            button => self.respond(button),
        }
    }

    /// Dialog button clicks
    fn respond(&mut self, binding: Binding) -> DialogResult<Outcome> {
        let page = &mut self.page;
        let manager = &mut self.manager;

        match binding {
            Binding::Trigger(_) => Ok(Outcome::Idle),
            Binding::ConfirmYes => match self.confirmation.as_mut() {
                Some(flow) => flow.on_yes(page, manager),
                None => Err(DialogError::MissingDialog(DialogKind::Confirmation)),
            },
            Binding::ConfirmNo => match self.confirmation.as_mut() {
                Some(flow) => Ok(flow.on_no(page, manager)),
                None => Err(DialogError::MissingDialog(DialogKind::Confirmation)),
            },
            Binding::InputOk => match self.input.as_mut() {
                Some(flow) => flow.on_ok(page, manager, &mut self.registry),
                None => Err(DialogError::MissingDialog(DialogKind::Input)),
            },
            Binding::InputCancel => match self.input.as_mut() {
                Some(flow) => Ok(flow.on_cancel(page, manager)),
                None => Err(DialogError::MissingDialog(DialogKind::Input)),
            },
        }
    }

    fn activate(&mut self, caller: ElementId, trigger: Trigger) -> DialogResult<Outcome> {
        let mode = trigger.input_mode();
        let page = &mut self.page;
        let manager = &mut self.manager;

        let result = match (trigger, mode) {
            (Trigger::Confirm { message }, _) => match self.confirmation.as_mut() {
                Some(flow) => flow.configure_and_open(page, manager, caller, &message),
                None => Err(DialogError::MissingDialog(DialogKind::Confirmation)),
            },
            (Trigger::NewBuild { .. }, Some(mode)) => match self.input.as_mut() {
                Some(flow) => {
                    let prompt = self.config.new_build_prompt.as_str();
                    flow.configure_and_open(page, manager, caller, prompt, None, mode)
                }
                None => Err(DialogError::MissingDialog(DialogKind::Input)),
            },
            (Trigger::Input { message, prefill, .. }, Some(mode)) => match self.input.as_mut() {
                Some(flow) => flow.configure_and_open(
                    page,
                    manager,
                    caller,
                    &message,
                    prefill.as_deref(),
                    mode,
                ),
                None => Err(DialogError::MissingDialog(DialogKind::Input)),
            },
            (trigger, None) => {
                warn!("Trigger {:?} has no input mode", trigger);
                Ok(Outcome::Idle)
            }
        };

        if let Err(err) = &result {
            warn!("Trigger {} rejected: {}", caller, err);
        }
        result
    }

    fn key_down(&mut self, target: ElementId, key: &Key) -> DialogResult<Dispatch> {
        let Some(flow) = self.input.as_mut() else {
            return Ok(Dispatch::unhandled());
        };
        if target != flow.field() || !self.manager.is_visible(DialogKind::Input) {
            return Ok(Dispatch::unhandled());
        }

        match flow.on_key(&mut self.page, &mut self.manager, &mut self.registry, key)? {
            Some(outcome) => Ok(Dispatch::handled(Some(outcome))),
            None => Ok(Dispatch::unhandled()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{app, PAGE};
    use crate::page::Effect;

    fn click(app: &mut App, dom_id: &str) -> DialogResult<Dispatch> {
        let target = app.page().by_id(dom_id).unwrap();
        app.dispatch(PageEvent::Click { target })
    }

    fn type_text(app: &mut App, value: &str) {
        let target = app.input().unwrap().field();
        app.dispatch(PageEvent::Input {
            target,
            value: value.to_string(),
        })
        .unwrap();
    }

    fn press(app: &mut App, key: Key) -> DialogResult<Dispatch> {
        let target = app.input().unwrap().field();
        app.dispatch(PageEvent::KeyDown { target, key })
    }

    #[test]
    fn test_binds_triggers_once() {
        let (mut app, _) = app();

        assert_eq!(app.triggers().len(), 8);
        assert_eq!(app.rescan().unwrap(), 8);
        assert_eq!(app.triggers().len(), 8);
    }

    #[test]
    fn test_confirm_link_flow() {
        let (mut app, _) = app();

        let opened = click(&mut app, "delete-link").unwrap();
        assert!(opened.default_prevented && opened.propagation_stopped);
        assert_eq!(opened.outcome, Some(Outcome::Opened(DialogKind::Confirmation)));
        assert!(app.manager().is_inert());

        let confirmed = click(&mut app, "confirm-yes").unwrap();
        assert_eq!(
            confirmed.outcome,
            Some(Outcome::Navigated("/delete?repo_id=42".to_string()))
        );
        assert!(!app.manager().is_inert());
        assert_eq!(app.page().effects().len(), 1);
    }

    #[test]
    fn test_confirm_button_flow() {
        let (mut app, _) = app();
        let form = app.page().by_id("remove-form").unwrap();

        click(&mut app, "remove-button").unwrap();
        click(&mut app, "confirm-yes").unwrap();

        assert_eq!(app.page().effects(), &[Effect::SubmitForm { form }]);
        assert_eq!(app.page().location(), None);
    }

    #[test]
    fn test_confirm_no() {
        let (mut app, _) = app();

        click(&mut app, "delete-link").unwrap();
        let declined = click(&mut app, "confirm-no").unwrap();

        assert_eq!(declined.outcome, Some(Outcome::Cancelled(DialogKind::Confirmation)));
        assert!(app.page().effects().is_empty());
        assert!(!app.manager().is_inert());
    }

    #[test]
    fn test_orphan_confirmation_reports_and_closes() {
        let (mut app, _) = app();

        click(&mut app, "orphan").unwrap();
        let err = click(&mut app, "confirm-yes").unwrap_err();

        assert!(matches!(err, DialogError::NoTerminalAction(_)));
        assert!(!app.manager().is_inert());
        assert!(!app.confirmation().unwrap().is_armed());
    }

    #[test]
    fn test_new_build_navigates() {
        let (mut app, _) = app();

        click(&mut app, "action-new-build").unwrap();
        let field = app.input().unwrap().field();
        assert_eq!(app.page().focused(), Some(field));

        type_text(&mut app, "main");
        click(&mut app, "input-ok").unwrap();

        assert_eq!(app.page().location(), Some("/build?repo_id=42&ref=main"));
        assert_eq!(app.page().value(field), "");
        assert!(!app.manager().is_inert());
    }

    #[test]
    fn test_new_build_prompt_comes_from_config() {
        let (mut app, _) = app();

        click(&mut app, "action-new-build").unwrap();
        let message = app.page().require("#input-dialog .input-message").unwrap();

        assert_eq!(
            app.page().text(message),
            "Specify a Git ref to check out and build:"
        );
    }

    #[test]
    fn test_new_build_empty_ref() {
        let (mut app, _) = app();

        click(&mut app, "action-new-build").unwrap();
        let dispatch = press(&mut app, Key::Enter).unwrap();

        assert_eq!(dispatch.outcome, Some(Outcome::EmptyInputIgnored));
        assert!(app.page().effects().is_empty());
        assert!(!app.manager().is_inert());
    }

    #[test]
    fn test_enter_equals_ok_click() {
        let (mut clicked, _) = app();
        click(&mut clicked, "action-new-build").unwrap();
        type_text(&mut clicked, "release/1.0");
        let by_click = click(&mut clicked, "input-ok").unwrap();

        let (mut pressed, _) = app();
        click(&mut pressed, "action-new-build").unwrap();
        type_text(&mut pressed, "release/1.0");
        let by_key = press(&mut pressed, Key::Enter).unwrap();

        assert_eq!(by_click.outcome, by_key.outcome);
        assert_eq!(clicked.page().effects(), pressed.page().effects());
    }

    #[test]
    fn test_escape_cancels() {
        let (mut app, _) = app();

        click(&mut app, "action-new-build").unwrap();
        type_text(&mut app, "main");
        let dispatch = press(&mut app, Key::Escape).unwrap();

        assert_eq!(dispatch.outcome, Some(Outcome::Cancelled(DialogKind::Input)));
        assert_eq!(app.page().value(app.input().unwrap().field()), "");
        assert!(app.page().effects().is_empty());
    }

    #[test]
    fn test_keys_ignored_when_dialog_closed() {
        let (mut app, _) = app();

        let dispatch = press(&mut app, Key::Enter).unwrap();
        assert_eq!(dispatch, Dispatch::unhandled());
    }

    #[test]
    fn test_callback_trigger() {
        let (mut app, received) = app();

        click(&mut app, "rename").unwrap();
        let field = app.input().unwrap().field();
        assert_eq!(app.page().value(field), "flux");
        assert_eq!(app.page().selected(), Some(field));

        type_text(&mut app, "flux-ci");
        let dispatch = click(&mut app, "input-ok").unwrap();

        assert_eq!(dispatch.outcome, Some(Outcome::CallbackInvoked("rename".to_string())));
        assert_eq!(*received.borrow(), vec!["flux-ci".to_string()]);
    }

    #[test]
    fn test_unknown_callback_surfaces_error() {
        let (mut app, _) = app();

        click(&mut app, "ghost").unwrap();
        let err = click(&mut app, "input-ok").unwrap_err();

        assert!(matches!(err, DialogError::UnknownCallback(_)));
        assert!(matches!(app.page().effects(), [Effect::Error { .. }]));
        assert!(!app.manager().is_inert());
    }

    #[test]
    fn test_registering_late_callback() {
        let (mut app, _) = app();
        app.registry_mut().register("missing", |_: &str| Ok(()));

        click(&mut app, "ghost").unwrap();
        let dispatch = click(&mut app, "input-ok").unwrap();

        assert_eq!(dispatch.outcome, Some(Outcome::CallbackInvoked("missing".to_string())));
    }

    #[test]
    fn test_other_dialog_trigger_is_rejected() {
        let (mut app, _) = app();

        click(&mut app, "action-new-build").unwrap();
        type_text(&mut app, "main");
        let err = click(&mut app, "delete-link").unwrap_err();

        assert!(matches!(
            err,
            DialogError::AnotherDialogOpen {
                open: DialogKind::Input,
                requested: DialogKind::Confirmation,
            }
        ));
        assert!(app.manager().is_visible(DialogKind::Input));
        assert!(!app.confirmation().unwrap().is_armed());

        click(&mut app, "input-ok").unwrap();
        assert_eq!(app.page().location(), Some("/build?repo_id=42&ref=main"));
        assert!(!app.manager().is_inert());
    }

    #[test]
    fn test_retrigger_while_armed_discards_previous() {
        let (mut app, _) = app();
        let form = app.page().by_id("remove-form").unwrap();

        click(&mut app, "delete-link").unwrap();
        click(&mut app, "remove-button").unwrap();
        click(&mut app, "confirm-yes").unwrap();

        assert_eq!(app.page().effects(), &[Effect::SubmitForm { form }]);
    }

    #[test]
    fn test_second_invocation_fires_once() {
        let (mut app, received) = app();

        for text in ["a", "b"] {
            click(&mut app, "rename").unwrap();
            type_text(&mut app, text);
            click(&mut app, "input-ok").unwrap();
        }
        let stray = click(&mut app, "input-ok").unwrap();

        assert_eq!(stray.outcome, Some(Outcome::Idle));
        assert_eq!(*received.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_widgets_and_document_click() {
        let (mut app, _) = app();
        let menu = app.page().by_id("menu").unwrap();

        let opened = click(&mut app, "menu-toggle").unwrap();
        assert!(opened.propagation_stopped);
        assert!(app.page().is_visible(menu));

        let elsewhere = click(&mut app, "footer").unwrap();
        assert_eq!(elsewhere, Dispatch::unhandled());
        assert!(!app.page().is_visible(menu));
    }

    #[test]
    fn test_click_on_trigger_child_bubbles() {
        let (mut app, _) = app();

        let opened = click(&mut app, "delete-icon").unwrap();
        assert!(opened.default_prevented && opened.propagation_stopped);
        assert_eq!(opened.outcome, Some(Outcome::Opened(DialogKind::Confirmation)));
        assert!(app.manager().is_inert());

        click(&mut app, "confirm-yes").unwrap();
        assert_eq!(app.page().location(), Some("/delete?repo_id=42"));
    }

    #[test]
    fn test_click_on_new_build_label_bubbles() {
        let (mut app, _) = app();

        click(&mut app, "new-build-label").unwrap();
        type_text(&mut app, "main");
        click(&mut app, "input-ok").unwrap();

        assert_eq!(app.page().location(), Some("/build?repo_id=42&ref=main"));
    }

    #[test]
    fn test_click_inside_dialog_is_unhandled() {
        let (mut app, _) = app();

        click(&mut app, "delete-link").unwrap();
        let dispatch = click(&mut app, "confirm-text").unwrap();

        assert_eq!(dispatch, Dispatch::unhandled());
        assert!(app.manager().is_visible(DialogKind::Confirmation));
        assert!(app.confirmation().unwrap().is_armed());
    }

    #[test]
    fn test_trigger_click_closes_menus() {
        let (mut app, _) = app();
        let menu = app.page().by_id("menu").unwrap();

        click(&mut app, "menu-toggle").unwrap();
        assert!(app.page().is_visible(menu));

        click(&mut app, "delete-link").unwrap();
        assert!(!app.page().is_visible(menu));
        assert!(app.manager().is_visible(DialogKind::Confirmation));
    }

    #[test]
    fn test_new_build_after_discarded_prefill() {
        let (mut app, received) = app();

        click(&mut app, "rename").unwrap();
        click(&mut app, "action-new-build").unwrap();
        let dispatch = click(&mut app, "input-ok").unwrap();

        assert_eq!(dispatch.outcome, Some(Outcome::EmptyInputIgnored));
        assert_eq!(app.page().location(), None);
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn test_auto_submit_on_change() {
        let (mut app, _) = app();
        let upload = app.page().by_id("upload").unwrap();
        let form = app.page().by_id("upload-form").unwrap();

        let dispatch = app.dispatch(PageEvent::Change { target: upload }).unwrap();

        assert!(dispatch.default_prevented);
        assert_eq!(app.page().effects(), &[Effect::SubmitForm { form }]);
    }

    #[test]
    fn test_page_without_input_dialog_skips_input_triggers() {
        let markup = PAGE.replace("input-dialog", "prompt").replace("input-overlay", "prompt-overlay");
        let page = Page::parse(&markup);
        let app = App::new(page, Config::default(), CallbackRegistry::new()).unwrap();

        assert!(app.input().is_none());
        assert_eq!(app.triggers().len(), 4);
        assert!(app
            .triggers()
            .values()
            .all(|trigger| trigger.dialog() == DialogKind::Confirmation));
    }
}
