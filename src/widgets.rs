//! Passive page widgets
//!
//! Stateless handlers sharing the page with the dialogs: the collapsible
//! navigation, dismissible notices, dropdown menus and file inputs that submit
//! their form on change. Each activation prevents the default action and
//! stops propagation.

use crate::page::{ElementId, Page, PageResult};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

const COLLAPSE_BUTTON: &str = "header nav .collapse-button";
const COLLAPSE_TARGET: &str = "header nav ul";
const TOGGLE_ATTR: &str = "data-toggle";
const NOTICE_CLOSE: &str = ".messages .close";
const NOTICE: &str = ".messages";
const DROPDOWN: &str = ".dropdown";
const DROPDOWN_MENU: &str = ".dropdown-menu";
const AUTO_SUBMIT: &str = "input[type=file][data-autosubmit]";

/// A widget handler with its targets resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    /// Toggle the navigation list
    Collapse { targets: Vec<ElementId> },
    /// Hide a notice banner
    Dismiss { notice: ElementId },
    /// Toggle the menus next to a dropdown button
    Dropdown { menus: Vec<ElementId> },
    /// Submit a form when a file is chosen
    AutoSubmit { form: ElementId },
}

/// All widgets on a page
#[derive(Debug, Default)]
pub struct Widgets {
    clicks: BTreeMap<ElementId, Widget>,
    changes: BTreeMap<ElementId, Widget>,
    menus: Vec<ElementId>,
}

impl Widgets {
    pub fn scan(page: &Page) -> PageResult<Self> {
        let mut widgets = Self::default();

        let default_targets = page.select(COLLAPSE_TARGET)?;
        for button in page.select(COLLAPSE_BUTTON)? {
            let targets = match page.attr(button, TOGGLE_ATTR).and_then(|id| page.by_id(id)) {
                Some(target) => vec![target],
                None => default_targets.clone(),
            };
            widgets.clicks.insert(button, Widget::Collapse { targets });
        }

        for close in page.select(NOTICE_CLOSE)? {
            if let Some(notice) = page.closest(close, NOTICE)? {
                widgets.clicks.insert(close, Widget::Dismiss { notice });
            }
        }

        for dropdown in page.select(DROPDOWN)? {
            let menus = match page.element(dropdown).and_then(|e| e.parent()) {
                Some(parent) => page.select_within(parent, DROPDOWN_MENU)?,
                None => Vec::new(),
            };
            widgets.clicks.insert(dropdown, Widget::Dropdown { menus });
        }

        for input in page.select(AUTO_SUBMIT)? {
            if let Some(form) = page.closest(input, "form")? {
                widgets.changes.insert(input, Widget::AutoSubmit { form });
            }
        }

        widgets.menus = page.select(DROPDOWN_MENU)?;

        debug!(
            "Found {} click widgets and {} change widgets",
            widgets.clicks.len(),
            widgets.changes.len()
        );
        Ok(widgets)
    }

    pub fn on_click(&self, element: ElementId) -> Option<&Widget> {
        self.clicks.get(&element)
    }

    pub fn on_change(&self, element: ElementId) -> Option<&Widget> {
        self.changes.get(&element)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &Widget)> {
        self.clicks.iter().chain(self.changes.iter())
    }

    pub fn len(&self) -> usize {
        self.clicks.len() + self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether clicks on `element` leave the dropdown menus alone. Every
    /// other element closes them when clicked.
    pub fn is_dropdown(&self, element: ElementId) -> bool {
        matches!(self.clicks.get(&element), Some(Widget::Dropdown { .. }))
    }

    /// Close every dropdown menu
    pub fn dismiss_menus(&self, page: &mut Page) {
        for &menu in &self.menus {
            page.set_visible(menu, false);
        }
    }
}

impl Widget {
    pub fn activate(&self, page: &mut Page) {
        match self {
            Widget::Collapse { targets } | Widget::Dropdown { menus: targets } => {
                for &target in targets {
                    page.toggle_visible(target);
                }
            }
            Widget::Dismiss { notice } => page.set_visible(*notice, false),
            Widget::AutoSubmit { form } => page.submit_form(*form),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::PAGE;
    use crate::page::Effect;

    fn id(page: &Page, dom_id: &str) -> ElementId {
        page.by_id(dom_id).unwrap()
    }

    #[test]
    fn test_scan_fixture() {
        let page = Page::parse(PAGE);
        let widgets = Widgets::scan(&page).unwrap();

        assert_eq!(widgets.len(), 4);
        assert_eq!(
            widgets.on_click(id(&page, "collapse")),
            Some(&Widget::Collapse { targets: vec![id(&page, "nav-list")] })
        );
        assert_eq!(
            widgets.on_click(id(&page, "notice-close")),
            Some(&Widget::Dismiss { notice: id(&page, "notice") })
        );
        assert_eq!(
            widgets.on_click(id(&page, "menu-toggle")),
            Some(&Widget::Dropdown { menus: vec![id(&page, "menu")] })
        );
        assert_eq!(
            widgets.on_change(id(&page, "upload")),
            Some(&Widget::AutoSubmit { form: id(&page, "upload-form") })
        );
    }

    #[test]
    fn test_toggle_target_attribute() {
        let page = Page::parse(
            r##"<header><nav><a class="collapse-button" id="b" data-toggle="side" href="#">Menu</a><ul></ul></nav></header><aside id="side"></aside>"##,
        );
        let widgets = Widgets::scan(&page).unwrap();

        assert_eq!(
            widgets.on_click(id(&page, "b")),
            Some(&Widget::Collapse { targets: vec![id(&page, "side")] })
        );
    }

    #[test]
    fn test_activation() {
        let mut page = Page::parse(PAGE);
        let widgets = Widgets::scan(&page).unwrap();
        let menu = id(&page, "menu");
        let nav = id(&page, "nav-list");

        assert!(widgets.is_dropdown(id(&page, "menu-toggle")));
        assert!(!widgets.is_dropdown(id(&page, "collapse")));

        widgets.on_click(id(&page, "menu-toggle")).unwrap().activate(&mut page);
        assert!(page.is_visible(menu));
        widgets.dismiss_menus(&mut page);
        assert!(!page.is_visible(menu));

        widgets.on_click(id(&page, "collapse")).unwrap().activate(&mut page);
        assert!(!page.is_visible(nav));

        widgets.on_click(id(&page, "notice-close")).unwrap().activate(&mut page);
        assert!(!page.is_visible(id(&page, "notice")));

        widgets.on_change(id(&page, "upload")).unwrap().activate(&mut page);
        assert_eq!(
            page.effects(),
            &[Effect::SubmitForm { form: id(&page, "upload-form") }]
        );
    }
}
