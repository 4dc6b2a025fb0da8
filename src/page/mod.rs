//! Headless document model for a Flux page
//!
//! The page is parsed once from markup and then mutated by the dialog
//! subsystem: visibility, classes, text, field values and focus. Side effects
//! that would leave the page (navigation, form submission) or that must be
//! shown to the user (errors) are recorded as [`Effect`]s.
//!
//! Selectors are evaluated against the markup as it was loaded. Runtime
//! mutations (classes added by the dialog manager, visibility) are not
//! visible to selector matching.

mod parse;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Index of an element in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Errors raised while querying the page
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Required element '{0}' not found")]
    MissingElement(String),

    #[error("Element {0} does not belong to this page")]
    UnknownElement(ElementId),
}

pub type PageResult<T> = std::result::Result<T, PageError>;

/// Side effects recorded on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// The browser was sent to a new location
    Navigate { url: String },
    /// A form was submitted unchanged
    SubmitForm { form: ElementId },
    /// An error was shown to the user
    Error { message: String },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Navigate { url } => write!(f, "navigate {url}"),
            Effect::SubmitForm { form } => write!(f, "submit {form}"),
            Effect::Error { message } => write!(f, "error {message}"),
        }
    }
}

/// A single element of the page
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    text: String,
    value: String,
    visible: bool,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Parsed page plus the state mutated by event handlers
pub struct Page {
    html: Html,
    elements: Vec<Element>,
    focused: Option<ElementId>,
    selected: Option<ElementId>,
    location: Option<String>,
    effects: Vec<Effect>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("elements", &self.elements.len())
            .field("focused", &self.focused)
            .field("location", &self.location)
            .field("effects", &self.effects)
            .finish()
    }
}

impl Page {
    /// Parse a full HTML document
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let elements = parse::build_elements(&html);
        debug!("Parsed page with {} elements", elements.len());

        Self {
            html,
            elements,
            focused: None,
            selected: None,
            location: None,
            effects: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    /// Like [`Page::element`] but fails for foreign ids
    pub fn get(&self, id: ElementId) -> PageResult<&Element> {
        self.element(id).ok_or(PageError::UnknownElement(id))
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let element = self.elements.get_mut(id.0);
        if element.is_none() {
            warn!("Ignoring mutation of unknown element {}", id);
        }
        element
    }

    // --- Queries ---

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, css: &str) -> PageResult<Vec<ElementId>> {
        let selector = compile(css)?;
        Ok(self
            .element_refs()
            .enumerate()
            .filter(|(_, element)| selector.matches(element))
            .map(|(index, _)| ElementId(index))
            .collect())
    }

    pub fn select_first(&self, css: &str) -> PageResult<Option<ElementId>> {
        Ok(self.select(css)?.into_iter().next())
    }

    /// First match of a selector that the page must contain
    pub fn require(&self, css: &str) -> PageResult<ElementId> {
        self.select_first(css)?
            .ok_or_else(|| PageError::MissingElement(css.to_string()))
    }

    /// Matches of `css` that are strict descendants of `root`
    pub fn select_within(&self, root: ElementId, css: &str) -> PageResult<Vec<ElementId>> {
        Ok(self
            .select(css)?
            .into_iter()
            .filter(|&id| id != root && self.is_within(id, root))
            .collect())
    }

    pub fn matches(&self, id: ElementId, css: &str) -> PageResult<bool> {
        let selector = compile(css)?;
        let element = self
            .element_refs()
            .nth(id.0)
            .ok_or(PageError::UnknownElement(id))?;
        Ok(selector.matches(&element))
    }

    /// Nearest ancestor-or-self matching `css`
    pub fn closest(&self, id: ElementId, css: &str) -> PageResult<Option<ElementId>> {
        let mut current = Some(id);
        while let Some(candidate) = current {
            if self.matches(candidate, css)? {
                return Ok(Some(candidate));
            }
            current = self.element(candidate).and_then(Element::parent);
        }
        Ok(None)
    }

    pub fn by_id(&self, dom_id: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|element| element.attr("id") == Some(dom_id))
            .map(ElementId)
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attr(name))
    }

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).is_some_and(|element| element.has_class(class))
    }

    pub fn text(&self, id: ElementId) -> &str {
        self.element(id).map(Element::text).unwrap_or_default()
    }

    pub fn value(&self, id: ElementId) -> &str {
        self.element(id).map(Element::value).unwrap_or_default()
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(Element::is_visible)
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Field whose whole value is currently selected
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // --- Mutations ---

    pub fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(element) = self.element_mut(id) {
            element.text = text.to_string();
        }
    }

    /// Replace a field value, dropping any selection on it
    pub fn set_value(&mut self, id: ElementId, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.value = value.to_string();
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    pub fn select_all(&mut self, id: ElementId) {
        if self.element(id).is_some() {
            self.selected = Some(id);
        }
    }

    pub fn focus(&mut self, id: ElementId) {
        if self.element(id).is_some() {
            self.focused = Some(id);
        }
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) {
        if let Some(element) = self.element_mut(id) {
            element.visible = visible;
        }
        if !visible && self.focused.is_some_and(|focused| self.is_within(focused, id)) {
            self.focused = None;
        }
    }

    pub fn toggle_visible(&mut self, id: ElementId) {
        let visible = self.is_visible(id);
        self.set_visible(id, !visible);
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(element) = self.element_mut(id) {
            if !element.has_class(class) {
                element.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(element) = self.element_mut(id) {
            element.classes.retain(|c| c != class);
        }
    }

    // --- Effects ---

    pub fn navigate(&mut self, url: &str) {
        info!("Navigating to {}", url);
        self.location = Some(url.to_string());
        self.effects.push(Effect::Navigate { url: url.to_string() });
    }

    pub fn submit_form(&mut self, form: ElementId) {
        info!("Submitting form {}", form);
        self.effects.push(Effect::SubmitForm { form });
    }

    pub fn report_error(&mut self, message: &str) {
        self.effects.push(Effect::Error { message: message.to_string() });
    }

    /// Whether `id` is `root` or lies below it
    fn is_within(&self, id: ElementId, root: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(candidate) = current {
            if candidate == root {
                return true;
            }
            current = self.element(candidate).and_then(Element::parent);
        }
        false
    }

    /// Element refs in the same order as `self.elements`
    fn element_refs(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }
}

fn compile(css: &str) -> PageResult<Selector> {
    Selector::parse(css).map_err(|e| PageError::InvalidSelector {
        selector: css.to_string(),
        reason: format!("{e:?}"),
    })
}
