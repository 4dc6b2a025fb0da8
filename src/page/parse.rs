//! Conversion from the parsed HTML tree into the element arena

use super::{Element, ElementId};
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;

/// Build the arena in pre-order, matching `descendants()` order
pub(super) fn build_elements(html: &Html) -> Vec<Element> {
    let mut elements = Vec::new();
    visit(html.root_element(), None, &mut elements);
    elements
}

fn visit(node: ElementRef<'_>, parent: Option<ElementId>, elements: &mut Vec<Element>) {
    let id = ElementId(elements.len());
    elements.push(convert(node, parent));

    if let Some(parent) = parent {
        elements[parent.0].children.push(id);
    }

    for child in node.children().filter_map(ElementRef::wrap) {
        visit(child, Some(id), elements);
    }
}

fn convert(node: ElementRef<'_>, parent: Option<ElementId>) -> Element {
    let value = node.value();
    let tag = value.name().to_ascii_lowercase();
    let attrs: BTreeMap<String, String> = value
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    let text: String = node.text().collect();

    let field_value = match tag.as_str() {
        "textarea" => text.clone(),
        _ => attrs.get("value").cloned().unwrap_or_default(),
    };

    Element {
        visible: !is_hidden(&attrs),
        classes: value.classes().map(str::to_string).collect(),
        tag,
        attrs,
        parent,
        children: Vec::new(),
        text,
        value: field_value,
    }
}

fn is_hidden(attrs: &BTreeMap<String, String>) -> bool {
    if attrs.contains_key("hidden") {
        return true;
    }

    attrs.get("style").is_some_and(|style| {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        compact.to_ascii_lowercase().contains("display:none")
    })
}
