use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use flux_ui::triggers::Trigger;
use flux_ui::widgets::Widget;
use flux_ui::{App, CallbackRegistry, Config, ElementId, Page};

use super::root::load_page;

/// List the triggers and widgets bound on a page
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Page markup to load
    pub page: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Bound<'a, T> {
    element: ElementId,
    label: String,
    #[serde(flatten)]
    binding: &'a T,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    triggers: Vec<Bound<'a, Trigger>>,
    widgets: Vec<Bound<'a, Widget>>,
}

impl ScanCommand {
    pub async fn execute(&self, config: Config) -> Result<()> {
        let page = load_page(&self.page).await?;
        let app = App::new(page, config, CallbackRegistry::new())?;
        let page = app.page();

        let report = Report {
            triggers: app
                .triggers()
                .into_iter()
                .map(|(element, binding)| Bound { element, label: label(page, element), binding })
                .collect(),
            widgets: app
                .widgets()
                .iter()
                .map(|(&element, binding)| Bound { element, label: label(page, element), binding })
                .collect(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("Triggers ({}):", report.triggers.len());
        for bound in &report.triggers {
            println!("  {:<6} {:<28} {}", bound.element, bound.label, describe_trigger(bound.binding));
        }
        println!("Widgets ({}):", report.widgets.len());
        for bound in &report.widgets {
            println!("  {:<6} {:<28} {}", bound.element, bound.label, describe_widget(bound.binding));
        }
        Ok(())
    }
}

/// `tag#id.class` for display
pub(super) fn label(page: &Page, element: ElementId) -> String {
    let Some(el) = page.element(element) else {
        return element.to_string();
    };

    let mut label = el.tag().to_string();
    if let Some(id) = el.attr("id") {
        label.push('#');
        label.push_str(id);
    } else if let Some(class) = el.classes().first() {
        label.push('.');
        label.push_str(class);
    }
    label
}

fn describe_trigger(trigger: &Trigger) -> String {
    match trigger {
        Trigger::Confirm { message } => format!("confirm {:?}", message),
        Trigger::NewBuild { repo_id } => format!("new build of repository {}", repo_id),
        Trigger::Input { message, callback, .. } => match callback {
            Some(name) => format!("input {:?} -> {}", message, name),
            None => format!("input {:?}", message),
        },
    }
}

fn describe_widget(widget: &Widget) -> String {
    match widget {
        Widget::Collapse { targets } => format!("collapse {} element(s)", targets.len()),
        Widget::Dismiss { notice } => format!("dismiss {}", notice),
        Widget::Dropdown { menus } => format!("toggle {} menu(s)", menus.len()),
        Widget::AutoSubmit { form } => format!("submit {} on change", form),
    }
}
