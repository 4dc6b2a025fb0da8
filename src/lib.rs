//! Headless modal dialog wiring for Flux CI pages
//!
//! A [`page::Page`] is parsed from markup, then [`app::App`] binds every
//! trigger and widget on it once and dispatches [`app::PageEvent`]s to the
//! confirmation and input dialogs.

pub mod app;
pub mod config;
pub mod dialogs;
pub mod page;
pub mod triggers;
pub mod widgets;

#[cfg(test)]
mod fixtures;

pub use app::{App, Dispatch, PageEvent};
pub use config::Config;
pub use dialogs::{CallbackRegistry, DialogError, DialogKind, DialogResult, Outcome};
pub use page::{Effect, ElementId, Page, PageError};
