//! Shared markup and helpers for unit tests

use crate::app::App;
use crate::config::Config;
use crate::dialogs::CallbackRegistry;
use crate::page::Page;
use std::cell::RefCell;
use std::rc::Rc;

/// A Flux repository page carrying every trigger and widget convention
pub const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head><title>Flux</title></head>
<body>
<header>
  <nav>
    <a class="collapse-button" id="collapse" href="#">Menu</a>
    <ul id="nav-list"><li><a href="/repositories">Repositories</a></li></ul>
  </nav>
</header>
<main>
  <div class="messages" id="notice"><span>Build queued.</span><a class="close" id="notice-close" href="#">x</a></div>

  <a id="delete-link" href="/delete?repo_id=42" data-confirmation="Delete this repository?"><i class="icon-trash" id="delete-icon"></i>Delete</a>
  <form id="remove-form" action="/remove" method="post">
    <button id="remove-button" type="submit" data-confirmation="Remove the build?">Remove</button>
  </form>
  <button id="outside-button" form="remove-form" data-confirmation="Remove via form attribute?">Remove too</button>
  <span id="orphan" data-confirmation="Nothing happens">Orphan</span>

  <a id="action-new-build" href="#" data-repository="42"><span id="new-build-label">New build</span></a>
  <a id="rename" href="#" data-input="New name:" data-input-value="flux" data-input-callback="rename">Rename</a>
  <a id="ghost" href="#" data-input="Ghost:" data-input-callback="missing">Ghost</a>
  <a id="note" href="#" data-input="Note:">Note</a>

  <div class="toolbar">
    <a class="dropdown" id="menu-toggle" href="#">More</a>
    <ul class="dropdown-menu" id="menu" style="display: none"><li id="menu-item">Item</li></ul>
  </div>

  <form id="upload-form" action="/upload" method="post">
    <input id="upload" type="file" name="archive" data-autosubmit>
  </form>
</main>
<footer id="footer">Flux CI</footer>

<div id="confirm-overlay"></div>
<div id="confirm-dialog">
  <p class="confirm-message" id="confirm-text"></p>
  <button class="confirm-yes" id="confirm-yes">Yes</button>
  <button class="confirm-no" id="confirm-no">No</button>
</div>

<div id="input-overlay"></div>
<div id="input-dialog">
  <p class="input-message"></p>
  <input class="input-text" id="input-text" type="text">
  <button class="input-ok" id="input-ok">OK</button>
  <button class="input-cancel" id="input-cancel">Cancel</button>
</div>
</body>
</html>
"##;

/// Texts received by the `rename` callback
pub type Received = Rc<RefCell<Vec<String>>>;

pub fn registry() -> (CallbackRegistry, Received) {
    let received: Received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);

    let mut registry = CallbackRegistry::new();
    registry.register("rename", move |text: &str| {
        sink.borrow_mut().push(text.to_string());
        Ok(())
    });
    registry.register("explode", |_: &str| Err(anyhow::anyhow!("boom")));

    (registry, received)
}

pub fn app() -> (App, Received) {
    let (registry, received) = registry();
    let app = App::new(Page::parse(PAGE), Config::default(), registry)
        .expect("fixture page should attach");
    (app, received)
}
