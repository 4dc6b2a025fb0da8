//! Gesture scripts
//!
//! One gesture per line, `#` starts a comment:
//!
//! ```text
//! click #action-new-build
//! type "#input-dialog .input-text" main
//! key #input-text Enter
//! change #upload
//! ```
//!
//! Selectors containing spaces are double-quoted.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use flux_ui::dialogs::Key;
use flux_ui::{App, CallbackRegistry, Config, PageEvent};

use super::root::load_page;

/// Replay a script of gestures against a page
#[derive(Debug, Args)]
pub struct ReplayCommand {
    /// Page markup to load
    pub page: PathBuf,

    /// Script to replay. If not provided, will read from stdin
    pub script: Option<PathBuf>,
}

/// One scripted gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Click(String),
    Type { selector: String, text: String },
    Key { selector: String, key: Key },
    Change(String),
}

impl Step {
    fn selector(&self) -> &str {
        match self {
            Step::Click(selector) | Step::Change(selector) => selector,
            Step::Type { selector, .. } | Step::Key { selector, .. } => selector,
        }
    }
}

impl ReplayCommand {
    pub async fn execute(&self, config: Config) -> Result<()> {
        let page = load_page(&self.page).await?;
        let script = self.read_script().await?;
        let steps = parse_script(&script)?;

        let mut registry = CallbackRegistry::new();
        registry.register("echo", |text: &str| {
            println!("echo: {}", text);
            Ok(())
        });

        let mut app = App::new(page, config, registry)?;
        info!("Replaying {} steps", steps.len());

        for (line, step) in steps {
            let target = app
                .page()
                .require(step.selector())
                .with_context(|| format!("line {}", line))?;

            let event = match step {
                Step::Click(_) => PageEvent::Click { target },
                Step::Type { text, .. } => PageEvent::Input { target, value: text },
                Step::Key { key, .. } => PageEvent::KeyDown { target, key },
                Step::Change(_) => PageEvent::Change { target },
            };

            match app.dispatch(event) {
                Ok(dispatch) => debug!("line {}: {:?}", line, dispatch),
                Err(e) => {
                    warn!("line {}: {}", line, e);
                    println!("{:>4}: error {}", line, e);
                }
            }

            for effect in app.page_mut().take_effects() {
                println!("{:>4}: {}", line, effect);
            }
        }

        Ok(())
    }

    async fn read_script(&self) -> Result<String> {
        match &self.script {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display())),
            None => {
                debug!("Reading script from stdin");
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
                Ok(buffer)
            }
        }
    }
}

/// Parse a script into steps tagged with their 1-based line numbers
pub fn parse_script(script: &str) -> Result<Vec<(usize, Step)>> {
    let mut steps = Vec::new();

    for (index, raw) in script.lines().enumerate() {
        let line = index + 1;
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let (command, rest) = content.split_once(char::is_whitespace).unwrap_or((content, ""));
        let (selector, rest) =
            split_selector(rest.trim_start()).with_context(|| format!("line {}", line))?;

        let step = match command {
            "click" => Step::Click(selector),
            "change" => Step::Change(selector),
            "type" => Step::Type {
                selector,
                text: rest.to_string(),
            },
            "key" => {
                let name = rest.trim();
                if name.is_empty() {
                    return Err(anyhow!("line {}: key needs a key name", line));
                }
                Step::Key {
                    selector,
                    key: Key::from_dom(name),
                }
            }
            other => return Err(anyhow!("line {}: unknown command '{}'", line, other)),
        };
        steps.push((line, step));
    }

    Ok(steps)
}

/// Split the leading selector off `input`, honouring double quotes
fn split_selector(input: &str) -> Result<(String, &str)> {
    if input.is_empty() {
        return Err(anyhow!("missing selector"));
    }

    if let Some(quoted) = input.strip_prefix('"') {
        let end = quoted
            .find('"')
            .ok_or_else(|| anyhow!("unterminated quoted selector"))?;
        let rest = &quoted[end + 1..];
        return Ok((quoted[..end].to_string(), rest.strip_prefix(' ').unwrap_or(rest)));
    }

    match input.split_once(' ') {
        Some((selector, rest)) => Ok((selector.to_string(), rest)),
        None => Ok((input.to_string(), "")),
    }
}
