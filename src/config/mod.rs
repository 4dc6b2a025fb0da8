use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Page wiring configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path the new-build prompt navigates to
    pub build_path: String,

    /// Prompt shown by the new-build trigger
    pub new_build_prompt: String,

    /// Class marking a region as blurred while a dialog is open
    pub blur_class: String,

    /// Selectors of the regions made inert while a dialog is open
    pub inert_regions: Vec<String>,

    /// Select the pre-filled text when the input dialog opens
    pub select_prefill: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build_path: "/build".to_string(),
            new_build_prompt: "Specify a Git ref to check out and build:".to_string(),
            blur_class: "blur".to_string(),
            inert_regions: vec!["header".to_string(), "main".to_string(), "footer".to_string()],
            select_prefill: true,
        }
    }
}

impl Config {
    /// Initialize configuration from a file (explicit or discovered) and the environment
    pub async fn init(explicit: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match explicit {
            Some(path) => Self::load_from_file(path).await?,
            None => match Self::discover() {
                Some(path) => Self::load_from_file(&path).await?,
                None => Self::default(),
            },
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Candidate configuration files, highest priority first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./.flux-ui.json"), PathBuf::from("./flux-ui.json")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("flux-ui").join("config.json"));
        }
        paths
    }

    fn discover() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.exists())
    }

    /// Load configuration from a JSON file; missing keys keep their defaults
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from `FLUX_UI_*` environment variables
    pub fn load_from_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(build_path) = lookup("FLUX_UI_BUILD_PATH") {
            self.build_path = build_path;
        }

        if let Some(prompt) = lookup("FLUX_UI_NEW_BUILD_PROMPT") {
            self.new_build_prompt = prompt;
        }

        if let Some(blur_class) = lookup("FLUX_UI_BLUR_CLASS") {
            self.blur_class = blur_class;
        }

        if let Some(regions) = lookup("FLUX_UI_INERT_REGIONS") {
            self.inert_regions = regions
                .split(',')
                .map(str::trim)
                .filter(|region| !region.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(select) = lookup("FLUX_UI_SELECT_PREFILL") {
            self.select_prefill = select.to_lowercase() == "true";
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.build_path.starts_with('/') {
            return Err(anyhow!(
                "build_path must be an absolute path, got '{}'",
                self.build_path
            ));
        }

        if self.blur_class.trim().is_empty() || self.blur_class.contains(char::is_whitespace) {
            return Err(anyhow!("blur_class must be a single class name"));
        }

        Ok(())
    }
}
