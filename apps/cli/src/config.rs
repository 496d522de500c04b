use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3845";
const API_URL_ENV: &str = "LEDGER_API_URL";
const TOKEN_ENV: &str = "LEDGER_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
        }
    }
}

impl CliConfig {
    /// Environment variables win over the file for this run only.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        );
        self
    }

    fn apply_overrides(&mut self, api_url: Option<String>, token: Option<String>) {
        if let Some(api_url) = api_url.filter(|value| !value.trim().is_empty()) {
            self.api_url = api_url;
        }
        if let Some(token) = token.filter(|value| !value.trim().is_empty()) {
            self.token = Some(token);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub file: PathBuf,
    pub created: bool,
}

pub fn load_or_create(file: &Path) -> Result<ConfigLoad> {
    if file.exists() {
        let contents = fs::read_to_string(file)
            .with_context(|| format!("read config {}", file.display()))?;
        let config: CliConfig = toml::from_str(&contents)
            .with_context(|| format!("parse config {}", file.display()))?;
        return Ok(ConfigLoad {
            config,
            file: file.to_path_buf(),
            created: false,
        });
    }

    let config = CliConfig::default();
    save(file, &config)?;
    Ok(ConfigLoad {
        config,
        file: file.to_path_buf(),
        created: true,
    })
}

pub fn save(file: &Path, config: &CliConfig) -> Result<()> {
    if let Some(dir) = file.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create config dir {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("serialize config")?;
    fs::write(file, contents).with_context(|| format!("write config {}", file.display()))
}
