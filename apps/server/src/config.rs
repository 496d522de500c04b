use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ledger_app::DEFAULT_PUBLIC_URL;
use ledger_core::MAX_BACKFILL_DAYS;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 3845;
const DATA_DIR_NAME: &str = "usage-ledger-server";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: IpAddr,
    pub data_dir: Option<PathBuf>,
    pub public_url: Option<String>,
    pub backfill_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            data_dir: None,
            public_url: None,
            backfill_days: MAX_BACKFILL_DAYS,
        }
    }
}

impl ServerConfig {
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .context("could not determine the user data directory")?
                .join(DATA_DIR_NAME)),
        }
    }

    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string())
    }
}

/// Missing `path` means built-in defaults.
pub fn load(path: Option<&Path>) -> Result<ServerConfig> {
    let Some(path) = path else {
        return Ok(ServerConfig::default());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    parse(&contents).with_context(|| format!("parse config {}", path.display()))
}

fn parse(contents: &str) -> Result<ServerConfig> {
    let config: ServerConfig = toml::from_str(contents)?;
    if config.backfill_days < 0 {
        bail!("backfill_days must not be negative");
    }
    Ok(config)
}
