use std::path::PathBuf;

use anyhow::{Context, Result};

const APP_DIR_NAME: &str = "usage-ledger";
const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_FILE_NAME: &str = "sync-state.json";

pub fn config_file() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not determine the user config directory")?;
    Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn state_file() -> Result<PathBuf> {
    let base = dirs::data_dir().context("could not determine the user data directory")?;
    Ok(base.join(APP_DIR_NAME).join(STATE_FILE_NAME))
}
