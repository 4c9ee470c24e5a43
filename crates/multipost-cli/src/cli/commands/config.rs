//! `multipost config` – print the config path and effective settings.

use anyhow::Result;
use multipost_core::config::{self, MultipostConfig};

pub fn run_config(cfg: &MultipostConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
