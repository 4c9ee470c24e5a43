use crate::options::UploadOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// libcurl transport parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Upper bound on a whole request in seconds.
    pub timeout_secs: u64,
    /// Follow 3xx redirects returned by the endpoint. The request is replayed
    /// with the same method and body on every redirect status, so a 302 does
    /// not turn an upload into a body-less GET.
    pub follow_redirects: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            follow_redirects: true,
        }
    }
}

/// Global configuration loaded from `~/.config/multipost/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultipostConfig {
    /// Instance-level upload options; per-file options override these.
    #[serde(default)]
    pub upload: UploadOptions,
    #[serde(default)]
    pub transport: TransportConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("multipost")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MultipostConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<MultipostConfig> {
    if !path.exists() {
        let default_cfg = MultipostConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: MultipostConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_values() {
        let cfg = MultipostConfig::default();
        assert_eq!(cfg.transport.connect_timeout_secs, 30);
        assert_eq!(cfg.transport.timeout_secs, 3600);
        assert!(cfg.transport.follow_redirects);
        assert!(cfg.upload.endpoint.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = MultipostConfig::default();
        cfg.upload.endpoint = Some("https://example.com/upload".to_string());
        cfg.upload.meta_fields = Some(vec!["name".to_string()]);
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MultipostConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_sections() {
        let toml = r#"
            [upload]
            endpoint = "https://example.com/upload"
            method = "PUT"
            form_data = false

            [transport]
            timeout_secs = 60
        "#;
        let cfg: MultipostConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.upload.method.as_deref(), Some("PUT"));
        assert_eq!(cfg.upload.form_data, Some(false));
        assert!(cfg.upload.field_name.is_none());
        assert_eq!(cfg.transport.timeout_secs, 60);
        assert_eq!(cfg.transport.connect_timeout_secs, 30);
    }

    #[test]
    fn empty_file_is_default() {
        let cfg: MultipostConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, MultipostConfig::default());
    }

    #[test]
    fn load_or_init_creates_then_reads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, MultipostConfig::default());

        fs::write(&path, "[upload]\nfield_name = \"upload\"\n").unwrap();
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(loaded.upload.field_name.as_deref(), Some("upload"));
    }

    #[test]
    fn load_rejects_bad_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[upload\nendpoint = ").unwrap();
        assert!(load_or_init_at(&path).is_err());
    }
}
