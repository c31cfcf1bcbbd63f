use std::path::{Path, PathBuf};

use anyhow::Context;

use super::types::AppConfig;

/// Get the default medport data directory: ~/.medport
pub fn get_medport_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".medport"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str::<AppConfig>(&s)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.medport/config.toml (highest)
    let medport_config = get_medport_data_dir()?.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if medport_config.exists() {
        load_from_path(&medport_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    // Environment variable overrides (Priority 0: highest)
    apply_env_overrides(&mut cfg, |name| std::env::var(name).ok())?;

    Ok(cfg)
}

fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("MEDPORT_API_URL") {
        cfg.api.base_url = v;
    }
    if let Some(v) = non_empty("MEDPORT_API_TIMEOUT_MS") {
        cfg.api.timeout_ms = v
            .trim()
            .parse()
            .with_context(|| format!("MEDPORT_API_TIMEOUT_MS is not a number: {v}"))?;
    }
    if let Some(v) = non_empty("MEDPORT_STORAGE_PATH") {
        cfg.storage.path = v;
    }
    Ok(())
}
