use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default nekobend data directory: ~/.nekobend
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".nekobend"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.nekobend/config.toml (highest)
    let user_config = get_data_dir()?.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(cfg)
}

/// Environment variable overrides (Priority 0: highest).
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("NEKOBEND_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(ms) = non_empty("NEKOBEND_POLL_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()) {
        cfg.observer.poll_timeout_ms = ms;
    }
    if let Some(ms) = non_empty("NEKOBEND_HTTP_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()) {
        cfg.http.timeout_ms = ms;
    }
}
