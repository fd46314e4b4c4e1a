use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use shared::domain::Provider;
use tracing::warn;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "https://ppt-backend-4u6d.onrender.com";
pub const SETTINGS_FILE: &str = "slidegen.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub download_dir: PathBuf,
    pub default_provider: Provider,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            download_dir: crate::download::default_download_dir(),
            default_provider: Provider::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    backend_url: Option<String>,
    download_dir: Option<PathBuf>,
    default_provider: Option<String>,
}

/// Defaults, then `slidegen.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub(crate) fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    let mut raw_backend_url = settings.backend_url.clone();
    let mut raw_provider = None;

    if let Ok(raw) = fs::read_to_string(file) {
        let file_cfg: SettingsFile = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", file.display()))?;
        if let Some(v) = file_cfg.backend_url {
            raw_backend_url = v;
        }
        if let Some(v) = file_cfg.download_dir {
            settings.download_dir = v;
        }
        raw_provider = file_cfg.default_provider;
    }

    let lookup = |names: &[&str]| names.iter().rev().find_map(|name| env(name));

    if let Some(v) = lookup(&["SLIDEGEN_BACKEND_URL", "APP__BACKEND_URL"]) {
        raw_backend_url = v;
    }
    if let Some(v) = lookup(&["SLIDEGEN_DOWNLOAD_DIR", "APP__DOWNLOAD_DIR"]) {
        settings.download_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup(&["SLIDEGEN_PROVIDER", "APP__DEFAULT_PROVIDER"]) {
        raw_provider = Some(v);
    }

    settings.backend_url = normalize_backend_url(&raw_backend_url)?;
    if let Some(raw) = raw_provider {
        match raw.parse::<Provider>() {
            Ok(provider) => settings.default_provider = provider,
            Err(err) => warn!("ignoring configured default provider: {err}"),
        }
    }

    Ok(settings)
}

/// Trims the address, checks it is an absolute http(s) URL and drops any
/// trailing slash so endpoint paths can be appended directly.
pub fn normalize_backend_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_BACKEND_URL.to_string());
    }

    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid backend url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "backend url '{trimmed}' must use http or https, not '{}'",
            parsed.scheme()
        ));
    }
    if parsed.host_str().is_none() {
        return Err(anyhow!("backend url '{trimmed}' has no host"));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
