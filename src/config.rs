// File: ./src/config.rs
use crate::model::Child;
use crate::paths::AppPaths;
use anyhow::{Context, Result};
use http::Uri;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const URL_ENV: &str = "SUPABASE_URL";
pub const KEY_ENV: &str = "SUPABASE_ANON_KEY";

// Values shipped in the sample config; treated as "not configured".
const URL_PLACEHOLDER: &str = "your-project";
const KEY_PLACEHOLDER: &str = "your-anon-key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote_url: String,
    pub remote_key: String,
    pub child_a: String,
    pub child_b: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_url: String::new(),
            remote_key: String::new(),
            child_a: "Quinn".to_string(),
            child_b: "Trixie".to_string(),
            log_level: crate::logging::default_log_level().to_string(),
        }
    }
}

/// Validated remote endpoint and key.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCredentials {
    pub url: String,
    pub key: String,
}

impl Config {
    /// Loads the config file (defaults when absent), then applies the
    /// `SUPABASE_URL` / `SUPABASE_ANON_KEY` environment overrides.
    pub fn load(paths: &AppPaths) -> Result<Self> {
        let mut config = Self::load_from(&paths.config_file())?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config `{}`", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config `{}`", path.display()))
    }

    pub fn save(&self, paths: &AppPaths) -> Result<()> {
        let path = paths.config_file();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(&path, raw).with_context(|| format!("failed to write `{}`", path.display()))
    }

    /// Non-empty environment values win over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.remote_url = url.trim().to_string();
        }
        if let Some(key) = lookup(KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.remote_key = key.trim().to_string();
        }
    }

    /// `None` when the remote is absent, malformed or still a placeholder.
    pub fn remote_credentials(&self) -> Option<RemoteCredentials> {
        let url = self.remote_url.trim();
        let key = self.remote_key.trim();

        if url.is_empty() || key.is_empty() {
            return None;
        }
        if url.contains(URL_PLACEHOLDER) || key.contains(KEY_PLACEHOLDER) {
            return None;
        }

        let uri: Uri = url.parse().ok()?;
        let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
        if !scheme_ok || uri.host().is_none() {
            return None;
        }

        Some(RemoteCredentials {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    pub fn child_name(&self, child: Child) -> &str {
        match child {
            Child::A => &self.child_a,
            Child::B => &self.child_b,
        }
    }
}
