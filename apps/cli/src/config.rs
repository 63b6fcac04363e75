use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::ServiceConfig;
use serde::Deserialize;
use shared::protocol::TODOS_TABLE;

const DEFAULT_CONFIG_FILE: &str = "todo.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub table: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".into(),
            anon_key: String::new(),
            access_token: None,
            table: TODOS_TABLE.into(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        if self.anon_key.trim().is_empty() {
            anyhow::bail!("missing anon key; set SUPABASE_ANON_KEY or anon_key in {DEFAULT_CONFIG_FILE}");
        }
        let config = ServiceConfig::new(&self.base_url, self.anon_key.trim())
            .with_context(|| format!("invalid service url '{}'", self.base_url))?
            .with_access_token(self.access_token.clone())
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs.max(1)));
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    anon_key: Option<String>,
    access_token: Option<String>,
    table: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file, then environment variables.
///
/// An explicit `path` must exist; the implicit `todo.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if required || file.exists() {
        let raw = fs::read_to_string(&file)
            .with_context(|| format!("failed to read config file '{}'", file.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", file.display()))?;
        apply_file(&mut settings, file_cfg);
    }

    if let Some(v) = env("SUPABASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("SUPABASE_ANON_KEY") {
        settings.anon_key = v;
    }
    if let Some(v) = env("APP__ANON_KEY") {
        settings.anon_key = v;
    }

    if let Some(v) = env("SUPABASE_ACCESS_TOKEN") {
        settings.access_token = Some(v);
    }
    if let Some(v) = env("APP__ACCESS_TOKEN") {
        settings.access_token = Some(v);
    }

    if let Some(v) = env("APP__TABLE") {
        settings.table = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.anon_key {
        settings.anon_key = v;
    }
    if let Some(v) = file_cfg.access_token {
        settings.access_token = Some(v);
    }
    if let Some(v) = file_cfg.table {
        settings.table = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
}
