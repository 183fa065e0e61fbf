use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{store::DEFAULT_SUMMARIES_TABLE, StoreCredentials};
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "summarizer.toml";
pub const DEFAULT_WEBHOOK_URL: &str =
    "https://malaika-khan.app.n8n.cloud/webhook/f1bce2eb-deb8-44bc-984a-8ef963b57645/chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub webhook_url: String,
    pub store_url: Option<String>,
    pub store_anon_key: Option<String>,
    pub summaries_table: String,
    pub scroll_delay_ms: u64,
    pub fact_rotation_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_WEBHOOK_URL.into(),
            store_url: None,
            store_anon_key: None,
            summaries_table: DEFAULT_SUMMARIES_TABLE.into(),
            scroll_delay_ms: 80,
            fact_rotation_secs: 5,
        }
    }
}

impl Settings {
    pub fn webhook_endpoint(&self) -> anyhow::Result<Url> {
        Url::parse(self.webhook_url.trim())
            .with_context(|| format!("invalid webhook url '{}'", self.webhook_url))
    }

    /// `None` when either the project URL or the key is missing.
    pub fn store_credentials(&self) -> anyhow::Result<Option<StoreCredentials>> {
        let (Some(url), Some(key)) = (non_blank(&self.store_url), non_blank(&self.store_anon_key))
        else {
            return Ok(None);
        };
        let base_url =
            Url::parse(url).with_context(|| format!("invalid store url '{url}'"))?;
        Ok(Some(StoreCredentials {
            base_url,
            anon_key: key.to_string(),
        }))
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    /// Never zero; a zero period would stall the ticker.
    pub fn fact_rotation(&self) -> Duration {
        Duration::from_secs(self.fact_rotation_secs.max(1))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn load_settings(path: &Path) -> Settings {
    load_settings_from(path, |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match parse_settings_file(&raw) {
            Ok(file_cfg) => apply_file_overrides(&mut settings, &file_cfg),
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable settings file"),
        }
    }

    apply_env_overrides(&mut settings, env);
    settings
}

fn parse_settings_file(raw: &str) -> Result<HashMap<String, String>, toml::de::Error> {
    let table = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    Ok(table
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("webhook_url") {
        settings.webhook_url = v.clone();
    }
    if let Some(v) = file_cfg.get("store_url") {
        settings.store_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("store_anon_key") {
        settings.store_anon_key = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("summaries_table") {
        settings.summaries_table = v.clone();
    }
    if let Some(v) = file_cfg.get("scroll_delay_ms").and_then(|v| v.parse().ok()) {
        settings.scroll_delay_ms = v;
    }
    if let Some(v) = file_cfg
        .get("fact_rotation_secs")
        .and_then(|v| v.parse().ok())
    {
        settings.fact_rotation_secs = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("WEBHOOK_URL") {
        settings.webhook_url = v;
    }
    if let Some(v) = env("APP__WEBHOOK_URL") {
        settings.webhook_url = v;
    }

    if let Some(v) = env("SUPABASE_URL") {
        settings.store_url = Some(v);
    }
    if let Some(v) = env("APP__STORE_URL") {
        settings.store_url = Some(v);
    }

    if let Some(v) = env("SUPABASE_ANON_KEY") {
        settings.store_anon_key = Some(v);
    }
    if let Some(v) = env("APP__STORE_ANON_KEY") {
        settings.store_anon_key = Some(v);
    }

    if let Some(v) = env("APP__SUMMARIES_TABLE") {
        settings.summaries_table = v;
    }

    if let Some(v) = env("APP__SCROLL_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.scroll_delay_ms = parsed;
        }
    }
    if let Some(v) = env("APP__FACT_ROTATION_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.fact_rotation_secs = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
