use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{HttpTaskApiOptions, ReorderFailurePolicy};
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub reorder_failure: ReorderFailurePolicy,
    pub request_timeout_seconds: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".into(),
            reorder_failure: ReorderFailurePolicy::KeepLocal,
            request_timeout_seconds: None,
        }
    }
}

impl Settings {
    pub fn http_options(&self) -> HttpTaskApiOptions {
        HttpTaskApiOptions {
            request_timeout: self
                .request_timeout_seconds
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Defaults, then `config_path` if it exists, then the process environment.
pub fn load_settings(config_path: &Path) -> Settings {
    let raw = fs::read_to_string(config_path).ok();
    load_settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    raw_file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = raw_file {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url").and_then(|v| v.as_str()) {
                    settings.api_base_url = v.to_string();
                }
                if let Some(v) = file_cfg.get("reorder_failure").and_then(|v| v.as_str()) {
                    apply_reorder_failure(&mut settings, v);
                }
                if let Some(v) = file_cfg
                    .get("request_timeout_seconds")
                    .and_then(|v| v.as_integer())
                {
                    settings.request_timeout_seconds = u64::try_from(v).ok();
                }
            }
            Err(err) => warn!(error = %err, "config: ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("TODO_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REORDER_ROLLBACK") {
        apply_reorder_failure(&mut settings, &v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_seconds = Some(parsed);
        }
    }

    settings
}

fn apply_reorder_failure(settings: &mut Settings, raw: &str) {
    match raw.parse::<ReorderFailurePolicy>() {
        Ok(policy) => settings.reorder_failure = policy,
        Err(err) => warn!(error = %err, "config: keeping reorder failure policy"),
    }
}

/// Turns user input such as `localhost:8080/` or
/// `https://host/api/tasks` into the API base URL.
pub fn prepare_base_url(raw_base_url: &str) -> anyhow::Result<Url> {
    let normalized = normalize_base_url(raw_base_url);
    Url::parse(&normalized).with_context(|| format!("invalid api base url '{raw_base_url}'"))
}

fn normalize_base_url(raw_base_url: &str) -> String {
    let raw_base_url = raw_base_url.trim();

    if raw_base_url.is_empty() {
        return Settings::default().api_base_url;
    }

    let with_scheme = if raw_base_url.contains("://") {
        raw_base_url.to_string()
    } else {
        format!("http://{raw_base_url}")
    };

    let trimmed = with_scheme.trim_end_matches('/');
    trimmed
        .strip_suffix(shared::protocol::tasks_route())
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
