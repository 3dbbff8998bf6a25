use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use client_core::{FormOptions, ReconcilePolicy, DEFAULT_REQUEST_TIMEOUT};
use serde::Deserialize;
use shared::domain::{RoomLabels, DEFAULT_TOTAL_RENT, ROOM_COUNT};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "rentsplit.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub total_rent: f64,
    pub policy: ReconcilePolicy,
    pub room_labels: RoomLabels,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            total_rent: DEFAULT_TOTAL_RENT,
            policy: ReconcilePolicy::AutoBalance,
            room_labels: RoomLabels::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl Settings {
    pub fn form_options(&self) -> FormOptions {
        FormOptions {
            total_rent: self.total_rent,
            policy: self.policy,
            room_labels: self.room_labels.clone(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        Url::parse(&self.server_url)
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        if !self.total_rent.is_finite() || self.total_rent <= 0.0 {
            return Err(anyhow!(
                "total rent must be a positive amount, got {}",
                self.total_rent
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(anyhow!("request timeout must be at least one second"));
        }
        if self.poll_interval.is_zero() {
            return Err(anyhow!("poll interval must be at least one second"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    total_rent: Option<f64>,
    policy: Option<ReconcilePolicy>,
    room_labels: Option<[String; ROOM_COUNT]>,
    request_timeout_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
}

/// Defaults, then the config file, then `RENTSPLIT_*` environment variables.
///
/// An explicitly named file must exist; the default `rentsplit.toml` is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if explicit_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file.total_rent {
        settings.total_rent = v;
    }
    if let Some(v) = file.policy {
        settings.policy = v;
    }
    if let Some(v) = file.room_labels {
        settings.room_labels = RoomLabels(v);
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file.poll_interval_secs {
        settings.poll_interval = Duration::from_secs(v);
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("RENTSPLIT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("RENTSPLIT_TOTAL_RENT") {
        settings.total_rent = v
            .trim()
            .parse()
            .with_context(|| format!("RENTSPLIT_TOTAL_RENT is not a number: '{v}'"))?;
    }
    if let Some(v) = lookup("RENTSPLIT_POLICY") {
        settings.policy = v.parse().map_err(|err: String| anyhow!("RENTSPLIT_POLICY: {err}"))?;
    }
    if let Some(v) = lookup("RENTSPLIT_TIMEOUT_SECS") {
        let secs: u64 = v
            .trim()
            .parse()
            .with_context(|| format!("RENTSPLIT_TIMEOUT_SECS is not a number: '{v}'"))?;
        settings.request_timeout = Duration::from_secs(secs);
    }
    if let Some(v) = lookup("RENTSPLIT_POLL_SECS") {
        let secs: u64 = v
            .trim()
            .parse()
            .with_context(|| format!("RENTSPLIT_POLL_SECS is not a number: '{v}'"))?;
        settings.poll_interval = Duration::from_secs(secs);
    }
    Ok(())
}
