use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};
use youtrack_domain::{ServerRecord, YouTrackError};

/// Server mappings and rendering flags supplied by the host wiki.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct YouTrackConfig {
    pub servers: BTreeMap<String, ServerRecord>,
    pub async_rendering: bool,
}

#[derive(Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    general: RawGeneral,
    #[serde(default)]
    servers: Vec<RawServer>,
}

#[derive(Default, Deserialize)]
struct RawGeneral {
    #[serde(rename = "async")]
    async_rendering: Option<bool>,
}

#[derive(Default, Deserialize)]
struct RawServer {
    id: Option<String>,
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl YouTrackConfig {
    pub fn load_default() -> Result<Self> {
        Self::load_from_path(&default_config_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let payload = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let raw: RawConfig =
            serde_yaml::from_str(&payload).with_context(|| "invalid YAML config format")?;
        let config = Self::from_raw(raw);
        debug!(
            path = %path.display(),
            servers = config.servers.len(),
            "loaded YouTrack configuration"
        );
        Ok(config)
    }

    /// Resolves the server to use for one macro call.
    ///
    /// An explicit URL always wins: credentials are recovered from a
    /// configured server with the same URL, otherwise the server is used
    /// anonymously. Without a URL the id must name a configured server.
    pub fn resolve_server(
        &self,
        explicit_url: Option<&str>,
        server_id: Option<&str>,
    ) -> Result<ServerRecord, YouTrackError> {
        if let Some(url) = explicit_url.and_then(non_empty_str) {
            let wanted = url.trim_end_matches('/');
            return Ok(self
                .servers
                .values()
                .find(|server| server.url() == url || server.url() == wanted)
                .cloned()
                .unwrap_or_else(|| ServerRecord::anonymous(url)));
        }

        let Some(id) = server_id.and_then(non_empty_str) else {
            return Err(YouTrackError::configuration(
                "No YouTrack Server found. You must specify a YouTrack server, using the \"url\" \
                 macro parameter or using the \"id\" macro parameter to reference a server defined \
                 in the YouTrack Macro configuration.",
            ));
        };

        self.servers.get(id).cloned().ok_or_else(|| {
            YouTrackError::configuration(format!(
                "The YouTrack Server id [{id}] is not defined in the macro's configuration. \
                 Please fix the id or add a new server in the YouTrack Macro configuration."
            ))
        })
    }

    fn from_raw(raw: RawConfig) -> Self {
        let servers = raw
            .servers
            .into_iter()
            .filter_map(|server| {
                let id = server.id.and_then(non_empty)?;
                let url = server.url.and_then(normalize_server_url)?;
                let username = server.username.and_then(non_empty);
                let password = server.password.and_then(resolve_password);
                Some((id, ServerRecord::new(url, username.as_deref(), password.as_deref())))
            })
            .collect();

        Self {
            servers,
            async_rendering: raw.general.async_rendering.unwrap_or(false),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(override_path) = env::var_os("YOUTRACK_MACRO_CONFIG_FILE") {
        return PathBuf::from(override_path);
    }

    let mut base = env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.push(".config");
    base.push("youtrack-macro");
    base.push("config.yaml");
    base
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn non_empty_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed)
}

fn normalize_server_url(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Some(trimmed.trim_end_matches('/').to_string())
    } else {
        Some(format!("https://{}", trimmed.trim_end_matches('/')))
    }
}

fn resolve_password(value: String) -> Option<String> {
    resolve_password_with(value, fetch_secret_from_manager)
}

fn resolve_password_with<F>(value: String, fetch: F) -> Option<String>
where
    F: Fn(&str, &str) -> Option<String>,
{
    let password = non_empty(value)?;
    let Some((provider, key)) = parse_secret_reference(password.as_str()) else {
        return Some(password);
    };
    let secret = fetch(provider, key);
    if secret.is_none() {
        warn!(provider, key, "secret lookup failed, server will be used anonymously");
    }
    secret
}

fn parse_secret_reference(value: &str) -> Option<(&str, &str)> {
    let (provider, key) = value.split_once("::")?;
    if key.trim().is_empty() {
        return None;
    }
    if provider == "pass" || provider == "passage" {
        Some((provider, key.trim()))
    } else {
        None
    }
}

fn fetch_secret_from_manager(provider: &str, key: &str) -> Option<String> {
    let output = Command::new(provider).arg("show").arg(key).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    non_empty(stdout.trim().to_string())
}
