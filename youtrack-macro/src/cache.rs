use youtrack_config::YouTrackConfig;

use crate::parameters::MacroParameters;

const RENDER_ID_PREFIX: [&str; 3] = ["rendering", "macro", "YouTrack"];

/// Whether the host may render the macro asynchronously and cache it.
/// Results are never cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsyncPolicy {
    pub async_allowed: bool,
    pub cache_allowed: bool,
}

impl AsyncPolicy {
    pub fn from_config(config: &YouTrackConfig) -> Self {
        Self {
            async_allowed: config.async_rendering,
            cache_allowed: false,
        }
    }
}

pub fn render_id(
    source: Option<&str>,
    index: usize,
    parameters: &MacroParameters,
    config: &YouTrackConfig,
) -> Vec<String> {
    let server = config.resolve_server(parameters.url.as_deref(), parameters.id.as_deref());
    let (target, username) = match server {
        Ok(server) => (
            server.url().to_string(),
            server.username().unwrap_or_default().to_string(),
        ),
        Err(_) => (parameters.id.clone().unwrap_or_default(), String::new()),
    };

    RENDER_ID_PREFIX
        .iter()
        .map(|part| part.to_string())
        .chain([
            source.map(escape_source).unwrap_or_default(),
            index.to_string(),
            target,
            username,
        ])
        .collect()
}

/// Escapes a page reference so it can be used as one path segment: `_` and
/// `-` are doubled first, then `\` becomes `_` and `/` becomes `-`.
pub fn escape_source(source: &str) -> String {
    let mut escaped = String::with_capacity(source.len());
    for character in source.chars() {
        match character {
            '_' => escaped.push_str("__"),
            '-' => escaped.push_str("--"),
            '\\' => escaped.push('_'),
            '/' => escaped.push('-'),
            other => escaped.push(other),
        }
    }
    escaped
}
