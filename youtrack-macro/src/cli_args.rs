use std::path::PathBuf;

use clap::Parser;
use youtrack_domain::{Result, YouTrackError};
use youtrack_macro::MacroParameters;

/// Render YouTrack issues as XWiki 2.1 syntax.
#[derive(Debug, Parser)]
#[command(name = "youtrack-macro", version)]
pub struct CliArgs {
    /// Macro content: issue ids, one per line (`ID|note`), or a query.
    /// Read from stdin when omitted.
    pub content: Option<String>,

    /// Configured server id
    #[arg(long)]
    pub id: Option<String>,

    /// Server URL, overrides --id
    #[arg(long)]
    pub url: Option<String>,

    /// Data source: list, jql or search
    #[arg(long)]
    pub source: Option<String>,

    /// Display style: table, list or enum
    #[arg(long)]
    pub style: Option<String>,

    /// Fields as `id[:label][!type]`, comma separated
    #[arg(long)]
    pub fields: Option<String>,

    /// Maximum number of issues returned by queries, -1 for no limit
    #[arg(long, allow_hyphen_values = true)]
    pub max_count: Option<String>,

    /// Extra macro parameter, e.g. `field.url.label=Open`
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Configuration file, defaults to $YOUTRACK_MACRO_CONFIG_FILE or ~/.config/youtrack-macro/config.yaml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Render failures as an inline error
    #[arg(long)]
    pub inline: bool,

    /// Page the macro lives on, used for the render id
    #[arg(long)]
    pub page: Option<String>,
}

impl CliArgs {
    pub fn parameters(&self) -> Result<MacroParameters> {
        let named = [
            ("id", &self.id),
            ("url", &self.url),
            ("source", &self.source),
            ("style", &self.style),
            ("fields", &self.fields),
            ("maxCount", &self.max_count),
        ];
        let pairs = named
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|value| (key.to_string(), value)))
            .chain(self.params.iter().cloned());
        MacroParameters::from_pairs(pairs)
    }
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn missing_content() -> YouTrackError {
    YouTrackError::input("no macro content given on the command line or stdin")
}
