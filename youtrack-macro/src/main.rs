mod cli_args;

use std::{
    io::{self, IsTerminal, Read},
    path::Path,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use youtrack_client::HttpFetcher;
use youtrack_config::{default_config_path, YouTrackConfig};
use youtrack_macro::{render::to_xwiki, render_id, AsyncPolicy, MacroParameters, YouTrackMacro};

use crate::cli_args::{missing_content, CliArgs};

fn main() -> Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let parameters = args.parameters()?;
    let config = load_config(&args, &parameters)?;
    let content = read_content(args.content.clone())?;

    debug!(
        render_id = ?render_id(args.page.as_deref(), 0, &parameters, &config),
        policy = ?AsyncPolicy::from_config(&config),
        "prepared YouTrack macro"
    );

    let fetcher = HttpFetcher::new()?;
    let youtrack = YouTrackMacro::new(config, Box::new(fetcher));
    let blocks = youtrack.render(&parameters, &content, args.inline);
    println!("{}", to_xwiki(&blocks));
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// A missing configuration file only matters when no explicit URL names the
/// server.
fn load_config(args: &CliArgs, parameters: &MacroParameters) -> Result<YouTrackConfig> {
    let path = args.config.clone().unwrap_or_else(default_config_path);
    if !path.exists() && parameters.url.is_some() {
        info!(path = %path.display(), "no configuration file, using the explicit URL");
        return Ok(YouTrackConfig::default());
    }
    load_config_file(&path)
}

fn load_config_file(path: &Path) -> Result<YouTrackConfig> {
    YouTrackConfig::load_from_path(path)
        .with_context(|| format!("cannot load YouTrack configuration, pass --url or create {}", path.display()))
}

fn read_content(content: Option<String>) -> Result<String> {
    if let Some(content) = content {
        return Ok(content);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(missing_content().into());
    }
    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .context("failed to read macro content from stdin")?;
    Ok(buffer)
}
