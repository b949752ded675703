//! Show the effective configuration

use anyhow::Result;
use nutritrack_core::config::Config;
use owo_colors::OwoColorize;

pub fn run(config: &Config) -> Result<()> {
    let source = config
        .path
        .as_ref()
        .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
    println!("{}", format!("# source: {source}").dimmed());
    print!("{}", config.to_toml()?);
    Ok(())
}
