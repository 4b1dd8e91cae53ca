use super::GlobalOptions;
use crate::config::Config;
use crate::error::Result;
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// Show configuration and token cache paths
    Paths,
}

impl ShowResource {
    pub async fn execute(&self, options: &GlobalOptions) -> Result<()> {
        match self {
            ShowResource::Paths => show_paths(options),
        }
    }
}

fn show_paths(options: &GlobalOptions) -> Result<()> {
    let config_path = match &options.config {
        Some(path) => path.clone(),
        None => Config::config_file()?,
    };

    info!(path = ?config_path, "Config path");
    info!(path = ?options.cache, "Token cache path");

    Ok(())
}
