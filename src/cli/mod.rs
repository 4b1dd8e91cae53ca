mod auth;
mod run;
mod show;

use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "storage-quickstart")]
#[command(about = "Upload a file to Cloud Storage and read it back", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Token cache file
    #[arg(long, global = true, default_value = "cache.json")]
    pub cache: PathBuf,

    /// Authorization code from the consent page
    #[arg(long, global = true, default_value = "")]
    pub code: String,

    /// Config file (defaults to the XDG config location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Delete the token cache before authenticating
    #[arg(long, global = true)]
    pub reset: bool,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            None => run::execute(&self.options).await,
            Some(Commands::Auth) => auth::execute(&self.options).await,
            Some(Commands::Show { resource }) => resource.execute(&self.options).await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a credential without touching storage
    Auth,
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}
