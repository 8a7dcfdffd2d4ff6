pub mod cli;
pub mod client;
pub mod config;
pub mod conversion_client;
pub mod core;
pub mod providers;
pub mod server;
pub mod widget;

use crate::core::Currency;
use anyhow::Result;
use tracing::debug;

pub enum AppCommand {
    Serve,
    Convert {
        amount: Option<String>,
        from: Option<Currency>,
        to: Option<Currency>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    }
    .with_env();
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Serve => server::run(&config).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&config, amount, from, to).await
        }
    }
}
