use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ezx::core::Currency;
use ezx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ezx::AppCommand {
    fn from(cmd: Commands) -> ezx::AppCommand {
        match cmd {
            Commands::Serve => ezx::AppCommand::Serve,
            Commands::Convert { amount, from, to } => ezx::AppCommand::Convert { amount, from, to },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

fn parse_currency(s: &str) -> Result<Currency> {
    s.parse()
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the conversion proxy server
    Serve,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        amount: Option<String>,

        /// Source currency code (USD, GBP, EUR)
        #[arg(long, value_parser = parse_currency)]
        from: Option<Currency>,

        /// Target currency code (USD, GBP, EUR)
        #[arg(long, value_parser = parse_currency)]
        to: Option<Currency>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => ezx::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = ezx::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
server:
  bind: "127.0.0.1:8080"

upstream:
  base_url: "https://v6.exchangerate-api.com/v6"

proxy_url: "http://127.0.0.1:8080"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
