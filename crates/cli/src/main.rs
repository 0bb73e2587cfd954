mod repl;

use std::{path::PathBuf, sync::Arc};

use {
    cahbot_commands::{CommandHandler, LoggingEngine, StaticPermissions, format_pack_list},
    cahbot_config::CahConfig,
    cahbot_packs::{PackCatalog, StaticCatalog},
    cahbot_sessions::GameRegistry,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "cahbot", about = "cahbot: Cards Against Humanity for chat channels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of the standard locations.
    #[arg(long, global = true, env = "CAHBOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read chat lines from stdin and answer them.
    ///
    /// Each line is `<guild> <channel> <user> <name> <message...>`.
    Repl,
    /// List the available card packs.
    Packs,
    /// Print the effective configuration.
    Config,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // Logs go to stderr so replies on stdout stay clean.
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CahConfig> {
    match &cli.config {
        Some(path) => cahbot_config::load_config(path),
        None => Ok(cahbot_config::discover_and_load()),
    }
}

/// Wire the registry and command surface from config.
fn build_handler(config: &CahConfig) -> CommandHandler {
    let catalog: Arc<dyn PackCatalog> = Arc::new(StaticCatalog::from_config(&config.packs));
    let registry =
        Arc::new(GameRegistry::new(catalog).with_max_players(config.games.max_players));
    CommandHandler::new(
        registry,
        Arc::new(LoggingEngine),
        Arc::new(StaticPermissions::from_config(&config.permissions)),
        config.games.command_prefix.clone(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "cahbot starting");
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Repl => {
            #[cfg(feature = "prometheus")]
            let metrics = cahbot_metrics::install_prometheus()?;

            let handler = build_handler(&config);
            repl::run(&handler, tokio::io::stdin(), tokio::io::stdout()).await?;

            #[cfg(feature = "prometheus")]
            tracing::debug!(metrics = %metrics.render(), "final metrics");
            Ok(())
        },
        Commands::Packs => {
            let catalog = StaticCatalog::from_config(&config.packs);
            print!("{}", format_pack_list(&catalog.list()));
            Ok(())
        },
        Commands::Config => {
            let toml_str = toml::to_string_pretty(&config)
                .map_err(|e| anyhow::anyhow!("serialize config: {e}"))?;
            print!("{toml_str}");
            Ok(())
        },
    }
}
