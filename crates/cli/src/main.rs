mod doctor_commands;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use {
    clap::{Parser, Subcommand},
    relay_channels::SourceFilter,
    relay_config::{Severity, validate},
    relay_discord::WebhookSink,
    relay_routing::Router,
    tracing::{debug, error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "relay",
    about = "Relay bot announcements from a Discord channel to webhooks"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Env file loaded before reading configuration. A missing file is fine.
    #[arg(long, global = true, env = "RELAY_ENV_FILE", default_value = ".env")]
    env_file: PathBuf,

    /// Base directory for relative `LIST_<NAME>` paths (defaults to the
    /// directory of the executable).
    #[arg(long, global = true, env = "RELAY_LISTS_DIR")]
    lists_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and relay messages (default when no subcommand is provided).
    Run,
    /// Check configuration and identifier lists without connecting.
    Doctor,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The env file may set RUST_LOG, so load it before the subscriber.
    let env_loaded = relay_config::load_env_file(&cli.env_file);
    init_telemetry(&cli);
    if env_loaded? {
        debug!(path = %cli.env_file.display(), "loaded env file");
    }

    let base_dir = cli
        .lists_dir
        .clone()
        .unwrap_or_else(relay_config::default_base_dir);

    match cli.command {
        None | Some(Commands::Run) => run(&base_dir).await,
        Some(Commands::Doctor) => {
            let (errors, _warnings) = doctor_commands::handle_doctor(&base_dir)?;
            if errors > 0 {
                std::process::exit(1);
            }
            Ok(())
        },
    }
}

async fn run(base_dir: &Path) -> anyhow::Result<()> {
    let config = relay_config::from_env(base_dir)?;
    debug!(?config, "configuration loaded");

    // Missing lists and webhooks are reported while building the registry;
    // only hard errors are worth repeating here.
    for d in validate::validate(&config)
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
    {
        error!(var = %d.path, category = d.category, "{}", d.message);
    }

    let registry = relay_routing::build_registry(&config)?;
    info!(destinations = registry.len(), "routing table ready");

    let sink = WebhookSink::new(Duration::from_secs(config.delivery_timeout_secs))?;
    let router = Arc::new(Router::new(
        SourceFilter::new(config.source_channel_id),
        registry,
        Arc::new(sink),
    ));

    relay_discord::run(&config, router).await?;
    info!("relay stopped");
    Ok(())
}
