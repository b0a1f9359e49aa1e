use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

mod billing;
mod cli;
mod core;
mod daemon;
mod monitor;

use crate::core::settings::Settings;
use crate::monitor::ThresholdMonitor;

#[derive(Parser)]
#[command(name = "mofang-bar")]
#[command(author, version, about = "Mofang apartment energy balance monitor")]
struct Cli {
    /// Path to config file (default: ~/.config/mofang-bar/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the balance monitoring daemon
    Daemon {
        /// Send logs to the systemd journal
        #[arg(long)]
        journald: bool,
    },

    /// Show current balances
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Query this contract instead of the configured one
        #[arg(long)]
        contract: Option<u64>,
    },

    /// Run one threshold check and send a reminder if needed
    Check {
        /// Ask the running daemon instead of checking in-process
        #[arg(long)]
        daemon: bool,
    },

    /// Ask the running daemon for the balance report via D-Bus
    Report,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn init_logging(json: bool, journald: bool) -> FilterHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let journald_layer = if journald {
        match tracing_journald::layer() {
            Ok(layer) => Some(layer),
            Err(e) => {
                eprintln!("journald unavailable, logging to stderr only: {}", e);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(journald_layer)
        .init();

    handle
}

/// Raise the filter to `debug` once settings ask for it, unless `RUST_LOG` is set.
fn apply_debug_setting(handle: &FilterHandle, debug: bool, env_filter_set: bool) {
    if !debug || env_filter_set {
        return;
    }
    if let Err(e) = handle.reload(EnvFilter::new("debug")) {
        tracing::warn!(error = %e, "Failed to raise log level to debug");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let journald = matches!(cli.command, Commands::Daemon { journald: true });
    let filter_handle = init_logging(cli.json_logs, journald);

    let mut settings = Settings::load(cli.config.as_deref())?;
    apply_debug_setting(
        &filter_handle,
        settings.debug,
        std::env::var_os(EnvFilter::DEFAULT_ENV).is_some(),
    );
    settings.validate()?;

    match cli.command {
        Commands::Daemon { .. } => {
            let monitor = Arc::new(ThresholdMonitor::from_settings(&settings)?);
            daemon::run(&settings, monitor).await
        }
        Commands::Status { json, contract } => {
            if let Some(contract) = contract {
                settings.contract_code = contract;
            }
            cli::status::run(&settings, json).await
        }
        Commands::Check { daemon } => cli::check::run(&settings, daemon).await,
        Commands::Report => cli::report::run().await,
        Commands::Completions { .. } => Ok(()),
    }
}
