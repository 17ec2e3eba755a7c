//! codereview server binary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use codereview_server::{ServerConfig, cli, run_with_shutdown};

/// AI code review service
#[derive(Parser)]
#[command(name = "codereview-server")]
#[command(about = "AI-assisted code review over HTTP, GitHub webhooks, or the terminal")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file path (JSON). Environment variables are used otherwise.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve {
        /// Listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Review a file and print the markdown feedback
    Analyze {
        /// File to review, or `-` for stdin
        input: PathBuf,

        /// Language hint (detected from the extension when omitted)
        #[arg(short, long)]
        language: Option<String>,

        /// Skip every provider and use the rule-based scanner only
        #[arg(long)]
        offline: bool,
    },
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout is reserved for `analyze` output.
    if json {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load(path),
        None => ServerConfig::from_env(),
    }
}

async fn shutdown_signal(shutdown_timeout: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    info!(
        "Waiting up to {}s for in-flight requests to complete...",
        shutdown_timeout
    );
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    setup_logging(&args.log_level, args.json_logs);

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let mut config = match load_config(args.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match args.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }

            info!("Press Ctrl+C to stop");
            let shutdown = shutdown_signal(config.shutdown_timeout);

            if let Err(e) = run_with_shutdown(config, shutdown).await {
                error!("Server error: {}", e);
                return ExitCode::FAILURE;
            }

            info!("Server stopped");
        }
        Command::Analyze {
            input,
            language,
            offline,
        } => match cli::analyze_source(&config, &input, language, offline).await {
            Ok(markdown) => println!("{markdown}"),
            Err(e) => {
                error!("Analysis failed: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}
