//! weft: cross-cutting interception demo
//!
//! Runs the tutorial order flow (controller → service → repository) through
//! the interception engine, with every layer proxied by a trace advisor.

mod app;
mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::Config;
use weft_trace::{JsonlSink, LogSink, LogTrace, TraceSink};

#[derive(Parser)]
#[command(name = "weft", version, about = "Cross-cutting interception demo")]
struct Cli {
    /// Path to the config file (defaults to ./weft.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for rolling log files; logs to stderr only when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute one request through the proxied order stack.
    Run {
        /// Item id to order; "ex" simulates a failing target.
        #[arg(long, default_value = "itemA")]
        item_id: String,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_dir.as_deref());

    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Run { item_id } => run(&config, &item_id).await,
        Command::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn init_logging(log_dir: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "weft.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
            None
        }
    }
}

async fn run(config: &Config, item_id: &str) -> Result<()> {
    let sink: Arc<dyn TraceSink> = match &config.trace.output {
        Some(path) => Arc::new(JsonlSink::new(path)?),
        None => Arc::new(LogSink),
    };
    let trace = LogTrace::with_sink(sink);

    let controller = app::build_app(trace, config)?;

    match controller.call("request", serde_json::json!(item_id)).await {
        Ok(_) => {
            info!(item_id, "request completed");
            println!("ok");
            Ok(())
        }
        Err(err) => {
            info!(item_id, error = %err, "request failed");
            println!("error: {err}");
            Err(err.into())
        }
    }
}
