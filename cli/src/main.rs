//! CLI entrypoint for ollama-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chat_application::{ListModelsUseCase, RespondUseCase};
use chat_infrastructure::{ConfigLoader, FileConfig, OllamaModelServer};
use chat_presentation::{AppState, Cli, ConsoleFormatter};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };
    apply_overrides(&mut config, &cli);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        println!("Effective configuration:");
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    config.validate().context("Invalid configuration")?;
    let chat_config = config.to_chat_config()?;

    info!("Starting ollama-chat");

    // === Dependency Injection ===
    let settings = config.ollama_settings();
    let server = Arc::new(OllamaModelServer::new(&settings)?);

    // The chat is useless without a reachable server, so this is fatal
    let catalog = match ListModelsUseCase::new(server.clone())
        .execute(chat_config.default_model.clone())
        .await
    {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("{}", ConsoleFormatter::error(&e.to_string()));
            std::process::exit(1);
        }
    };

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to listen on {}", config.bind_address()))?;

    println!(
        "{}",
        ConsoleFormatter::banner(
            &display_url(&config.web.host, config.web.port),
            server.base_url(),
            &catalog,
        )
    );

    let state = AppState::new(RespondUseCase::new(server, chat_config), catalog);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C, shutting down");
            }
            shutdown.cancel();
        }
    });

    chat_presentation::serve(listener, state, shutdown).await?;
    println!("Bye!");

    Ok(())
}

/// Initialize logging based on verbosity level.
///
/// Without `-v`, `RUST_LOG` is honoured and defaults to `warn`.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let Some(file_name) = path.file_name() else {
                bail!("--log-file must name a file, got {}", path.display());
            };
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Command-line flags win over every config source
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.web.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(url) = &cli.server_url {
        config.server.url = url.clone();
    }
    if let Some(model) = &cli.model {
        config.chat.default_model = model.clone();
    }
    if let Some(model) = &cli.fallback_model {
        config.chat.fallback_model = model.clone();
    }
}

/// Address to print for the user; a wildcard bind is reachable on loopback
fn display_url(host: &str, port: u16) -> String {
    let host = match host {
        "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
        other => other,
    };
    format!("http://{host}:{port}")
}
