use std::path::PathBuf;
use std::sync::Arc;

use eyre::Result;
use log::{info, warn};

use ytsum::config::{API_KEY_ENV, AppConfig, Config};
use ytsum::format::MarkerFormatter;
use ytsum::pipeline::Pipeline;
use ytsum::summarize::GeminiClient;
use ytsum::youtube::YouTubeCaptions;

mod cli;

use cli::Cli;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = if std::env::var(API_KEY_ENV).is_ok_and(|k| !k.trim().is_empty()) {
        format!("  \x1b[32m✅\x1b[0m {API_KEY_ENV}")
    } else {
        format!("  \x1b[31m❌\x1b[0m {API_KEY_ENV}  (not set, needed for summarization)")
    };

    let log_path = log_dir().join("ytsum.log");

    format!(
        "\nREQUIRED ENVIRONMENT:\n{key_line}\n\nConfig file: {}\nLogs are written to: {}",
        ytsum::config::config_path().display(),
        log_path.display()
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let file_config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file {}: {e}", ytsum::config::config_path().display());
        Config::default()
    });

    let config = AppConfig::resolve(cli.overrides(), file_config, std::env::var(API_KEY_ENV).ok())?;
    info!("Resolved {config:?}");

    let client = reqwest::Client::builder().timeout(config.request_timeout).build()?;

    let pipeline = Pipeline::new(
        Arc::new(YouTubeCaptions::new(client.clone(), config.lang.clone())),
        Arc::new(GeminiClient::new(client, config.api_key.clone(), config.model.clone())),
        Arc::new(MarkerFormatter),
    );
    let app = ytsum::server::router(Arc::new(pipeline));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;
    info!("Listening on {addr}");

    if cli.verbose {
        eprintln!(
            "Listening on http://{addr}\nModel: {}\nCaption language: {}\nUpstream timeout: {:?}\nLogs: {}",
            config.model,
            config.lang,
            config.request_timeout,
            log_dir().join("ytsum.log").display(),
        );
    }

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}
