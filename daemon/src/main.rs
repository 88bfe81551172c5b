//! Pushgate - Entry Point
//!
//! HTTP daemon that deploys one application to every foundation of a named
//! environment and reports a single all-or-nothing verdict.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::Context;
use pushgate::app::options::AppOptions;
use pushgate::app::run::run;
use pushgate::deploy::registry::EnvironmentRegistry;
use pushgate::filesys::file::File;
use pushgate::logs::{init_logging, LogOptions};
use pushgate::storage::settings::Settings;
use pushgate::utils::version_info;

use tracing::{error, info, warn};

const CONFIG_ENV_VAR: &str = "PUSHGATE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "/etc/pushgate/config.json";

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let mut cli_args: HashMap<String, String> = HashMap::new();
    for arg in env::args().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Failed to render version: {e}"),
        }
        return;
    }

    if let Err(e) = run_daemon(&cli_args).await {
        error!("Failed to run pushgate: {e:#}");
        eprintln!("pushgate: {e:#}");
        std::process::exit(1);
    }
}

async fn run_daemon(cli_args: &HashMap<String, String>) -> anyhow::Result<()> {
    // Retrieve the settings file
    let config_path = cli_args
        .get("config")
        .cloned()
        .or_else(|| env::var(CONFIG_ENV_VAR).ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut settings = File::new(&config_path)
        .read_json::<Settings>()
        .await
        .with_context(|| format!("unable to read settings file {:?}", config_path))?;
    settings.apply_env_overrides();

    // Validate only
    if cli_args.contains_key("check-config") {
        let registry = EnvironmentRegistry::from_settings(&settings.environments)?;
        println!(
            "{:?}: {} environment(s), {} webhook(s)",
            config_path,
            registry.len(),
            settings.webhooks.len()
        );
        return Ok(());
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log.level,
        json_format: settings.log.json,
        log_dir: settings.log.dir.clone(),
    };
    let _log_guard = init_logging(log_options).context("failed to initialize logging")?;

    if settings.username.is_empty() {
        warn!("No platform username configured, foundation logins will fail");
    }

    // Run the server
    let options = AppOptions::from(&settings);
    info!(
        "Running pushgate {} on {}:{}",
        version_info().version,
        options.server.host,
        options.server.port
    );
    run(options, await_shutdown_signal()).await?;
    Ok(())
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}
