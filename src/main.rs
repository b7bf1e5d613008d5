// src/main.rs

//! The main entry point for the ftserve file transfer server.

use anyhow::Result;
use ftserve::config::{self, CONFIG_ENV_VAR, Config};
use ftserve::server;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, prelude::*};

const USAGE: &str = "Usage: ftserve [PORT NUMBER]";

#[tokio::main]
async fn main() -> Result<()> {
    run_app().await
}

async fn run_app() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--version".to_string()) {
        println!("ftserve version {VERSION}");
        return Ok(());
    }

    // Exactly one argument: the control port.
    if args.len() != 2 {
        eprintln!("Invalid number of arguments. {USAGE}");
        std::process::exit(1);
    }
    let port = match config::parse_port(&args[1]) {
        Ok(port) => port,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // An optional configuration file supplies everything except the port.
    let config_path = env::var(CONFIG_ENV_VAR).ok();
    let config = match Config::load(config_path.as_deref(), port) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            std::process::exit(1);
        }
    };

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact() // Use the compact, single-line format.
                .with_ansi(true),
        )
        .init();

    info!("ftserve {} starting", VERSION);

    if let Err(e) = server::run(config).await {
        error!("Server runtime error: {:#}", e);
        eprintln!("Error. {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
