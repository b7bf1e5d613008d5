// src/bin/ftclient.rs

//! Command-line client for ftserve.
//!
//! `ftclient HOST SERVER_PORT COMMAND DATA_PORT [FILENAME]`

use anyhow::{Context, Result, anyhow, bail};
use ftserve::client::{self, ClientConfig, Request, Transfer};
use ftserve::config;
use std::env;
use tracing_subscriber::{filter::EnvFilter, prelude::*};

const USAGE: &str = "Usage: ftclient [HOSTNAME] [SERVER PORT] [COMMAND] [DATA PORT] [FILENAME](if -g is chosen)";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 5 || args.len() > 6 {
        eprintln!("Improper number of arguments. {USAGE}");
        std::process::exit(1);
    }

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: &[String]) -> Result<()> {
    let host = &args[1];
    let control_port = config::parse_port(&args[2])?;
    let data_port = config::parse_port(&args[4])?;
    let request = match (args[3].as_str(), args.get(5)) {
        ("-l", None) => Request::List,
        ("-g", Some(filename)) => Request::Get {
            filename: filename.clone(),
        },
        ("-g", None) => bail!("Filename parameter not provided after -g command."),
        (token, _) => Request::Raw {
            token: token.to_string(),
        },
    };

    let client_config = ClientConfig::new(host.clone(), control_port, data_port);
    let transfer = client::execute(&client_config, &request)
        .await
        .with_context(|| format!("Request to {host}:{control_port} failed"))?;

    match (transfer, &request) {
        (Transfer::Listing(listing), _) => println!("{listing}"),
        (Transfer::File(contents), Request::Get { filename }) => {
            let cwd = env::current_dir().context("Failed to read the current directory")?;
            let destination = client::destination_for(&cwd, filename);
            tokio::fs::write(&destination, &contents)
                .await
                .with_context(|| format!("Failed to write {}", destination.display()))?;
            println!(
                "File successfully written to {} ({} bytes).",
                destination.display(),
                contents.len()
            );
        }
        (Transfer::File(_), _) => return Err(anyhow!("Received file data for a non-get request")),
        (Transfer::Refused(message), _) => {
            println!("{host}:{control_port} says {message}");
        }
    }
    Ok(())
}
