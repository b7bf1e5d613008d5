// src/config.rs

//! Manages server configuration: loading, defaults, validation and the CLI port contract.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_ENV_VAR: &str = "FTSERVE_CONFIG";

/// The lowest port accepted on the command line.
pub const MIN_PORT: u32 = 1024;
/// The highest port accepted on the command line.
pub const MAX_PORT: u32 = 65535;

/// A raw representation of the config file before validation.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_root")]
    root: PathBuf,
    #[serde(default = "default_max_message_size")]
    max_message_size: usize,
    #[serde(default = "default_linger_timeout_ms")]
    linger_timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    30021
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_max_message_size() -> usize {
    64 * 1024 * 1024 // 64 MB
}
fn default_linger_timeout_ms() -> u64 {
    1000
}

/// Represents the final, validated server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address both the control listener and every data listener bind to.
    pub host: String,
    /// The control port.
    pub port: u16,
    pub log_level: String,
    /// The directory whose entries are listed and served.
    pub root: PathBuf,
    /// The largest payload read from a peer or sent to one.
    pub max_message_size: usize,
    /// How long a closing session waits for the peer to finish sending.
    pub linger_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            root: default_root(),
            max_message_size: default_max_message_size(),
            linger_timeout_ms: default_linger_timeout_ms(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid configuration in '{path}'"))
    }

    /// Builds the runtime configuration: the optional file's settings, then the
    /// command-line port on top, validated together.
    pub fn load(path: Option<&str>, port: u16) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.port = port;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text, filling unspecified fields with
    /// defaults. The result is not validated; see `load`.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let raw_config: RawConfig =
            toml::from_str(contents).context("Failed to parse configuration TOML")?;

        let config = Config {
            host: raw_config.host,
            port: raw_config.port,
            log_level: raw_config.log_level,
            root: raw_config.root,
            max_message_size: raw_config.max_message_size,
            linger_timeout_ms: raw_config.linger_timeout_ms,
        };

        Ok(config)
    }

    /// Validates the configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if u32::from(self.port) < MIN_PORT {
            return Err(anyhow!(
                "port must be between {MIN_PORT} and {MAX_PORT}, got {}",
                self.port
            ));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.max_message_size == 0 {
            return Err(anyhow!("max_message_size cannot be 0"));
        }
        if self.max_message_size > u32::MAX as usize {
            return Err(anyhow!(
                "max_message_size cannot exceed {} bytes (4-byte length header)",
                u32::MAX
            ));
        }
        if !self.root.is_dir() {
            return Err(anyhow!(
                "root '{}' does not exist or is not a directory",
                self.root.display()
            ));
        }
        Ok(())
    }
}

/// Parses a port argument, accepting only integers in `[MIN_PORT, MAX_PORT]`.
pub fn parse_port(input: &str) -> Result<u16> {
    let port: u32 = input
        .trim()
        .parse()
        .with_context(|| format!("Invalid port number '{input}'"))?;
    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        return Err(anyhow!(
            "Invalid port number {port}. Must be between {MIN_PORT} and {MAX_PORT}."
        ));
    }
    Ok(port as u16)
}
