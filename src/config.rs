//! Configuration management for hindsight-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9121;
pub const DEFAULT_TELEMETRY_PATH: &str = "/metrics";
pub const DEFAULT_HINDSIGHT_PATH: &str = "/hindsight.tsv";

/// Exporter configuration. Every field is optional so that partial config
/// files merge over the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,
    #[serde(alias = "telemetry-path")]
    pub telemetry_path: Option<String>,

    // Source
    #[serde(alias = "hindsight-path")]
    pub hindsight_path: Option<PathBuf>,

    // Feature flags
    pub enable_health: Option<bool>,
    pub enable_telemetry: Option<bool>,

    // Logging
    pub log_level: Option<String>,

    // TLS/SSL Configuration
    #[serde(alias = "enable-tls")]
    pub enable_tls: Option<bool>,
    #[serde(alias = "tls-cert-path")]
    pub tls_cert_path: Option<String>,
    #[serde(alias = "tls-key-path")]
    pub tls_key_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            telemetry_path: Some(DEFAULT_TELEMETRY_PATH.to_string()),
            hindsight_path: Some(PathBuf::from(DEFAULT_HINDSIGHT_PATH)),
            enable_health: Some(true),
            enable_telemetry: Some(true),
            log_level: Some("info".into()),
            enable_tls: Some(false),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Config {
    pub fn telemetry_path(&self) -> &str {
        self.telemetry_path
            .as_deref()
            .unwrap_or(DEFAULT_TELEMETRY_PATH)
    }

    /// Socket address from `bind` and `port`. Works for IPv4 and IPv6 binds.
    pub fn socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        let bind = self.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        let ip: IpAddr = bind
            .parse()
            .map_err(|_| format!("bind '{}' is not an IP address", bind))?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    pub fn hindsight_path(&self) -> &Path {
        self.hindsight_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_HINDSIGHT_PATH))
    }
}

/// Splits a listen address of the form `<ip>:<port>`, `[<ipv6>]:<port>` or
/// `:<port>`. An empty host means "keep the configured bind address".
pub fn parse_listen_address(value: &str) -> Result<(Option<IpAddr>, u16), String> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("listen address '{}' must be <ip>:<port>", value))?;
    let port: u16 = port
        .parse()
        .map_err(|_| format!("listen address '{}' has an invalid port", value))?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Ok((None, port));
    }
    let ip: IpAddr = host
        .parse()
        .map_err(|_| format!("listen address '{}' has an invalid IP '{}'", value, host))?;
    Ok((Some(ip), port))
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    cfg.socket_addr()?;

    let path = cfg.telemetry_path();
    if !path.starts_with('/') {
        return Err(format!("telemetry_path '{}' must start with '/'", path).into());
    }
    if path == "/" || path == "/health" {
        return Err(format!(
            "telemetry_path '{}' collides with a built-in endpoint",
            path
        )
        .into());
    }

    if cfg.hindsight_path().as_os_str().is_empty() {
        return Err("hindsight_path must not be empty".into());
    }

    // TLS validation
    if cfg.enable_tls.unwrap_or(false) {
        let cert_path = cfg.tls_cert_path.as_deref();
        let key_path = cfg.tls_key_path.as_deref();

        match (cert_path, key_path) {
            (None, None) => {
                return Err(
                    "TLS is enabled but neither tls_cert_path nor tls_key_path are set".into(),
                );
            }
            (Some(_), None) => {
                return Err("TLS is enabled but tls_key_path is not set".into());
            }
            (None, Some(_)) => {
                return Err("TLS is enabled but tls_cert_path is not set".into());
            }
            (Some(cert), Some(key)) => {
                check_pem_file(cert, "certificate")?;
                check_pem_file(key, "private key")?;
            }
        }
    }

    Ok(())
}

/// Checks that a TLS file exists, is readable and not empty.
fn check_pem_file(path: &str, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => Err(format!("TLS {} file is empty: {}", what, path).into()),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("TLS {} file not found: {}", what, path).into())
        }
        Err(e) => Err(format!("TLS {} file is not readable: {} ({})", what, path, e).into()),
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(listen) = &args.listen_address {
        let (ip, port) = parse_listen_address(listen)?;
        if let Some(ip) = ip {
            config.bind = Some(ip.to_string());
        }
        config.port = Some(port);
    }
    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }
    if let Some(path) = &args.telemetry_path {
        config.telemetry_path = Some(path.clone());
    }
    if let Some(path) = &args.hindsight {
        config.hindsight_path = Some(path.clone());
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if args.disable_telemetry {
        config.enable_telemetry = Some(false);
    }

    // TLS configuration: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = Some(true);
    }
    if let Some(cert_path) = &args.tls_cert {
        config.tls_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.tls_key {
        config.tls_key_path = Some(key_path.to_string_lossy().to_string());
    }

    Ok(config)
}

/// Loads a config file, falling back to default locations and then defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let defaults = [
                "/etc/hindsight-exporter/config.yaml",
                "/etc/hindsight-exporter/config.yml",
                "/etc/hindsight-exporter/config.json",
                "./hindsight-exporter.yaml",
                "./hindsight-exporter.yml",
                "./hindsight-exporter.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    if !path.exists() {
        return Err(format!("Config file not found: {}", path.display()).into());
    }

    let content = fs::read_to_string(&path)?;
    let config = parse_config(&content, path.extension().and_then(|s| s.to_str()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config text by file extension, YAML unless told otherwise.
fn parse_config(content: &str, extension: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let loaded: Config = match extension {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(merge_defaults(loaded))
}

/// Fills fields the file left out with their defaults.
fn merge_defaults(loaded: Config) -> Config {
    let defaults = Config::default();
    Config {
        port: loaded.port.or(defaults.port),
        bind: loaded.bind.or(defaults.bind),
        telemetry_path: loaded.telemetry_path.or(defaults.telemetry_path),
        hindsight_path: loaded.hindsight_path.or(defaults.hindsight_path),
        enable_health: loaded.enable_health.or(defaults.enable_health),
        enable_telemetry: loaded.enable_telemetry.or(defaults.enable_telemetry),
        log_level: loaded.log_level.or(defaults.log_level),
        enable_tls: loaded.enable_tls.or(defaults.enable_tls),
        tls_cert_path: loaded.tls_cert_path,
        tls_key_path: loaded.tls_key_path,
    }
}

/// Renders configuration in the requested format.
pub fn render_config(config: &Config, format: ConfigFormat) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, format)?);
    Ok(())
}
