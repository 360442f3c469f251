use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

// =============================================================================
// File config (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
// Equivalent ways to set the listen port:
//
//   config.toml:     [server]
//                    port = 8080
//
//   env var:         CANVAS_SERVER__PORT=8080   (double underscore = nesting)
//
//   env var:         PORT=8080                  (conventional platform override)

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Server tuning knobs (lives under `[server]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerFileConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of static assets served for any path not matched by the API.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,
}

impl Default for ServerFileConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            outbound_capacity: default_outbound_capacity(),
            command_capacity: default_command_capacity(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_outbound_capacity() -> usize {
    1024
}
fn default_command_capacity() -> usize {
    1024
}

/// Defaults layered under an optional TOML file. No environment input.
pub fn file_figment(config_file: Option<&Path>) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let figment = Figment::from(Serialized::defaults(FileConfig::default()));
    match config_file {
        Some(path) => figment.merge(Toml::file(path)),
        None => figment,
    }
}

/// Build a figment that layers: defaults → config.toml → CANVAS_* env vars → PORT.
///
/// Env vars use double-underscore for nesting into sections:
///   `CANVAS_SERVER__HOST=127.0.0.1`  →  `server.host = "127.0.0.1"`
pub fn load_config(config_file: Option<&Path>) -> figment::Figment {
    use figment::providers::Env;

    file_figment(config_file)
        .merge(Env::prefixed("CANVAS_").split("__"))
        .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
}

// =============================================================================
// Runtime config (derived from FileConfig, used throughout the server)
// =============================================================================

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
    /// Per-session outbound queue length before the session counts as lagging
    pub outbound_capacity: usize,
    /// Hub command queue length
    pub command_capacity: usize,
}

impl ServerConfig {
    pub fn from_file(fc: &ServerFileConfig) -> Result<Self> {
        let host: IpAddr = fc
            .host
            .parse()
            .with_context(|| format!("Invalid server host: {}", fc.host))?;

        Ok(Self {
            bind_addr: SocketAddr::new(host, fc.port),
            static_dir: fc.static_dir.clone(),
            outbound_capacity: fc.outbound_capacity.max(1),
            command_capacity: fc.command_capacity.max(1),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let fc = ServerFileConfig::default();
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], fc.port)),
            static_dir: None,
            outbound_capacity: fc.outbound_capacity,
            command_capacity: fc.command_capacity,
        }
    }
}
