//! Daemon configuration.
//!
//! Settings resolve in layers, later layers winning:
//! built-in defaults, then an optional TOML file, then the
//! `HUBD_ADDR` environment variable, then CLI flags.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding the listen address (`ip:port`).
pub const ADDR_ENV_VAR: &str = "HUBD_ADDR";

/// Default listen port, matching the classic chat-room port.
pub const DEFAULT_PORT: u16 = 9001;

/// Default cap on one inbound line (64 KiB). A peer exceeding it has
/// only its own session closed.
pub const DEFAULT_MAX_LINE_LEN: usize = 65_536;

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubConfig {
    /// Interface to listen on.
    pub bind: IpAddr,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum accepted length of one inbound line, in bytes.
    pub max_line_len: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl HubConfig {
    /// The socket address the acceptor binds.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Resolves the effective configuration from all layers.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Read` / `ConfigError::Parse` for a bad file
    /// - `ConfigError::InvalidAddr` if `HUBD_ADDR` is set but is not
    ///   a valid `ip:port`
    pub fn resolve(
        file: Option<&Path>,
        bind: Option<IpAddr>,
        port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(addr) = env::var(ADDR_ENV_VAR) {
            let parsed: SocketAddr = addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddr(addr.clone()))?;
            config.bind = parsed.ip();
            config.port = parsed.port();
        }

        if let Some(bind) = bind {
            config.bind = bind;
        }
        if let Some(port) = port {
            config.port = port;
        }

        Ok(config)
    }
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {error}")]
    Read { path: PathBuf, error: String },

    #[error("failed to parse config file {path}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("invalid {ADDR_ENV_VAR} value {0:?} (expected ip:port)")]
    InvalidAddr(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.max_line_len, DEFAULT_MAX_LINE_LEN);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9001");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "bind = \"127.0.0.1\"\nport = 4242").expect("write config");

        let config = HubConfig::from_file(file.path()).expect("load config");
        assert_eq!(config.bind, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 4242);
        // Unspecified fields keep their defaults.
        assert_eq!(config.max_line_len, DEFAULT_MAX_LINE_LEN);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "listen_port = 4242").expect("write config");

        let err = HubConfig::from_file(file.path());
        assert!(matches!(err, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = HubConfig::from_file(Path::new("/nonexistent/hubd.toml"));
        assert!(matches!(err, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_cli_flags_win() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "port = 4242").expect("write config");

        let config = HubConfig::resolve(Some(file.path()), None, Some(5353)).expect("resolve");
        assert_eq!(config.port, 5353);
    }
}
