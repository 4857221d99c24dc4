//! TOML-based configuration for the desktop daemon.
//!
//! The config file lives in the platform config directory:
//! - Windows:  `%APPDATA%\WristRelay\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/wristrelay/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/WristRelay/config.toml`
//!
//! ```toml
//! [desktop]
//! host_name = "studio-mac"
//! log_level = "info"
//! dry_run = false
//!
//! [network]
//! bind_address = "0.0.0.0"
//! session_port = 47801
//! discovery_port = 47800
//!
//! [input]
//! scroll_lines = 5
//! ```
//!
//! Every field and every section is optional; missing values take their
//! defaults, so an empty or absent file is a valid configuration.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use relay_core::domain::actions::DEFAULT_SCROLL_LINES;
use relay_core::protocol::discovery::{DEFAULT_DISCOVERY_PORT, DEFAULT_SESSION_PORT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `network.bind_address` is not an IP address.
    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    /// `input.scroll_lines` must be at least 1.
    #[error("scroll_lines must be at least 1")]
    InvalidScrollLines,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level daemon configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub desktop: DesktopConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// General daemon behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesktopConfig {
    /// Name advertised to companions during discovery.
    #[serde(default = "default_host_name")]
    pub host_name: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log simulated input instead of posting it.
    #[serde(default)]
    pub dry_run: bool,
}

/// Socket settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// IP address to bind both sockets to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// TCP port for the command session.
    #[serde(default = "default_session_port")]
    pub session_port: u16,
    /// UDP port for discovery probes.
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,
}

/// Simulated input tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Wheel lines per scroll gesture.
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u32,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host_name() -> String {
    system_host_name().unwrap_or_else(|| "WristRelay Desktop".to_string())
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_session_port() -> u16 {
    DEFAULT_SESSION_PORT
}
fn default_discovery_port() -> u16 {
    DEFAULT_DISCOVERY_PORT
}
fn default_scroll_lines() -> u32 {
    DEFAULT_SCROLL_LINES
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            session_port: default_session_port(),
            discovery_port: default_discovery_port(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            scroll_lines: default_scroll_lines(),
        }
    }
}

impl AppConfig {
    /// Parses `network.bind_address`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddress`] if it is not an IP address.
    pub fn bind_ip(&self) -> Result<IpAddr, ConfigError> {
        self.network
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.network.bind_address.clone()))
    }

    /// Checks values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_ip()?;
        if self.input.scroll_lines == 0 {
            return Err(ConfigError::InvalidScrollLines);
        }
        Ok(())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the default location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// The machine's user-facing name, as the OS reports it.
///
/// macOS: the "Computer Name" from Sharing settings.  Linux: the kernel host
/// name.  Windows: `COMPUTERNAME`.  `HOSTNAME` is the last resort everywhere.
fn system_host_name() -> Option<String> {
    fn non_empty(s: &str) -> Option<String> {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    }

    #[cfg(target_os = "macos")]
    let native = std::process::Command::new("scutil")
        .args(["--get", "ComputerName"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| non_empty(&String::from_utf8_lossy(&out.stdout)));

    #[cfg(target_os = "linux")]
    let native = std::fs::read_to_string("/proc/sys/kernel/hostname")
        .or_else(|_| std::fs::read_to_string("/etc/hostname"))
        .ok()
        .and_then(|s| non_empty(&s));

    #[cfg(target_os = "windows")]
    let native = std::env::var("COMPUTERNAME").ok().and_then(|s| non_empty(&s));

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    let native: Option<String> = None;

    native.or_else(|| std::env::var("HOSTNAME").ok().and_then(|s| non_empty(&s)))
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("WristRelay"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("wristrelay"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("WristRelay")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
