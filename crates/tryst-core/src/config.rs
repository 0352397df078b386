//! Configuration system for tryst.
//!
//! Resolution order: environment variables → config file → defaults.
//! Process flags (parsed by each binary) are applied last.
//!
//! Config file location:
//!   1. $TRYST_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/tryst/config.toml
//!   3. ~/.config/tryst/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Well-known tracker port. Also the default port exempt from the auth gate.
pub const DEFAULT_TRACKER_PORT: u16 = 7000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrystConfig {
    pub tracker: TrackerConfig,
    pub peer: PeerConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub registry: RegistryConfig,
    pub fanout: FanoutConfig,
    pub introduction: IntroductionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Bind address of the tracker process.
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// Bind address of the peer process (HTTP and raw P2P share it).
    pub host: String,
    pub port: u16,
    /// Where the peer's tracker lives.
    pub tracker_host: String,
    pub tracker_port: u16,
    /// Announce ourselves via /submit-info at startup.
    pub register_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Max concurrently served connections. Extra connections get 503.
    pub max_connections: usize,
    /// Listen backlog handed to the kernel.
    pub backlog: i32,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    /// Size of the single read performed per connection.
    pub read_buffer_size: usize,
    /// Directory containing www/, static/, apps/, videos/, audios/.
    pub static_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// Listening port that bypasses the gate entirely. None = no exemption.
    pub exempt_port: Option<u16>,
    pub login_path: String,
    pub login_page: String,
    pub landing_page: String,
    /// Session lifetime. 0 = sessions never expire.
    pub session_ttl_secs: u64,
    /// Paths allowed through when they start with one of these.
    pub public_prefixes: Vec<String>,
    /// Paths allowed through on exact match.
    pub public_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Drop registered peers not refreshed within this window. 0 = never.
    pub peer_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    pub send_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroductionConfig {
    pub timeout_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_TRACKER_PORT,
        }
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            tracker_host: "127.0.0.1".to_string(),
            tracker_port: DEFAULT_TRACKER_PORT,
            register_on_start: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_connections: 256,
            backlog: 128,
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
            read_buffer_size: 4096,
            static_root: PathBuf::from("."),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
            exempt_port: Some(DEFAULT_TRACKER_PORT),
            login_path: "/login".to_string(),
            login_page: "/login.html".to_string(),
            landing_page: "/index.html".to_string(),
            session_ttl_secs: 86_400,
            public_prefixes: ["/login.html", "/css/", "/js/", "/images/", "/static/"]
                .map(String::from)
                .to_vec(),
            public_paths: [
                "/submit-info",
                "/get-list",
                "/connect-peer",
                "/broadcast-peer",
                "/send-peer",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { peer_ttl_secs: 0 }
    }
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: 2_000,
        }
    }
}

impl Default for IntroductionConfig {
    fn default() -> Self {
        Self { timeout_ms: 2_000 }
    }
}

// ── Durations ─────────────────────────────────────────────────────────────────

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl AuthConfig {
    /// Move the exemption off the well-known port onto the port the tracker
    /// actually binds. A custom exemption, or none, is left alone.
    pub fn follow_tracker_port(&mut self, port: u16) {
        if self.exempt_port == Some(DEFAULT_TRACKER_PORT) {
            self.exempt_port = Some(port);
        }
    }

    /// None when sessions never expire.
    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }
}

impl RegistryConfig {
    pub fn peer_ttl(&self) -> Option<Duration> {
        (self.peer_ttl_secs > 0).then(|| Duration::from_secs(self.peer_ttl_secs))
    }
}

impl FanoutConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl IntroductionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("tryst")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl TrystConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            TrystConfig::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("TRYST_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&TrystConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply TRYST_* overrides. `lookup` is `std::env::var` in production.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |v: String| v == "true" || v == "1";

        if let Some(v) = lookup("TRYST_TRACKER__HOST") {
            self.tracker.host = v;
        }
        if let Some(p) = lookup("TRYST_TRACKER__PORT").and_then(|v| v.parse().ok()) {
            self.tracker.port = p;
        }
        if let Some(v) = lookup("TRYST_PEER__HOST") {
            self.peer.host = v;
        }
        if let Some(p) = lookup("TRYST_PEER__PORT").and_then(|v| v.parse().ok()) {
            self.peer.port = p;
        }
        if let Some(v) = lookup("TRYST_PEER__TRACKER_HOST") {
            self.peer.tracker_host = v;
        }
        if let Some(p) = lookup("TRYST_PEER__TRACKER_PORT").and_then(|v| v.parse().ok()) {
            self.peer.tracker_port = p;
        }
        if let Some(v) = lookup("TRYST_PEER__REGISTER_ON_START") {
            self.peer.register_on_start = flag(v);
        }
        if let Some(n) = lookup("TRYST_SERVER__MAX_CONNECTIONS").and_then(|v| v.parse().ok()) {
            self.server.max_connections = n;
        }
        if let Some(n) = lookup("TRYST_SERVER__BACKLOG").and_then(|v| v.parse().ok()) {
            self.server.backlog = n;
        }
        if let Some(n) = lookup("TRYST_SERVER__READ_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.server.read_timeout_ms = n;
        }
        if let Some(n) = lookup("TRYST_SERVER__WRITE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.server.write_timeout_ms = n;
        }
        if let Some(n) = lookup("TRYST_SERVER__READ_BUFFER_SIZE").and_then(|v| v.parse().ok()) {
            self.server.read_buffer_size = n;
        }
        if let Some(v) = lookup("TRYST_SERVER__STATIC_ROOT") {
            self.server.static_root = PathBuf::from(v);
        }
        if let Some(v) = lookup("TRYST_AUTH__USERNAME") {
            self.auth.username = v;
        }
        if let Some(v) = lookup("TRYST_AUTH__PASSWORD") {
            self.auth.password = v;
        }
        if let Some(v) = lookup("TRYST_AUTH__EXEMPT_PORT") {
            self.auth.exempt_port = v.parse().ok();
        }
        if let Some(v) = lookup("TRYST_AUTH__LOGIN_PATH") {
            self.auth.login_path = v;
        }
        if let Some(v) = lookup("TRYST_AUTH__LOGIN_PAGE") {
            self.auth.login_page = v;
        }
        if let Some(v) = lookup("TRYST_AUTH__LANDING_PAGE") {
            self.auth.landing_page = v;
        }
        if let Some(n) = lookup("TRYST_AUTH__SESSION_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.auth.session_ttl_secs = n;
        }
        // Lists are comma-separated.
        if let Some(v) = lookup("TRYST_AUTH__PUBLIC_PREFIXES") {
            self.auth.public_prefixes = split_list(&v);
        }
        if let Some(v) = lookup("TRYST_AUTH__PUBLIC_PATHS") {
            self.auth.public_paths = split_list(&v);
        }
        if let Some(n) = lookup("TRYST_REGISTRY__PEER_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.registry.peer_ttl_secs = n;
        }
        if let Some(n) = lookup("TRYST_FANOUT__SEND_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.fanout.send_timeout_ms = n;
        }
        if let Some(n) = lookup("TRYST_INTRODUCTION__TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.introduction.timeout_ms = n;
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
