//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The Google client secret and the session secret come from env vars or
//! from `*_file` paths, never from the TOML directly.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "translate-proxy.toml";

/// Minimum session secret length; shorter keys make the cookie signature guessable.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Per-request timeout for calls to Google
    #[serde(default = "default_timeout")]
    pub upstream_timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// OAuth client registration
#[derive(Debug, Default, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to GOOGLE_CLIENT_SECRET)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(default)]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

/// Credential persistence
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_credentials_path")]
    pub path: PathBuf,
}

/// Session cookie settings
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(skip)]
    pub secret: Option<Secret<String>>,
    /// Path to a file containing the signing secret (alternative to SESSION_SECRET)
    #[serde(default)]
    pub secret_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            upstream_timeout_secs: default_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_credentials_path(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            max_age_days: default_max_age_days(),
            secure_cookie: false,
            secret: None,
            secret_file: None,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    1000
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_cookie_name() -> String {
    "sid".into()
}

fn default_max_age_days() -> u32 {
    30
}

impl Config {
    /// Load configuration from a TOML file, overlay environment variables, validate.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Defaults plus environment, for running without a config file.
    pub fn from_env() -> common::Result<Self> {
        Self::from_toml("")
    }

    fn from_toml(contents: &str) -> common::Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Environment overrides. Secrets: env var takes precedence over file.
    fn apply_env(&mut self) -> common::Result<()> {
        if let Ok(id) = std::env::var("GOOGLE_CLIENT_ID") {
            self.google.client_id = id;
        }
        if let Ok(uri) = std::env::var("GOOGLE_REDIRECT_URI") {
            self.google.redirect_uri = uri;
        }
        self.google.client_secret = resolve_secret(
            "GOOGLE_CLIENT_SECRET",
            self.google.client_secret_file.as_deref(),
        )?;
        self.session.secret =
            resolve_secret("SESSION_SECRET", self.session.secret_file.as_deref())?;

        if let Ok(path) = std::env::var("CREDENTIALS_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Ok(port) = std::env::var("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| common::Error::Config(format!("invalid PORT {port:?}: {e}")))?;
            self.server.listen_addr.set_port(port);
        }
        if let Ok(flag) = std::env::var("SECURE_COOKIE") {
            self.session.secure_cookie = parse_bool(&flag).ok_or_else(|| {
                common::Error::Config(format!("SECURE_COOKIE must be true or false, got: {flag}"))
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> common::Result<()> {
        if self.google.client_id.trim().is_empty() {
            return Err(common::Error::MissingSetting {
                setting: "google.client_id",
                env: "GOOGLE_CLIENT_ID",
            });
        }
        if self.google.client_secret.is_none() {
            return Err(common::Error::MissingSetting {
                setting: "google.client_secret_file",
                env: "GOOGLE_CLIENT_SECRET",
            });
        }
        if self.google.redirect_uri.trim().is_empty() {
            return Err(common::Error::MissingSetting {
                setting: "google.redirect_uri",
                env: "GOOGLE_REDIRECT_URI",
            });
        }
        if !self.google.redirect_uri.starts_with("http://")
            && !self.google.redirect_uri.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "redirect_uri must start with http:// or https://, got: {}",
                self.google.redirect_uri
            )));
        }

        match &self.session.secret {
            None => {
                return Err(common::Error::MissingSetting {
                    setting: "session.secret_file",
                    env: "SESSION_SECRET",
                });
            }
            Some(secret) if secret.expose().len() < MIN_SESSION_SECRET_LEN => {
                return Err(common::Error::Config(format!(
                    "session secret must be at least {MIN_SESSION_SECRET_LEN} bytes"
                )));
            }
            Some(_) => {}
        }
        if self.session.cookie_name.is_empty() {
            return Err(common::Error::Config("cookie_name must not be empty".into()));
        }
        if self.session.max_age_days == 0 {
            return Err(common::Error::Config(
                "max_age_days must be greater than 0".into(),
            ));
        }

        if self.server.upstream_timeout_secs == 0 {
            return Err(common::Error::Config(
                "upstream_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    ///
    /// The flag is `true` when the path was chosen explicitly and therefore
    /// must exist.
    pub fn resolve_path(cli_path: Option<&str>) -> (PathBuf, bool) {
        if let Some(p) = cli_path {
            return (PathBuf::from(p), true);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return (PathBuf::from(p), true);
        }
        (PathBuf::from(DEFAULT_CONFIG_PATH), false)
    }
}

fn resolve_secret(env: &str, file: Option<&Path>) -> common::Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env) {
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    let Some(file) = file else {
        return Ok(None);
    };
    let value = std::fs::read_to_string(file).map_err(|e| {
        common::Error::Config(format!("failed to read secret file {}: {e}", file.display()))
    })?;
    let value = value.trim().to_owned();
    Ok((!value.is_empty()).then(|| Secret::new(value)))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
