//! Application configuration
//!
//! Loaded once at startup from a TOML file (if present) with environment
//! variable overrides on top. Access anywhere through [`get_config`].

use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::utils::generate_random_code;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Process-wide configuration accessor, loading on first use.
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::load)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub oauth: OAuthConfig,
    pub session: SessionConfig,
    pub webhook: WebhookConfig,
    pub codes: CodeConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend name: `sqlite`, `file` or `memory`.
    pub backend: String,
    /// Database path (sqlite) or data directory (file backend).
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            path: "shortgate.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Absolute origin used to build the OAuth callback URL.
    /// Defaults to `http://{server.host}:{server.port}` when empty.
    pub callback_base: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_secs: 86400,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    /// Outbound notification target for the trap endpoint. Empty = disabled.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub length: usize,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self { length: 6 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub name: String,
    pub description: String,
    pub contact: String,
    pub source_url: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            name: "shortgate".to_string(),
            description: "A tiny URL shortener.".to_string(),
            contact: String::new(),
            source_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file with environment variable fallback.
    pub fn load() -> Self {
        let mut config = Self::load_from_file();
        config.override_with_env();
        config.fill_generated_defaults();
        config
    }

    fn load_from_file() -> Self {
        let config_paths = [
            "config.toml",
            "shortgate.toml",
            "config/shortgate.toml",
            "/etc/shortgate/config.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                match fs::read_to_string(path) {
                    Ok(content) => match toml::from_str::<AppConfig>(&content) {
                        Ok(config) => {
                            debug!("Loaded config from: {}", path);
                            return config;
                        }
                        Err(e) => {
                            warn!("Failed to parse config file {}: {}", path, e);
                        }
                    },
                    Err(e) => {
                        warn!("Failed to read config file {}: {}", path, e);
                    }
                }
            }
        }

        debug!("No config file found, using defaults");
        Self::default()
    }

    fn override_with_env(&mut self) {
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Invalid SERVER_PORT: {}", port),
            }
        }

        if let Ok(backend) = env::var("STORAGE_BACKEND") {
            self.storage.backend = backend;
        }
        if let Ok(path) = env::var("STORAGE_PATH") {
            self.storage.path = path;
        }

        if let Ok(client_id) = env::var("GITHUB_CLIENT_ID") {
            self.oauth.client_id = client_id;
        }
        if let Ok(client_secret) = env::var("GITHUB_CLIENT_SECRET") {
            self.oauth.client_secret = client_secret;
        }
        if let Ok(base) = env::var("OAUTH_CALLBACK_BASE") {
            self.oauth.callback_base = base;
        }

        if let Ok(secret) = env::var("SESSION_SECRET") {
            self.session.secret = secret;
        }
        if let Ok(ttl) = env::var("SESSION_TTL_SECS") {
            match ttl.parse() {
                Ok(ttl) => self.session.ttl_secs = ttl,
                Err(_) => warn!("Invalid SESSION_TTL_SECS: {}", ttl),
            }
        }

        if let Ok(url) = env::var("NOTIFY_WEBHOOK_URL") {
            self.webhook.url = url;
        }

        if let Ok(length) = env::var("RANDOM_CODE_LENGTH") {
            match length.parse() {
                Ok(length) => self.codes.length = length,
                Err(_) => warn!("Invalid RANDOM_CODE_LENGTH: {}", length),
            }
        }

        if let Ok(name) = env::var("SITE_NAME") {
            self.display.name = name;
        }
        if let Ok(description) = env::var("SITE_DESCRIPTION") {
            self.display.description = description;
        }
        if let Ok(contact) = env::var("SITE_CONTACT") {
            self.display.contact = contact;
        }
        if let Ok(source_url) = env::var("SITE_SOURCE_URL") {
            self.display.source_url = source_url;
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(file) = env::var("LOG_FILE") {
            self.logging.file = Some(file);
        }
    }

    fn fill_generated_defaults(&mut self) {
        if self.session.secret.is_empty() {
            // Sessions will not survive a restart without a configured secret.
            warn!("SESSION_SECRET not set, generating a random per-process secret");
            self.session.secret = generate_random_code(48);
        }
        if self.oauth.callback_base.is_empty() {
            self.oauth.callback_base =
                format!("http://{}:{}", self.server.host, self.server.port);
        }
    }

    /// Whether GitHub OAuth login is configured at all.
    pub fn oauth_enabled(&self) -> bool {
        !self.oauth.client_id.is_empty() && !self.oauth.client_secret.is_empty()
    }
}
