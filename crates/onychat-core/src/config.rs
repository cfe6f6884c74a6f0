use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const MAX_FRAME_BYTES: usize = 64 * 1024; // inbound frame cap, enforced by the transport
pub const OUTBOX_CAPACITY: usize = 256; // per-connection pending frames before drop
pub const EVENT_QUEUE_CAPACITY: usize = 1024; // hub control loop inbox
pub const PERSIST_TIMEOUT_MS: u64 = 5_000; // hard budget for one message insert
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3_600;
pub const INSECURE_DEFAULT_SECRET: &str = "change-me";

/// Top-level config (onychat.toml + ONYCHAT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnychatConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Origins allowed by the CORS layer. Empty list disables CORS headers.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            cors_origins: default_cors_origins(),
            max_frame_bytes: MAX_FRAME_BYTES,
        }
    }
}

/// Bearer token settings. Tokens are HMAC-SHA256 signed with `secret`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_secret")]
    pub secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl AuthConfig {
    /// True while the shipped placeholder secret is still in use.
    pub fn is_insecure(&self) -> bool {
        self.secret == INSECURE_DEFAULT_SECRET
    }
}

/// Sizing of the hub control loop and its per-connection outboxes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
    #[serde(default = "default_event_queue")]
    pub event_queue: usize,
    #[serde(default = "default_persist_timeout")]
    pub persist_timeout_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: OUTBOX_CAPACITY,
            event_queue: EVENT_QUEUE_CAPACITY,
            persist_timeout_ms: PERSIST_TIMEOUT_MS,
        }
    }
}

impl HubConfig {
    pub fn persist_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.persist_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}
fn default_max_frame_bytes() -> usize {
    MAX_FRAME_BYTES
}
fn default_secret() -> String {
    INSECURE_DEFAULT_SECRET.to_string()
}
fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}
fn default_outbox_capacity() -> usize {
    OUTBOX_CAPACITY
}
fn default_event_queue() -> usize {
    EVENT_QUEUE_CAPACITY
}
fn default_persist_timeout() -> u64 {
    PERSIST_TIMEOUT_MS
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.onychat/onychat.db", home)
}

impl OnychatConfig {
    /// Load config from a TOML file with ONYCHAT_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ONYCHAT_CONFIG env var
    ///   3. ~/.onychat/onychat.toml
    ///
    /// A missing file is not an error; defaults fill every field.
    /// Nested env keys use a double underscore: `ONYCHAT_GATEWAY__PORT=9000`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("ONYCHAT_CONFIG").ok())
            .unwrap_or_else(default_config_path);

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::OnychatError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(OnychatConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ONYCHAT_").split("__"))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.onychat/onychat.toml", home)
}
