use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_LINE_LEN, DEFAULT_MAX_REPLY_LINES, DEFAULT_PASSWORD,
    DEFAULT_PORT, DEFAULT_READ_TIMEOUT, DEFAULT_USERNAME,
};
use crate::core_listing::ListingPolicy;

#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub persistent: bool, // Ask the connector for a long lived control socket
    pub passive: bool,    // List over a PASV data channel instead of the control channel
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub max_line_len: usize,
    pub max_reply_lines: usize,
    pub listing_policy: ListingPolicy,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: DEFAULT_PORT,
            username: String::from(DEFAULT_USERNAME),
            password: String::from(DEFAULT_PASSWORD),
            persistent: false,
            passive: true,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            read_timeout_secs: DEFAULT_READ_TIMEOUT.as_secs(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_reply_lines: DEFAULT_MAX_REPLY_LINES,
            listing_policy: ListingPolicy::Strict,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"****")
            .field("persistent", &self.persistent)
            .field("passive", &self.passive)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .field("max_line_len", &self.max_line_len)
            .field("max_reply_lines", &self.max_reply_lines)
            .field("listing_policy", &self.listing_policy)
            .finish()
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Loads the `[client]` table of a TOML file, missing keys take their defaults.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config.client)
    }
}
