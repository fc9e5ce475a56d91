//! Server configuration

/// Errors raised while reading configuration from the environment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a valid port number, got {0:?}")]
    InvalidPort(String),

    #[error("{key} must be true or false, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// Defaults match a local development setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host (default: `localhost`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Start with the two starter items (default: `true`).
    pub seed_items: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3000,
            seed_items: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var      | Default     |
    /// |--------------|-------------|
    /// | `HOST`       | `localhost` |
    /// | `PORT`       | `3000`      |
    /// | `SEED_ITEMS` | `true`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let seed_items = match lookup("SEED_ITEMS") {
            Some(raw) => parse_flag("SEED_ITEMS", raw)?,
            None => defaults.seed_items,
        };

        Ok(Self {
            host,
            port,
            seed_items,
        })
    }

    /// `host:port`, used where a request does not name its own host
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value: raw }),
    }
}
