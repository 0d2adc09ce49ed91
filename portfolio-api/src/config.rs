/// Configuration management for the API server
///
/// This module loads the server settings and the shared database settings from
/// environment variables.
///
/// # Environment Variables
///
/// - `HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `DB_*`: Database settings, see [`portfolio_shared::config`]
/// - `RUST_LOG`: Log level (default: portfolio_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use portfolio_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server.bind_address());
/// # Ok(())
/// # }
/// ```

use portfolio_shared::config::DatabaseSettings;
use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Loads server settings through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a valid port number
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = get("HOST").unwrap_or(defaults.host);

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("Invalid PORT value '{}'", raw))?,
            None => defaults.port,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether any origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required database variable is missing
    /// - Any variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Also loads .env
        let database = DatabaseSettings::from_env()?;
        let server = ServerConfig::from_lookup(|key| env::var(key).ok())?;

        Ok(Self { server, database })
    }
}
