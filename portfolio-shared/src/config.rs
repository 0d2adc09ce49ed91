/// Database configuration loading
///
/// This module reads the database settings from the process environment and
/// turns them into an immutable [`DatabaseSettings`] value. A `.env` file in the
/// working directory is loaded first when present; variables that are already
/// set in the process environment take precedence over the file.
///
/// # Environment Variables
///
/// - `DB_HOST`: Database host (required)
/// - `DB_USER`: Database user (required)
/// - `DB_PASSWORD`: Database password (required)
/// - `DB_NAME`: Database name (required)
/// - `DB_PORT`: Database port (default: 5432)
/// - `DB_SSLMODE`: PostgreSQL SSL mode (default: disable)
/// - `DB_MAX_CONNECTIONS`: Pool upper bound (default: 10)
/// - `DB_MIN_CONNECTIONS`: Idle connections kept open (default: 2)
/// - `DB_ACQUIRE_TIMEOUT_SECONDS`: Wait for a free connection (default: 30)
/// - `DB_CONNECT_TIMEOUT_SECONDS`: Deadline for the initial connect and liveness
///   check (default: 5)
///
/// # Example
///
/// ```no_run
/// use portfolio_shared::config::DatabaseSettings;
///
/// # fn example() -> Result<(), portfolio_shared::config::ConfigError> {
/// let settings = DatabaseSettings::from_env()?;
/// println!("Connecting to {}", settings.redacted_url());
/// # Ok(())
/// # }
/// ```

use std::fmt;
use tracing::{debug, warn};

/// Default PostgreSQL port
pub const DEFAULT_PORT: u16 = 5432;

/// Default SSL mode
///
/// TLS is off unless `DB_SSLMODE` says otherwise. Loading settings with this
/// mode logs a warning.
pub const DEFAULT_SSL_MODE: &str = "disable";

/// Default maximum pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default minimum idle connections
pub const DEFAULT_MIN_CONNECTIONS: u32 = 2;

/// Default acquire timeout in seconds
pub const DEFAULT_ACQUIRE_TIMEOUT_SECONDS: u64 = 30;

/// Default startup connect deadline in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;

/// Required variables, in the order they are checked
const REQUIRED_VARS: [&str; 4] = ["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME"];

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("Required environment variable {0} is not set")]
    MissingVariable(String),

    /// `DB_PORT` is not an integer in 1..=65535
    #[error("Invalid DB_PORT value '{0}'")]
    InvalidPort(String),

    /// A numeric pool setting could not be parsed
    #[error("Invalid {name} value '{value}'")]
    InvalidNumber { name: String, value: String },

    /// Minimum pool size is larger than the maximum
    #[error("DB_MIN_CONNECTIONS ({min}) exceeds DB_MAX_CONNECTIONS ({max})")]
    InvalidPoolBounds { min: u32, max: u32 },
}

/// Database connection settings
///
/// Built once at startup and shared by reference afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Database host
    pub host: String,

    /// Database port
    pub port: u16,

    /// Database name
    pub database_name: String,

    /// Database user
    pub user: String,

    /// Database password
    pub password: String,

    /// PostgreSQL SSL mode (`disable`, `prefer`, `require`, ...)
    pub ssl_mode: String,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Minimum number of idle connections
    pub min_connections: u32,

    /// How long to wait for a free connection (seconds)
    pub acquire_timeout_seconds: u64,

    /// Deadline for opening the pool and passing the liveness check (seconds)
    pub connect_timeout_seconds: u64,
}

impl DatabaseSettings {
    /// Loads settings from the process environment
    ///
    /// A `.env` file is read first if it exists; a missing file is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required variable is missing or empty
    /// - `DB_PORT` is not a valid port
    /// - A pool setting is not a valid number or the bounds are inverted
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => warn!(error = %e, "Failed to read .env file"),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let require = |name: &str| {
            get(name).ok_or_else(|| ConfigError::MissingVariable(name.to_string()))
        };
        let [host, user, password, database_name] = [
            require(REQUIRED_VARS[0])?,
            require(REQUIRED_VARS[1])?,
            require(REQUIRED_VARS[2])?,
            require(REQUIRED_VARS[3])?,
        ];

        let port = match get("DB_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
        };

        let ssl_mode = get("DB_SSLMODE").unwrap_or_else(|| DEFAULT_SSL_MODE.to_string());

        let max_connections = parse_number(&get, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let min_connections = parse_number(&get, "DB_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS)?;
        let acquire_timeout_seconds = parse_number(
            &get,
            "DB_ACQUIRE_TIMEOUT_SECONDS",
            DEFAULT_ACQUIRE_TIMEOUT_SECONDS,
        )?;
        let connect_timeout_seconds = parse_number(
            &get,
            "DB_CONNECT_TIMEOUT_SECONDS",
            DEFAULT_CONNECT_TIMEOUT_SECONDS,
        )?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidNumber {
                name: "DB_MAX_CONNECTIONS".to_string(),
                value: "0".to_string(),
            });
        }
        if connect_timeout_seconds == 0 {
            return Err(ConfigError::InvalidNumber {
                name: "DB_CONNECT_TIMEOUT_SECONDS".to_string(),
                value: "0".to_string(),
            });
        }
        if min_connections > max_connections {
            return Err(ConfigError::InvalidPoolBounds {
                min: min_connections,
                max: max_connections,
            });
        }

        let settings = Self {
            host,
            port,
            database_name,
            user,
            password,
            ssl_mode,
            max_connections,
            min_connections,
            acquire_timeout_seconds,
            connect_timeout_seconds,
        };

        if settings.tls_disabled() {
            warn!(
                host = %settings.host,
                "Database TLS is disabled (DB_SSLMODE=disable); set DB_SSLMODE=require for remote databases"
            );
        }

        Ok(settings)
    }

    /// Returns true when connections are made without TLS
    pub fn tls_disabled(&self) -> bool {
        self.ssl_mode.eq_ignore_ascii_case("disable")
    }

    /// Returns the PostgreSQL connection URL
    ///
    /// Contains the password; use [`Self::redacted_url`] for logging.
    pub fn database_url(&self) -> String {
        self.render_url(&self.password)
    }

    /// Returns the connection URL with the password masked
    pub fn redacted_url(&self) -> String {
        self.render_url("***")
    }

    fn render_url(&self, password: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, password, self.host, self.port, self.database_name, self.ssl_mode
        )
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_name", &self.database_name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_seconds", &self.acquire_timeout_seconds)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .finish()
    }
}

fn parse_number<G, T>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            name: name.to_string(),
            value: raw,
        }),
    }
}
