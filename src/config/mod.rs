use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors raised while building configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set or empty; refusing to start without a token signing key")]
    MissingSecret,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Upper bound for bearer token lifetimes (30 days)
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL; when absent the in-memory store is used
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub posts_per_page: u32,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub enable_cors: bool,
    pub password_hash: PasswordHashConfig,
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Image references are stored as `images/<file>` and resolved against `image_root`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub image_root: String,
}

impl PasswordHashConfig {
    /// Smallest cost argon2 accepts. Only suitable for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        // argon2 crate defaults (m=19MiB, t=2, p=1)
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment. Fails if no signing secret is configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let secret = env::var("JWT_SECRET").unwrap_or_default();

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(secret),
            Environment::Staging => Self::staging(secret),
            Environment::Development => Self::development(secret),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.security.token_ttl_secs) {
            return Err(ConfigError::InvalidValue {
                name: "SECURITY_TOKEN_TTL_SECS",
                value: self.security.token_ttl_secs.to_string(),
            });
        }
        if self.api.posts_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                name: "API_POSTS_PER_PAGE",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Some(port) = env::var("POSTBOARD_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse_var("POSTBOARD_API_PORT", &port)?;
        }
        if let Ok(v) = env::var("SERVER_BIND") {
            self.server.bind = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // API overrides
        if let Ok(v) = env::var("API_POSTS_PER_PAGE") {
            self.api.posts_per_page = parse_var("API_POSTS_PER_PAGE", &v)?;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse_var("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_TOKEN_TTL_SECS") {
            self.security.token_ttl_secs = parse_var("SECURITY_TOKEN_TTL_SECS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_HASH_MEMORY_KIB") {
            self.security.password_hash.memory_kib = parse_var("SECURITY_HASH_MEMORY_KIB", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_HASH_ITERATIONS") {
            self.security.password_hash.iterations = parse_var("SECURITY_HASH_ITERATIONS", &v)?;
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_IMAGE_ROOT") {
            self.storage.image_root = v;
        }

        Ok(self)
    }

    pub fn development(jwt_secret: impl Into<String>) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                posts_per_page: 2,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: jwt_secret.into(),
                token_ttl_secs: 3600,
                enable_cors: true,
                password_hash: PasswordHashConfig::default(),
            },
            storage: StorageConfig {
                image_root: ".".to_string(),
            },
        }
    }

    fn staging(jwt_secret: String) -> Self {
        let mut config = Self::development(jwt_secret);
        config.environment = Environment::Staging;
        config.server.bind = "0.0.0.0".to_string();
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.api.max_request_size_bytes = 5 * 1024 * 1024; // 5MB
        config
    }

    fn production(jwt_secret: String) -> Self {
        let mut config = Self::development(jwt_secret);
        config.environment = Environment::Production;
        config.server.bind = "0.0.0.0".to_string();
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 2 * 1024 * 1024; // 2MB
        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
