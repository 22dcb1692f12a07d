//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use arena::{store::DatabaseConfig, wallet::WalletConfig};
use std::{net::SocketAddr, path::PathBuf};

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Which document store backs the service
    pub store_backend: StoreBackend,
    /// Database configuration (postgres backend only)
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Wallet limits and simulated payment delay
    pub wallet: WalletConfig,
    /// Upload configuration
    pub uploads: UploadConfig,
    /// Prometheus exporter address; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Document store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store, state is lost on restart
    Memory,
    /// PostgreSQL document table
    Postgres,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(ConfigError::Invalid {
                var: "STORE_BACKEND".to_string(),
                reason: format!("Unknown backend '{other}', expected 'memory' or 'postgres'"),
            }),
        }
    }
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
    /// Shared secret the identity broker signs federated tokens with;
    /// federated sign-in is refused when unset
    pub federation_secret: Option<String>,
}

/// Where uploads are written and how they are addressed
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory holding uploaded files
    pub dir: PathBuf,
    /// Base URL under which `/files` is reachable from clients
    pub public_base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `backend_override` - Optional store backend override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        backend_override: Option<StoreBackend>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr("SERVER_BIND")?.unwrap_or(SocketAddr::from(([127, 0, 0, 1], 8080))),
        };

        let store_backend = match backend_override {
            Some(backend) => backend,
            None => match std::env::var("STORE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StoreBackend::Memory,
            },
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let federation_secret = std::env::var("FEDERATION_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty());

        let security = SecurityConfig {
            jwt_secret,
            password_pepper,
            federation_secret,
        };

        let uploads = UploadConfig {
            dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://{bind}")),
        };

        Ok(ServerConfig {
            bind,
            store_backend,
            database,
            security,
            wallet: WalletConfig::from_env(),
            uploads,
            metrics_bind: parse_addr("METRICS_BIND")?,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        if let Some(secret) = &self.security.federation_secret
            && secret.len() < 32
        {
            return Err(ConfigError::Invalid {
                var: "FEDERATION_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.wallet.min_deposit <= 0 {
            return Err(ConfigError::Invalid {
                var: "MIN_DEPOSIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.wallet.max_deposit < self.wallet.min_deposit {
            return Err(ConfigError::Invalid {
                var: "MAX_DEPOSIT".to_string(),
                reason: format!(
                    "Must be at least the minimum deposit ({})",
                    self.wallet.min_deposit
                ),
            });
        }

        if self.wallet.min_withdrawal <= 0 {
            return Err(ConfigError::Invalid {
                var: "MIN_WITHDRAWAL".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.uploads.public_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "PUBLIC_BASE_URL".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// URL prefix handed out for uploaded files
    pub fn files_base_url(&self) -> String {
        format!("{}/files", self.uploads.public_base_url.trim_end_matches('/'))
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional socket address variable
fn parse_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: format!("'{value}' is not a socket address"),
                })
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            store_backend: StoreBackend::Memory,
            database: DatabaseConfig::development(),
            security: SecurityConfig {
                jwt_secret: "a".repeat(32),
                password_pepper: "a".repeat(16),
                federation_secret: None,
            },
            wallet: WalletConfig::default(),
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                public_base_url: "http://localhost:8080".to_string(),
            },
            metrics_bind: None,
        }
    }

    fn clear_env() {
        for key in [
            "SERVER_BIND",
            "STORE_BACKEND",
            "JWT_SECRET",
            "PASSWORD_PEPPER",
            "FEDERATION_SECRET",
            "METRICS_BIND",
            "PUBLIC_BASE_URL",
            "UPLOAD_DIR",
        ] {
            // SAFETY: tests touching the environment are serialized
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_config_validation_short_secret() {
        let mut config = config();
        config.security.jwt_secret = "short".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_config_validation_short_federation_secret() {
        let mut config = config();
        config.security.federation_secret = Some("short".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "FEDERATION_SECRET"));

        config.security.federation_secret = Some("f".repeat(32));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_deposit_range() {
        let mut config = config();
        config.wallet.max_deposit = config.wallet.min_deposit - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_files_base_url() {
        let mut config = config();
        config.uploads.public_base_url = "https://arena.example/".to_string();
        assert_eq!(config.files_base_url(), "https://arena.example/files");
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("Memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_requires_secrets() {
        clear_env();
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_values() {
        clear_env();
        // SAFETY: tests touching the environment are serialized
        unsafe {
            std::env::set_var("JWT_SECRET", "j".repeat(40));
            std::env::set_var("PASSWORD_PEPPER", "p".repeat(20));
            std::env::set_var("SERVER_BIND", "0.0.0.0:9000");
            std::env::set_var("METRICS_BIND", "127.0.0.1:9100");
        }

        let config = ServerConfig::from_env(None, None, None).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.metrics_bind, Some("127.0.0.1:9100".parse().unwrap()));
        assert_eq!(config.uploads.public_base_url, "http://0.0.0.0:9000");
        assert_eq!(config.security.federation_secret, None);
        assert!(config.validate().is_ok());

        let config = ServerConfig::from_env(
            Some("127.0.0.1:1234".parse().unwrap()),
            Some("postgres://other/db".to_string()),
            Some(StoreBackend::Postgres),
        )
        .unwrap();
        assert_eq!(config.bind.port(), 1234);
        assert_eq!(config.database.database_url, "postgres://other/db");
        assert_eq!(config.store_backend, StoreBackend::Postgres);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_metrics_bind() {
        clear_env();
        // SAFETY: tests touching the environment are serialized
        unsafe {
            std::env::set_var("JWT_SECRET", "j".repeat(40));
            std::env::set_var("PASSWORD_PEPPER", "p".repeat(20));
            std::env::set_var("METRICS_BIND", "not-an-address");
        }
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "METRICS_BIND"));
        clear_env();
    }
}
