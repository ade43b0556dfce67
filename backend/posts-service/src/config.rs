/// Configuration management for Posts Service
///
/// This module handles loading and managing configuration from environment
/// variables.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token verification configuration
    pub auth: AuthConfig,
    /// Feed partitioning configuration
    pub feed: FeedConfig,
    /// Sibling-service endpoints
    pub services: ServicesConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Token verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing key shared with the auth service
    pub signing_key: String,
}

/// Feed partitioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Width of one time bucket in seconds
    pub bucket_window_secs: u64,
    /// Machine id for the id allocator, unique per instance
    pub machine_id: u16,
}

/// Sibling-service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Storage (attachments) service base URL
    pub storage_url: String,
    /// Users (profiles) service base URL
    pub users_url: String,
    /// Linked-accounts service base URL
    pub linkedacc_url: String,
    /// Outbound request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("POSTS_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("POSTS_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8082),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/pulse".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            auth: {
                let signing_key = match std::env::var("AUTH_SIGNING_KEY") {
                    Ok(value) if !value.trim().is_empty() => value,
                    _ if app_env.eq_ignore_ascii_case("production") => {
                        return Err("AUTH_SIGNING_KEY must be set in production".to_string())
                    }
                    _ => "dev-signing-key".to_string(),
                };
                AuthConfig { signing_key }
            },
            feed: FeedConfig {
                bucket_window_secs: std::env::var("FEED_BUCKET_WINDOW_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3 * 60 * 60),
                machine_id: std::env::var("MACHINE_ID")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
            },
            services: ServicesConfig {
                storage_url: std::env::var("STORAGE_SERVICE_URL")
                    .unwrap_or_else(|_| "http://localhost:8083".to_string()),
                users_url: std::env::var("USERS_SERVICE_URL")
                    .unwrap_or_else(|_| "http://localhost:8084".to_string()),
                linkedacc_url: std::env::var("LINKEDACC_SERVICE_URL")
                    .unwrap_or_else(|_| "http://localhost:8085".to_string()),
                request_timeout_ms: std::env::var("SERVICES_REQUEST_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2_000),
            },
        })
    }
}
