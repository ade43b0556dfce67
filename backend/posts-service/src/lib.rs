/// Posts Service Library
///
/// Handles posts, comments and likes endpoints for the Pulse social platform.
/// Posts are keyed by time-sortable snowflake ids and partitioned into fixed
/// time buckets, so feed reads walk buckets newest-first instead of scanning
/// a global index.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers for posts, comments and likes
/// - `models`: Data structures for rows, views and enrichment payloads
/// - `services`: Business logic layer (feed walk, enrichment, validation)
/// - `repository`: Database access layer
/// - `clients`: Ports and HTTP clients for sibling services
/// - `middleware`: HTTP middleware for authentication and request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{Result, ServiceError};
