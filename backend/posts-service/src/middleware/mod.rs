/// HTTP middleware: bearer-token authentication and request metrics.
pub mod auth;
pub mod metrics;

pub use auth::{AuthUser, RequireAuth};
pub use metrics::MetricsMiddleware;
