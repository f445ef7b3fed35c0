pub mod auth;
pub mod metrics;

pub use auth::AuthMiddleware;
pub use metrics::RequestMetrics;
