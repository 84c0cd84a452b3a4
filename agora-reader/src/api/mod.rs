//! HTTP API handlers for agora-reader

pub mod health;
pub mod topics;

pub use health::health_routes;
pub use topics::topic_routes;
