//! HTTP surface of the formgate login flow.

pub mod config;
pub mod render;
pub mod routes;

pub use config::ServerConfig;
pub use routes::{AppState, auth_routes};
