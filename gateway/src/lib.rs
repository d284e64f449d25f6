//! xrate Gateway
//!
//! HTTP surface over the rate resolver: serves the cached rate table,
//! accepts manual overrides and converts amounts between currencies.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{GatewayConfig, LogFormat};
pub use error::GatewayError;
pub use routes::router;
pub use server::{GatewayServer, RunningGateway};
pub use state::{AppState, GatewayState};
