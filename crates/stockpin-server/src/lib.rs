//! Keep-alive HTTP endpoint for the stockpin bot.
//!
//! Hosting platforms that put idle web services to sleep need something to
//! answer HTTP. This crate serves a static liveness page and a JSON health
//! probe. It shares no state with the dispensing core.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::HealthConfig;
pub use error::{ServerError, ServerResult};
pub use handler::HealthResponse;
pub use server::HealthServer;
