//! Beacon daemon library
//!
//! Components of the service directory daemon:
//! - REST API handlers for register/delete/find
//! - Configuration loading (file, environment, CLI overrides)
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
