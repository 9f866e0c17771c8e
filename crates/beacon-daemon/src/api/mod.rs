//! API layers exposed by the daemon

pub mod rest;

pub use rest::router::create_router;
