//! API request handlers

mod health;
mod registry;

pub use health::*;
pub use registry::*;
