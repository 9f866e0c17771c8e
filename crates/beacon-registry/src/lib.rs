//! Beacon Registry - dynamic service directory engine
//!
//! Network-addressable service instances announce themselves with
//! periodic register calls; consumers look up a live instance of a
//! named, versioned service; instances whose announcements stop are
//! reclassified as inactive on the next access.
//!
//! This crate is the engine only:
//!
//! - **Store**: the canonical instance table keyed by the composite
//!   (name, version, address, port) identity
//! - **Sweep**: the lazy, access-triggered heartbeat-expiry policy
//! - **Matcher**: semver range evaluation against exact versions
//! - **Selector**: active-first uniform random instance choice
//!
//! Transport, configuration and process bootstrap live in the daemon
//! crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod instance;
pub mod registry;
pub mod selector;
pub mod version;

// Re-exports
pub use error::{RegistryError, Result};
pub use instance::{InstanceKey, InstanceStatus, ServiceInstance};
pub use registry::{ServiceRegistry, DEFAULT_HEARTBEAT_TIMEOUT_SECS};
pub use version::VersionRange;
