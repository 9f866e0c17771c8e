//! Instance types for the service directory
//!
//! A ServiceInstance is one running, network-reachable deployment of a
//! named, versioned component. Instances are identified by the full
//! (name, version, address, port) tuple, so several builds of the same
//! service can be registered side by side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered service instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInstance {
    /// Service name
    pub name: String,

    /// Exact version of this running build (not a range)
    pub version: String,

    /// Network host; IPv6 forms are stored bracketed
    pub address: String,

    /// Listening port
    pub port: u16,

    /// Timestamp of the last register call for this key
    pub last_heartbeat: DateTime<Utc>,

    /// Liveness classification
    pub status: InstanceStatus,
}

/// Liveness status of an instance
///
/// An instance is Active while heartbeats keep arriving and becomes
/// Inactive once the sweep notices the heartbeat is older than the
/// registry timeout. Only a fresh register call moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    /// Heartbeating within the timeout window
    Active,
    /// Heartbeat expired; entry retained for discoverability
    Inactive,
}

/// Composite identity of an instance
///
/// Structured as a tuple rather than a concatenated string, so adjacent
/// fields can never collide (name "a" + version "11.0.0" vs name "a1" +
/// version "1.0.0").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey {
    name: String,
    version: String,
    address: String,
    port: u16,
}

impl InstanceKey {
    /// Build a key from the identity fields
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        address: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            address: address.into(),
            port,
        }
    }

    /// Service name component
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version component
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Address component
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Port component
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl std::fmt::Display for InstanceKey {
    // Name and version arrive as single URL path segments, so '/' is a
    // safe separator for the string rendering.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}:{}",
            self.name, self.version, self.address, self.port
        )
    }
}

impl ServiceInstance {
    /// Create a new Active instance with a fresh heartbeat
    pub fn new(key: &InstanceKey, now: DateTime<Utc>) -> Self {
        Self {
            name: key.name().to_string(),
            version: key.version().to_string(),
            address: key.address().to_string(),
            port: key.port(),
            last_heartbeat: now,
            status: InstanceStatus::Active,
        }
    }

    /// Record a heartbeat, restoring Active status
    pub fn beat(&mut self, now: DateTime<Utc>) {
        self.last_heartbeat = now;
        self.status = InstanceStatus::Active;
    }

    /// Whether the heartbeat is older than `timeout` as of `now`
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        now - self.last_heartbeat > timeout
    }

    /// Whether the instance is currently classified Active
    pub fn is_active(&self) -> bool {
        self.status == InstanceStatus::Active
    }
}
