//! The service registry store
//!
//! Owns the canonical instance table and the heartbeat/expiry policy.
//! Expiry is evaluated lazily on access; there is no background timer,
//! so an idle registry does not reclassify entries until the next
//! register or find touches it.

use crate::error::{RegistryError, Result};
use crate::instance::{InstanceKey, InstanceStatus, ServiceInstance};
use crate::selector;
use crate::version::VersionRange;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;
use tracing::debug;

/// Default heartbeat timeout in seconds
pub const DEFAULT_HEARTBEAT_TIMEOUT_SECS: u64 = 30;

/// Concurrent in-memory service directory
///
/// The table is a concurrent map keyed by the composite instance
/// identity; the entry API gives each register an atomic
/// check-then-upsert, so concurrent registrations of distinct keys
/// never lose updates and concurrent heartbeats for the same key
/// serialize per entry.
pub struct ServiceRegistry {
    instances: DashMap<InstanceKey, ServiceInstance>,
    timeout: Duration,
    rng: Mutex<StdRng>,
}

impl ServiceRegistry {
    /// Create a registry with the given heartbeat timeout
    pub fn new(timeout: Duration) -> Self {
        Self::with_rng(timeout, StdRng::from_entropy())
    }

    /// Create a registry with a seeded RNG for deterministic selection
    pub fn with_rng(timeout: Duration, rng: StdRng) -> Self {
        Self {
            instances: DashMap::new(),
            timeout,
            rng: Mutex::new(rng),
        }
    }

    /// Heartbeat timeout this registry was configured with
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register an instance or record a heartbeat for it
    ///
    /// Creates an Active entry on the first call for a key; every later
    /// call with the same key refreshes the heartbeat and restores
    /// Active status. Total and idempotent with respect to key
    /// identity.
    pub fn register(&self, name: &str, version: &str, address: &str, port: u16) -> InstanceKey {
        self.sweep();

        let key = InstanceKey::new(name, version, address, port);
        let now = Utc::now();

        let mut created = false;
        self.instances
            .entry(key.clone())
            .and_modify(|instance| instance.beat(now))
            .or_insert_with(|| {
                created = true;
                ServiceInstance::new(&key, now)
            });

        if created {
            debug!(service = name, version, address, port, "added service instance");
        } else {
            debug!(service = name, version, address, port, "refreshed service instance");
        }

        key
    }

    /// Remove an instance permanently
    ///
    /// A no-op when the key was never registered; the computed key is
    /// returned either way.
    pub fn unregister(&self, name: &str, version: &str, address: &str, port: u16) -> InstanceKey {
        let key = InstanceKey::new(name, version, address, port);

        if self.instances.remove(&key).is_some() {
            debug!(service = name, version, address, port, "removed service instance");
        }

        key
    }

    /// All stored instances with exactly this name, live or inactive
    pub fn lookup(&self, name: &str) -> Vec<ServiceInstance> {
        self.sweep();

        self.instances
            .iter()
            .filter(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Locate one instance of `name` satisfying the version range
    ///
    /// Active candidates are preferred; with none left the last-known
    /// inactive candidates are used. A malformed range fails only this
    /// request and leaves the table untouched.
    pub fn find(&self, name: &str, range: &str) -> Result<ServiceInstance> {
        self.sweep();

        let range = VersionRange::parse(range)?;
        let candidates: Vec<ServiceInstance> = self
            .instances
            .iter()
            .filter(|entry| {
                let instance = entry.value();
                instance.name == name && range.matches(&instance.version)
            })
            .map(|entry| entry.value().clone())
            .collect();

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        selector::select(&candidates, &mut *rng)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Number of stored instances, live or inactive
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the directory holds no instances at all
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Count of instances per status, for operator reporting
    pub fn status_counts(&self) -> (usize, usize) {
        let mut active = 0;
        let mut inactive = 0;
        for entry in self.instances.iter() {
            match entry.value().status {
                InstanceStatus::Active => active += 1,
                InstanceStatus::Inactive => inactive += 1,
            }
        }
        (active, inactive)
    }

    /// Reclassify entries whose heartbeat has expired
    ///
    /// Expired Active entries become Inactive but stay in the table; the
    /// pass never deletes and never revives, so re-applying it is a
    /// no-op.
    fn sweep(&self) {
        self.sweep_at(Utc::now());
    }

    fn sweep_at(&self, now: DateTime<Utc>) {
        for mut entry in self.instances.iter_mut() {
            let instance = entry.value_mut();
            if instance.is_active() && instance.is_expired(now, self.timeout) {
                instance.status = InstanceStatus::Inactive;
                debug!(key = %entry.key(), "service instance went down");
            }
        }
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_HEARTBEAT_TIMEOUT_SECS as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registry() -> ServiceRegistry {
        ServiceRegistry::with_rng(Duration::seconds(30), StdRng::seed_from_u64(42))
    }

    /// Backdate a stored heartbeat so tests can cross the timeout
    /// without sleeping.
    fn age_heartbeat(registry: &ServiceRegistry, key: &InstanceKey, secs: i64) {
        let mut entry = registry.instances.get_mut(key).unwrap();
        entry.last_heartbeat = entry.last_heartbeat - Duration::seconds(secs);
    }

    #[test]
    fn find_before_expiry_returns_the_instance() {
        let registry = registry();
        registry.register("pay", "1.5.0", "10.0.0.1", 9000);

        let found = registry.find("pay", "^1.0").unwrap();
        assert_eq!(found.port, 9000);
        assert_eq!(found.status, InstanceStatus::Active);
    }

    #[test]
    fn register_twice_keeps_one_entry_and_refreshes() {
        let registry = registry();
        let first = registry.register("pay", "1.5.0", "10.0.0.1", 9000);
        age_heartbeat(&registry, &first, 10);
        let before = registry.instances.get(&first).unwrap().last_heartbeat;

        let second = registry.register("pay", "1.5.0", "10.0.0.1", 9000);

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        let entry = registry.instances.get(&first).unwrap();
        assert!(entry.last_heartbeat > before);
        assert_eq!(entry.status, InstanceStatus::Active);
    }

    #[test]
    fn unregister_removes_the_entry() {
        let registry = registry();
        registry.register("pay", "1.5.0", "10.0.0.1", 9000);
        registry.unregister("pay", "1.5.0", "10.0.0.1", 9000);

        assert!(registry.is_empty());
        assert!(matches!(
            registry.find("pay", "*"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn unregister_unknown_key_is_a_safe_noop() {
        let registry = registry();
        registry.register("pay", "1.5.0", "10.0.0.1", 9000);

        let key = registry.unregister("orders", "2.0.0", "10.0.0.2", 9001);

        assert_eq!(key, InstanceKey::new("orders", "2.0.0", "10.0.0.2", 9001));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn find_on_empty_directory_is_not_found() {
        let registry = registry();
        let err = registry.find("pay", "*").unwrap_err();
        assert_eq!(err.to_string(), "pay not found");
    }

    #[test]
    fn find_filters_by_version_range() {
        let registry = registry();
        registry.register("pay", "1.5.0", "10.0.0.1", 9000);
        registry.register("pay", "2.0.0", "10.0.0.1", 9001);

        for _ in 0..16 {
            let found = registry.find("pay", ">=1.0.0 <2.0.0").unwrap();
            assert_eq!(found.version, "1.5.0");
        }
    }

    #[test]
    fn name_match_is_exact_and_case_sensitive() {
        let registry = registry();
        registry.register("pay", "1.5.0", "10.0.0.1", 9000);

        assert!(registry.find("Pay", "*").is_err());
        assert!(registry.find("pa", "*").is_err());
        assert!(registry.lookup("pay-service").is_empty());
    }

    #[test]
    fn malformed_range_fails_the_request_only() {
        let registry = registry();
        registry.register("pay", "1.5.0", "10.0.0.1", 9000);

        let err = registry.find("pay", "not a range").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidVersionRange { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn expired_instance_is_returned_inactive_then_revived_by_register() {
        let registry = registry();
        let key = registry.register("pay", "1.5.0", "10.0.0.1", 9000);

        age_heartbeat(&registry, &key, 31);
        let found = registry.find("pay", "*").unwrap();
        assert_eq!(found.status, InstanceStatus::Inactive);

        registry.register("pay", "1.5.0", "10.0.0.1", 9000);
        let found = registry.find("pay", "*").unwrap();
        assert_eq!(found.status, InstanceStatus::Active);
    }

    #[test]
    fn sweep_never_deletes_and_never_revives() {
        let registry = registry();
        let key = registry.register("pay", "1.5.0", "10.0.0.1", 9000);
        age_heartbeat(&registry, &key, 31);

        registry.sweep();
        registry.sweep();

        assert_eq!(registry.len(), 1);
        let entry = registry.instances.get(&key).unwrap();
        assert_eq!(entry.status, InstanceStatus::Inactive);
    }

    #[test]
    fn active_candidate_preferred_over_expired_one() {
        let registry = registry();
        let stale = registry.register("pay", "1.5.0", "10.0.0.1", 9000);
        registry.register("pay", "1.6.0", "10.0.0.1", 9001);
        age_heartbeat(&registry, &stale, 31);

        for _ in 0..16 {
            let found = registry.find("pay", "^1.0").unwrap();
            assert_eq!(found.port, 9001);
        }
    }

    #[test]
    fn lookup_returns_live_and_inactive_entries() {
        let registry = registry();
        let stale = registry.register("pay", "1.5.0", "10.0.0.1", 9000);
        registry.register("pay", "2.0.0", "10.0.0.1", 9001);
        registry.register("orders", "1.0.0", "10.0.0.2", 9002);
        age_heartbeat(&registry, &stale, 31);

        let entries = registry.lookup("pay");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|i| i.name == "pay"));
    }

    #[test]
    fn concurrent_distinct_registrations_all_land() {
        let registry = Arc::new(registry());
        let mut handles = Vec::new();

        for i in 0..16u16 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                registry.register("pay", "1.0.0", "10.0.0.1", 9000 + i);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 16);
    }

    #[test]
    fn concurrent_heartbeats_for_one_key_keep_one_entry() {
        let registry = Arc::new(registry());
        let mut handles = Vec::new();

        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                registry.register("pay", "1.0.0", "10.0.0.1", 9000);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn seeded_registries_select_identically() {
        let build = || {
            let registry =
                ServiceRegistry::with_rng(Duration::seconds(30), StdRng::seed_from_u64(7));
            registry.register("pay", "1.5.0", "10.0.0.1", 9000);
            registry.register("pay", "1.6.0", "10.0.0.1", 9001);
            registry.register("pay", "1.7.0", "10.0.0.1", 9002);
            registry
        };

        let a = build();
        let b = build();
        for _ in 0..8 {
            assert_eq!(
                a.find("pay", "^1.0").unwrap().port,
                b.find("pay", "^1.0").unwrap().port
            );
        }
    }

    #[test]
    fn status_counts_track_the_sweep() {
        let registry = registry();
        let stale = registry.register("pay", "1.5.0", "10.0.0.1", 9000);
        registry.register("pay", "1.6.0", "10.0.0.1", 9001);
        age_heartbeat(&registry, &stale, 31);
        registry.sweep();

        assert_eq!(registry.status_counts(), (1, 1));
    }
}
