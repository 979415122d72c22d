//! # Capability Container
//!
//! Owns the registries of one component, keyed by capability.
//!
//! ## Default Registry
//!
//! The first registry ever created is the container's default. Under
//! [`LookupPolicy::Compatible`] the very first lookup is always satisfied by
//! it, whatever capability was asked for, and every wildcard lookup returns
//! it afterwards. A later lookup for a capability with no registry yet gets a
//! fresh one.
//!
//! A default created by a wildcard lookup serves `Dispatch` but is keyed by
//! the wildcard, so a later exact `Dispatch` lookup gets its own registry.

use crate::config::{BusConfig, LookupPolicy};
use crate::enumerators::Registries;
use crate::registry::SubscriptionRegistry;
use cp_types::CapabilityId;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Capability the default registry serves when it is created by a wildcard
/// lookup.
const DEFAULT_CAPABILITY: CapabilityId = CapabilityId::Dispatch;

/// A stored registry and the capability it was looked up under.
///
/// A default registry created by a wildcard lookup is keyed `Wildcard`, so
/// exact lookups never match it even though it serves `Dispatch`.
struct Entry {
    key: CapabilityId,
    registry: Arc<SubscriptionRegistry>,
}

/// Mapping from capability to registry, at most one registry per capability.
pub struct CapabilityContainer {
    policy: LookupPolicy,

    /// Creation order; element 0 is the default registry.
    registries: Mutex<Vec<Entry>>,

    /// Handed to registries so they can reach back to their container.
    self_ref: Weak<CapabilityContainer>,
}

impl CapabilityContainer {
    /// Create an empty container with the compatible lookup policy.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_policy(LookupPolicy::default())
    }

    /// Create an empty container with the given lookup policy.
    #[must_use]
    pub fn with_policy(policy: LookupPolicy) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            policy,
            registries: Mutex::new(Vec::new()),
            self_ref: self_ref.clone(),
        })
    }

    /// Create an empty container configured from `config`.
    #[must_use]
    pub fn from_config(config: &BusConfig) -> Arc<Self> {
        Self::with_policy(config.lookup_policy)
    }

    /// Lookup policy of this container.
    #[must_use]
    pub fn policy(&self) -> LookupPolicy {
        self.policy
    }

    /// Return the registry for `capability`, creating it if necessary.
    pub fn find_or_create(&self, capability: CapabilityId) -> Arc<SubscriptionRegistry> {
        let mut registries = self.registries.lock();

        if self.policy == LookupPolicy::Compatible
            && (capability.is_wildcard() || registries.is_empty())
        {
            if let Some(default) = registries.first() {
                return Arc::clone(&default.registry);
            }
            let serves = if capability.is_wildcard() {
                DEFAULT_CAPABILITY
            } else {
                capability
            };
            return self.create_locked(&mut registries, capability, serves);
        }

        let key = if capability.is_wildcard() {
            DEFAULT_CAPABILITY
        } else {
            capability
        };

        if let Some(existing) = registries.iter().find(|e| e.key == key) {
            return Arc::clone(&existing.registry);
        }
        self.create_locked(&mut registries, key, key)
    }

    fn create_locked(
        &self,
        registries: &mut Vec<Entry>,
        key: CapabilityId,
        capability: CapabilityId,
    ) -> Arc<SubscriptionRegistry> {
        let registry = Arc::new(SubscriptionRegistry::attached(
            capability,
            self.self_ref.clone(),
        ));
        registries.push(Entry {
            key,
            registry: Arc::clone(&registry),
        });

        debug!(
            key = %key,
            capability = %capability,
            registries = registries.len(),
            "Subscription registry created"
        );
        registry
    }

    /// Snapshot the registries held by this container.
    #[must_use]
    pub fn enumerate(&self) -> Registries {
        let snapshot = self
            .registries
            .lock()
            .iter()
            .map(|e| Arc::clone(&e.registry))
            .collect();
        Registries::new(snapshot)
    }

    /// Number of registries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registries.lock().len()
    }

    /// Whether no registry has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registries.lock().is_empty()
    }
}

impl fmt::Debug for CapabilityContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityContainer")
            .field("policy", &self.policy)
            .field("registries", &self.len())
            .finish()
    }
}

impl Drop for CapabilityContainer {
    fn drop(&mut self) {
        debug!(
            registries = self.registries.get_mut().len(),
            "Capability container dropped"
        );
    }
}
