//! # Subscription Registry
//!
//! Per-capability list of subscribers ("connection point").
//!
//! ## Slot Model
//!
//! ```text
//!  handle:   #1        #2        #3        #4
//!          ┌────────┬────────┬────────┬────────┐
//!  slots:  │  sub A │ vacant │  sub C │  null  │
//!          └────────┴────────┴────────┴────────┘
//! ```
//!
//! - Handle `n` always names slot `n - 1`; slots are appended, never moved.
//! - `unadvise` clears a slot in place, so handles are never reissued and
//!   indices taken by a running enumeration stay valid.
//! - A null source occupies its slot but is never yielded by `enumerate`.

use crate::container::CapabilityContainer;
use crate::enumerators::{Connection, Connections};
use crate::subscriber::SubscriberRef;
use cp_types::{CapabilityId, ConnectionError, SubscriptionHandle};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

enum Slot {
    Vacant,
    Occupied(Option<SubscriberRef>),
}

/// Ordered set of subscribers for one capability.
pub struct SubscriptionRegistry {
    /// Capability this registry serves.
    capability: CapabilityId,

    /// Owning container; dangling for standalone registries.
    container: Weak<CapabilityContainer>,

    /// Slot `i` belongs to handle `i + 1`.
    slots: Mutex<Vec<Slot>>,
}

impl SubscriptionRegistry {
    /// Create a standalone registry.
    #[must_use]
    pub fn new(capability: CapabilityId) -> Self {
        Self::attached(capability, Weak::new())
    }

    pub(crate) fn attached(capability: CapabilityId, container: Weak<CapabilityContainer>) -> Self {
        Self {
            capability,
            container,
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Capability this registry serves.
    #[must_use]
    pub fn capability(&self) -> CapabilityId {
        self.capability
    }

    /// The container that created this registry, if it is still alive.
    #[must_use]
    pub fn container(&self) -> Option<Arc<CapabilityContainer>> {
        self.container.upgrade()
    }

    /// Register a subscriber and return its handle.
    ///
    /// The handle is one greater than the highest handle this registry has
    /// ever issued. A `None` source is accepted and occupies a slot.
    pub fn advise(&self, subscriber: Option<SubscriberRef>) -> SubscriptionHandle {
        let is_null = subscriber.is_none();
        let handle = {
            let mut slots = self.slots.lock();
            slots.push(Slot::Occupied(subscriber));
            SubscriptionHandle::new(slots.len() as u64)
        };

        debug!(
            capability = %self.capability,
            handle = %handle,
            null_source = is_null,
            "Subscriber advised"
        );
        handle
    }

    /// Remove the subscription identified by `handle`.
    ///
    /// The reference held for the subscriber is dropped after the lock is
    /// released.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::NotFound` - `handle` is 0, was never issued, or
    ///   has already been removed
    pub fn unadvise(&self, handle: SubscriptionHandle) -> Result<(), ConnectionError> {
        let released = {
            let mut slots = self.slots.lock();
            let slot = usize::try_from(handle.get())
                .ok()
                .and_then(|raw| raw.checked_sub(1))
                .and_then(|index| slots.get_mut(index));

            let Some(slot) = slot else {
                return Err(ConnectionError::NotFound { handle });
            };
            if matches!(slot, Slot::Vacant) {
                return Err(ConnectionError::NotFound { handle });
            }
            std::mem::replace(slot, Slot::Vacant)
        };

        debug!(capability = %self.capability, handle = %handle, "Subscriber unadvised");
        drop(released);
        Ok(())
    }

    /// Snapshot the live subscribers.
    ///
    /// The lock is held only while the references are cloned; the returned
    /// iterator owns its items, so later `unadvise` calls do not affect
    /// subscribers already yielded. Subscriptions added after this call are
    /// not observed.
    #[must_use]
    pub fn enumerate(&self) -> Connections {
        let snapshot = self
            .slots
            .lock()
            .iter()
            .zip(1_u64..)
            .filter_map(|(slot, raw)| match slot {
                Slot::Occupied(Some(subscriber)) => Some(Connection {
                    handle: SubscriptionHandle::new(raw),
                    subscriber: Arc::clone(subscriber),
                }),
                _ => None,
            })
            .collect();
        Connections::new(snapshot)
    }

    /// Number of occupied slots, null sources included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count()
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest handle issued so far, `None` before the first `advise`.
    #[must_use]
    pub fn highest_handle(&self) -> Option<SubscriptionHandle> {
        let issued = self.slots.lock().len();
        (issued > 0).then_some(SubscriptionHandle::new(issued as u64))
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("capability", &self.capability)
            .field("subscribers", &self.len())
            .finish_non_exhaustive()
    }
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        let remaining = self
            .slots
            .get_mut()
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count();
        debug!(
            capability = %self.capability,
            released = remaining,
            "Subscription registry dropped"
        );
    }
}
