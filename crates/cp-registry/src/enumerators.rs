//! # Enumerators
//!
//! Snapshot iterators over a registry's subscribers and a container's
//! registries.
//!
//! Both are taken under the owner's lock and then walk their own copy, so the
//! owner may be mutated freely while an enumeration is in progress. Neither
//! can be reset or cloned; ask the owner for a fresh one instead.

use crate::registry::SubscriptionRegistry;
use crate::subscriber::SubscriberRef;
use cp_types::SubscriptionHandle;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;
use std::vec;

/// One live subscription yielded by [`Connections`].
#[derive(Clone)]
pub struct Connection {
    /// Handle the subscriber was registered under.
    pub handle: SubscriptionHandle,
    /// Independently owned reference to the subscriber.
    pub subscriber: SubscriberRef,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Subscribers of a registry, in ascending handle order.
#[derive(Debug)]
pub struct Connections {
    inner: vec::IntoIter<Connection>,
}

impl Connections {
    pub(crate) fn new(snapshot: Vec<Connection>) -> Self {
        Self {
            inner: snapshot.into_iter(),
        }
    }
}

impl Iterator for Connections {
    type Item = Connection;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Connections {}
impl FusedIterator for Connections {}

/// Registries held by a container, in creation order.
#[derive(Debug)]
pub struct Registries {
    inner: vec::IntoIter<Arc<SubscriptionRegistry>>,
}

impl Registries {
    pub(crate) fn new(snapshot: Vec<Arc<SubscriptionRegistry>>) -> Self {
        Self {
            inner: snapshot.into_iter(),
        }
    }
}

impl Iterator for Registries {
    type Item = Arc<SubscriptionRegistry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Registries {}
impl FusedIterator for Registries {}
