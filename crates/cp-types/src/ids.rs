//! # Identifiers
//!
//! Capability identifiers, operation numbers and subscription handles.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies which behaviour a registry serves.
///
/// The set is closed: the well-known capabilities have their own variant and
/// anything else is named by a UUID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityId {
    /// Lookup sentinel; always resolves to a container's default registry.
    #[default]
    Wildcard,
    /// Generic "invoke operation N with arguments" sinks.
    Dispatch,
    /// Property change notification sinks.
    PropertyNotify,
    /// Application defined capability.
    Custom(Uuid),
}

impl CapabilityId {
    /// Whether this is the lookup sentinel.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Dispatch => f.write_str("dispatch"),
            Self::PropertyNotify => f.write_str("property-notify"),
            Self::Custom(id) => write!(f, "{id}"),
        }
    }
}

/// Numeric identifier of the operation a broadcast invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub i32);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Identity returned by `advise`, used later to `unadvise`.
///
/// Handles start at 1 and are never reused within a registry; 0 is never
/// issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Wrap a raw handle value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
