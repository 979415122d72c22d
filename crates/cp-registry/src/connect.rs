//! Connect and disconnect helpers
//!
//! Resolve a capability on a container and register or remove a source in
//! one step.

use crate::container::CapabilityContainer;
use crate::registry::SubscriptionRegistry;
use crate::subscriber::SubscriberRef;
use cp_types::{CapabilityId, ConnectionError, SubscriptionHandle};
use std::sync::Arc;
use tracing::debug;

/// Result of [`connect`].
#[derive(Debug, Clone)]
pub struct Connected {
    /// Handle to pass to `unadvise` or [`disconnect`].
    pub handle: SubscriptionHandle,
    /// Registry the source was added to, for later broadcasts.
    pub registry: Arc<SubscriptionRegistry>,
}

/// Register `source` with the registry `container` resolves for
/// `capability`.
///
/// A `None` source is registered as-is; callers must not expect it to be
/// invoked.
pub fn connect(
    source: Option<SubscriberRef>,
    capability: CapabilityId,
    container: &CapabilityContainer,
) -> Connected {
    let registry = container.find_or_create(capability);
    let handle = registry.advise(source);

    debug!(
        requested = %capability,
        resolved = %registry.capability(),
        handle = %handle,
        "Source connected"
    );
    Connected { handle, registry }
}

/// Remove the subscription `handle` from the registry `container` resolves
/// for `capability`.
///
/// # Errors
///
/// - `ConnectionError::NotFound` - propagated from `unadvise`
pub fn disconnect(
    capability: CapabilityId,
    container: &CapabilityContainer,
    handle: SubscriptionHandle,
) -> Result<Arc<SubscriptionRegistry>, ConnectionError> {
    let registry = container.find_or_create(capability);
    registry.unadvise(handle)?;

    debug!(requested = %capability, handle = %handle, "Source disconnected");
    Ok(registry)
}
