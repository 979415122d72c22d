//! # Subscriber
//!
//! The only contract the registry consumes from its environment: something
//! that can be invoked with an operation number and a packed argument list.

use async_trait::async_trait;
use cp_types::{OperationId, PackedArguments, SubscriberError};
use std::sync::Arc;

/// A sink that receives broadcasts.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Handle one broadcast.
    ///
    /// Arguments are in packed (reversed) order; see
    /// [`PackedArguments::call_order`] to read them as the caller supplied
    /// them.
    async fn invoke(
        &self,
        operation: OperationId,
        args: &PackedArguments<'_>,
    ) -> Result<(), SubscriberError>;
}

/// Shared reference to a subscriber.
pub type SubscriberRef = Arc<dyn Subscriber>;

/// Adapts a plain closure into a [`Subscriber`].
pub struct FnSubscriber<F> {
    handler: F,
}

impl<F> FnSubscriber<F>
where
    F: Fn(OperationId, &PackedArguments<'_>) -> Result<(), SubscriberError> + Send + Sync,
{
    /// Wrap `handler`.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> Subscriber for FnSubscriber<F>
where
    F: Fn(OperationId, &PackedArguments<'_>) -> Result<(), SubscriberError> + Send + Sync,
{
    async fn invoke(
        &self,
        operation: OperationId,
        args: &PackedArguments<'_>,
    ) -> Result<(), SubscriberError> {
        (self.handler)(operation, args)
    }
}

/// Build a shared subscriber from a closure.
pub fn subscriber_fn<F>(handler: F) -> SubscriberRef
where
    F: Fn(OperationId, &PackedArguments<'_>) -> Result<(), SubscriberError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnSubscriber::new(handler))
}
