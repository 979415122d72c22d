//! # Error Types
//!
//! Defines the error taxonomy used across the workspace.

use crate::ids::SubscriptionHandle;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a subscriber's own `invoke` implementation.
///
/// The registry never inspects it; it is carried verbatim inside
/// [`ConnectionError::SubscriberFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscriber returned {code:#010x}: {message}")]
pub struct SubscriberError {
    /// Result code chosen by the subscriber.
    pub code: i32,
    /// Human readable detail.
    pub message: String,
}

impl SubscriberError {
    /// Generic failure code used when a subscriber has nothing more specific.
    pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;

    /// Create a subscriber error with an explicit code.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a subscriber error with the generic failure code.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(Self::E_FAIL, message)
    }
}

/// Errors returned by packing, registry and broadcast operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Malformed request, e.g. a packing buffer too small for the arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The handle was never issued, is 0, or has already been released.
    #[error("Subscription not found: {handle}")]
    NotFound { handle: SubscriptionHandle },

    /// A subscriber failed during broadcast.
    #[error("Subscriber {handle} failed: {source}")]
    SubscriberFailure {
        handle: SubscriptionHandle,
        #[source]
        source: SubscriberError,
    },

    /// A subscriber did not answer within the dispatch deadline.
    #[error("Subscriber {handle} timed out after {timeout:?}")]
    Timeout {
        handle: SubscriptionHandle,
        timeout: Duration,
    },
}

impl ConnectionError {
    /// Handle of the subscription the error refers to, if any.
    #[must_use]
    pub fn handle(&self) -> Option<SubscriptionHandle> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::NotFound { handle }
            | Self::SubscriberFailure { handle, .. }
            | Self::Timeout { handle, .. } => Some(*handle),
        }
    }
}
