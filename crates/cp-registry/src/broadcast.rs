//! # Broadcaster
//!
//! Invokes one operation on every current subscriber of a registry.
//!
//! Dispatch is sequential over an enumeration snapshot taken when the
//! broadcast starts:
//!
//! - [`Broadcaster::invoke`] stops at the first failing subscriber and
//!   returns its error; later subscribers are not called.
//! - [`Broadcaster::invoke_with_deadline`] bounds each call by a timeout.
//!   A timeout is recorded and dispatch moves on; a subscriber error is
//!   recorded and stops dispatch. A timed-out call is dropped at the
//!   deadline, which cancels it at its next await point.

use crate::config::BusConfig;
use crate::enumerators::Connection;
use crate::metrics::BroadcastMetrics;
use crate::registry::SubscriptionRegistry;
use cp_types::{ConnectionError, OperationId, PackedArguments};
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a deadline-bounded broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscribers that returned success.
    pub delivered: usize,
    /// Failures and timeouts, in dispatch order.
    pub failures: Vec<ConnectionError>,
}

impl DispatchReport {
    /// Whether every subscriber succeeded in time.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of subscribers that missed the deadline.
    #[must_use]
    pub fn timeouts(&self) -> usize {
        self.failures
            .iter()
            .filter(|e| matches!(e, ConnectionError::Timeout { .. }))
            .count()
    }

    /// Collapse into the first failure, if any.
    pub fn into_result(self) -> Result<usize, ConnectionError> {
        match self.failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.delivered),
        }
    }
}

/// Dispatches operations to registry subscribers.
#[derive(Debug, Default)]
pub struct Broadcaster {
    config: BusConfig,
    metrics: BroadcastMetrics,
}

impl Broadcaster {
    /// Create a broadcaster using `config` for its default deadline.
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            config,
            metrics: BroadcastMetrics::new(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Dispatch counters.
    #[must_use]
    pub fn metrics(&self) -> &BroadcastMetrics {
        &self.metrics
    }

    /// Call every subscriber with `(operation, args)`, failing fast.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::SubscriberFailure` - the first subscriber error,
    ///   returned verbatim; no later subscriber is called
    pub async fn invoke(
        &self,
        registry: &SubscriptionRegistry,
        operation: OperationId,
        args: &PackedArguments<'_>,
    ) -> Result<(), ConnectionError> {
        self.metrics.record_broadcast();

        for Connection { handle, subscriber } in registry.enumerate() {
            if let Err(source) = subscriber.invoke(operation, args).await {
                self.metrics.record_failure();
                warn!(
                    capability = %registry.capability(),
                    operation = %operation,
                    handle = %handle,
                    error = %source,
                    "Subscriber failed, aborting broadcast"
                );
                return Err(ConnectionError::SubscriberFailure { handle, source });
            }
            self.metrics.record_delivery();
        }

        debug!(
            capability = %registry.capability(),
            operation = %operation,
            args = args.len(),
            "Broadcast delivered"
        );
        Ok(())
    }

    /// Call every subscriber, bounding each call by `timeout`.
    ///
    /// A timeout is recorded against that subscriber only and dispatch
    /// continues with the next one. A subscriber error is recorded and stops
    /// dispatch, as in [`Self::invoke`].
    pub async fn invoke_with_deadline(
        &self,
        registry: &SubscriptionRegistry,
        operation: OperationId,
        args: &PackedArguments<'_>,
        timeout: Duration,
    ) -> DispatchReport {
        self.metrics.record_broadcast();
        let mut report = DispatchReport::default();

        for Connection { handle, subscriber } in registry.enumerate() {
            match tokio::time::timeout(timeout, subscriber.invoke(operation, args)).await {
                Ok(Ok(())) => {
                    self.metrics.record_delivery();
                    report.delivered += 1;
                }
                Ok(Err(source)) => {
                    self.metrics.record_failure();
                    warn!(
                        operation = %operation,
                        handle = %handle,
                        error = %source,
                        "Subscriber failed"
                    );
                    report
                        .failures
                        .push(ConnectionError::SubscriberFailure { handle, source });
                    break;
                }
                Err(_elapsed) => {
                    self.metrics.record_timeout();
                    warn!(
                        operation = %operation,
                        handle = %handle,
                        timeout = ?timeout,
                        "Subscriber timed out"
                    );
                    report
                        .failures
                        .push(ConnectionError::Timeout { handle, timeout });
                }
            }
        }

        debug!(
            capability = %registry.capability(),
            operation = %operation,
            delivered = report.delivered,
            failed = report.failures.len(),
            "Deadline broadcast finished"
        );
        report
    }

    /// [`Self::invoke_with_deadline`] with the configured timeout.
    pub async fn invoke_with_default_deadline(
        &self,
        registry: &SubscriptionRegistry,
        operation: OperationId,
        args: &PackedArguments<'_>,
    ) -> DispatchReport {
        self.invoke_with_deadline(registry, operation, args, self.config.invoke_timeout())
            .await
    }
}
