//! # Connection-Point Registry
//!
//! Capability-scoped publish/subscribe: a container hands out one registry
//! per capability, subscribers register with a registry and get a stable
//! handle, and a broadcaster invokes an operation on every live subscriber.
//!
//! ## Flow
//!
//! ```text
//!  ┌──────────────┐  connect()   ┌─────────────────────┐
//!  │    Source    │ ───────────▶ │ CapabilityContainer │
//!  └──────────────┘              │  find_or_create()   │
//!                                └──────────┬──────────┘
//!                                           ▼
//!  ┌──────────────┐  invoke()    ┌─────────────────────┐
//!  │ Broadcaster  │ ───────────▶ │ SubscriptionRegistry│ ──▶ subscribers
//!  └──────────────┘  enumerate() └─────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Handles increase strictly and are never reused within a registry
//! - Removal clears a slot in place; running enumerations are unaffected
//! - Enumerations hand out owned references, so a subscriber outlives its
//!   removal for as long as any yielded reference is held
//! - Fail-fast broadcast: the first subscriber error stops dispatch

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod broadcast;
pub mod config;
pub mod connect;
pub mod container;
pub mod enumerators;
pub mod metrics;
pub mod registry;
pub mod subscriber;

// Re-export main types
pub use broadcast::{Broadcaster, DispatchReport};
pub use config::{BusConfig, BusConfigBuilder, BusConfigError, LookupPolicy};
pub use connect::{connect, disconnect, Connected};
pub use container::CapabilityContainer;
pub use enumerators::{Connection, Connections, Registries};
pub use metrics::{BroadcastMetrics, MetricsSnapshot};
pub use registry::SubscriptionRegistry;
pub use subscriber::{subscriber_fn, FnSubscriber, Subscriber, SubscriberRef};

/// Default per-subscriber deadline for deadline-bounded broadcasts.
pub const DEFAULT_INVOKE_TIMEOUT_MS: u64 = 5_000;
