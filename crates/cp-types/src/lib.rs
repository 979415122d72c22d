//! # Connection-Point Types Crate
//!
//! Types shared by the registry core and by every subscriber implementation.
//!
//! ## Design Principles
//!
//! - **Closed argument set**: arguments travel as [`Variant`] values tagged
//!   with an [`ArgKind`]; there is no open-ended type introspection.
//! - **Reverse packing**: [`ArgumentPacker`] stores the last supplied argument
//!   in slot 0, because receivers walk arguments from the end.
//! - **Typed capabilities**: a registry serves exactly one [`CapabilityId`],
//!   with [`CapabilityId::Wildcard`] as the lookup sentinel.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod errors;
pub mod ids;
pub mod packing;
pub mod variant;

pub use errors::{ConnectionError, SubscriberError};
pub use ids::{CapabilityId, OperationId, SubscriptionHandle};
pub use packing::{ArgumentPacker, PackedArguments};
pub use variant::{ArgKind, ObjectRef, Variant};
