//! # Argument Variants
//!
//! A [`Variant`] is one type-tagged argument. The set of kinds is closed and
//! the tag numbers follow the conventional variant-type codes so that traces
//! line up with what native sinks expect.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared reference to a caller-owned object passed as an argument.
///
/// Object arguments compare by identity, never by content.
pub type ObjectRef = Arc<dyn Any + Send + Sync>;

/// Type tag of a [`Variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ArgKind {
    Empty = 0,
    Null = 1,
    I2 = 2,
    I4 = 3,
    R8 = 5,
    Str = 8,
    Dispatch = 9,
    Error = 10,
    Bool = 11,
    Unknown = 13,
    U4 = 19,
    I8 = 20,
}

impl ArgKind {
    /// Numeric tag value.
    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Whether values of this kind carry an object reference.
    #[must_use]
    pub fn is_object(self) -> bool {
        matches!(self, Self::Dispatch | Self::Unknown)
    }
}

/// A single type-tagged argument value.
#[derive(Clone, Default)]
pub enum Variant {
    /// No value.
    #[default]
    Empty,
    /// Explicit null.
    Null,
    I2(i16),
    I4(i32),
    I8(i64),
    U4(u32),
    R8(f64),
    Bool(bool),
    Str(String),
    /// Object supporting the dispatch capability; `None` is a null reference.
    Dispatch(Option<ObjectRef>),
    /// Any other object; `None` is a null reference.
    Unknown(Option<ObjectRef>),
    /// Result code carried as a value.
    Error(i32),
}

impl Variant {
    /// Type tag of this value.
    #[must_use]
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::Empty => ArgKind::Empty,
            Self::Null => ArgKind::Null,
            Self::I2(_) => ArgKind::I2,
            Self::I4(_) => ArgKind::I4,
            Self::I8(_) => ArgKind::I8,
            Self::U4(_) => ArgKind::U4,
            Self::R8(_) => ArgKind::R8,
            Self::Bool(_) => ArgKind::Bool,
            Self::Str(_) => ArgKind::Str,
            Self::Dispatch(_) => ArgKind::Dispatch,
            Self::Unknown(_) => ArgKind::Unknown,
            Self::Error(_) => ArgKind::Error,
        }
    }

    /// Wrap a shared object as a dispatch argument.
    pub fn dispatch<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Self::Dispatch(Some(object as ObjectRef))
    }

    /// Wrap a shared object as a generic object argument.
    pub fn unknown<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Self::Unknown(Some(object as ObjectRef))
    }

    /// The 32-bit integer payload, if this is an `I4`.
    #[must_use]
    pub fn as_i4(&self) -> Option<i32> {
        match self {
            Self::I4(v) => Some(*v),
            _ => None,
        }
    }

    /// The string payload, if this is a `Str`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The object payload, if this is a non-null object reference.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Dispatch(obj) | Self::Unknown(obj) => obj.as_ref(),
            _ => None,
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) | (Self::Null, Self::Null) => true,
            (Self::I2(a), Self::I2(b)) => a == b,
            (Self::I4(a), Self::I4(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::U4(a), Self::U4(b)) => a == b,
            (Self::R8(a), Self::R8(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            (Self::Dispatch(a), Self::Dispatch(b)) | (Self::Unknown(a), Self::Unknown(b)) => {
                match (a, b) {
                    (None, None) => true,
                    (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Null => f.write_str("Null"),
            Self::I2(v) => f.debug_tuple("I2").field(v).finish(),
            Self::I4(v) => f.debug_tuple("I4").field(v).finish(),
            Self::I8(v) => f.debug_tuple("I8").field(v).finish(),
            Self::U4(v) => f.debug_tuple("U4").field(v).finish(),
            Self::R8(v) => f.debug_tuple("R8").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Error(v) => write!(f, "Error({v:#010x})"),
            Self::Dispatch(obj) => write!(f, "Dispatch({:?})", obj.as_ref().map(Arc::as_ptr)),
            Self::Unknown(obj) => write!(f, "Unknown({:?})", obj.as_ref().map(Arc::as_ptr)),
        }
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Self::I4(v)
    }
}

impl From<i64> for Variant {
    fn from(v: i64) -> Self {
        Self::I8(v)
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Self::R8(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}
