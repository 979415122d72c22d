//! # Argument Packing
//!
//! Builds the positional argument list handed to every subscriber during a
//! broadcast.
//!
//! ## Ordering
//!
//! Receivers inspect arguments starting from the end, so the list is stored
//! in **reverse** call order: the last argument supplied lands in slot 0 and
//! the first one lands in slot `n - 1`.
//!
//! ```ignore
//! use cp_types::{pack_args, Variant};
//!
//! let mut buf = vec![Variant::Empty; 4];
//! let args = pack_args!(buf, 100_i32, "x")?;
//! assert_eq!(args.get(0), Some(&Variant::from("x")));
//! assert_eq!(args.get(1), Some(&Variant::I4(100)));
//! ```

use crate::errors::ConnectionError;
use crate::variant::Variant;

/// Positional argument list, borrowed from caller-owned storage.
///
/// Named arguments are not supported; `named_count` is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackedArguments<'a> {
    args: Option<&'a [Variant]>,
    named_count: usize,
}

impl<'a> PackedArguments<'a> {
    /// An argument list with no entries and no backing storage.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            args: None,
            named_count: 0,
        }
    }

    /// Backing slice; `None` when there are no arguments.
    #[must_use]
    pub fn args(&self) -> Option<&'a [Variant]> {
        self.args
    }

    /// Number of positional arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.map_or(0, <[Variant]>::len)
    }

    /// Whether the list has no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of named arguments (always 0).
    #[must_use]
    pub fn named_count(&self) -> usize {
        self.named_count
    }

    /// Argument at slot `index` (slot 0 is the last argument supplied).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Variant> {
        self.args.and_then(|args| args.get(index))
    }

    /// Iterate slots in storage order.
    pub fn iter(&self) -> std::slice::Iter<'a, Variant> {
        self.args.unwrap_or(&[]).iter()
    }

    /// Iterate arguments in the order the caller supplied them.
    pub fn call_order(&self) -> impl Iterator<Item = &'a Variant> {
        self.iter().rev()
    }
}

/// Packs a variadic call into a [`PackedArguments`] list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentPacker;

impl ArgumentPacker {
    /// Pack `args` into `dest` in reverse order.
    ///
    /// Values are stored as given; no coercion happens. Zero arguments
    /// produce an empty list without touching `dest`.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::InvalidArgument` - `dest` is `None` while `args`
    ///   is non-empty, or `dest` has fewer slots than `args`
    pub fn pack(
        dest: Option<&mut [Variant]>,
        args: Vec<Variant>,
    ) -> Result<PackedArguments<'_>, ConnectionError> {
        let count = args.len();
        if count == 0 {
            return Ok(PackedArguments::empty());
        }

        let Some(dest) = dest else {
            return Err(ConnectionError::InvalidArgument(format!(
                "no destination buffer for {count} argument(s)"
            )));
        };

        if dest.len() < count {
            return Err(ConnectionError::InvalidArgument(format!(
                "destination holds {} slot(s), {count} argument(s) supplied",
                dest.len()
            )));
        }

        for (slot, arg) in dest.iter_mut().zip(args.into_iter().rev()) {
            *slot = arg;
        }

        Ok(PackedArguments {
            args: Some(&dest[..count]),
            named_count: 0,
        })
    }
}

/// Pack a variadic argument list into a buffer.
///
/// Each argument goes through `Variant::from`, so primitives and ready-made
/// `Variant`s can be mixed. Expands to `ArgumentPacker::pack`.
#[macro_export]
macro_rules! pack_args {
    ($dest:expr $(, $arg:expr)* $(,)?) => {
        $crate::ArgumentPacker::pack(
            Some(&mut $dest[..]),
            vec![$($crate::Variant::from($arg)),*],
        )
    };
}
