//! Value equality policies
//!
//! Decides whether two [`InputSet`]s are "the same" for caching purposes.
//!
//! The default is shallow: primitives by value, shared values by identity.
//! Rebuilding an options record or a list every pass therefore always looks
//! like a change. There are two independent ways out of that:
//!
//! - keep the upstream value's identity stable (see
//!   [`StableCallback`](crate::callback::StableCallback), or just reuse the
//!   same `Arc`)
//! - opt a single input into structural comparison with
//!   [`EqualityPolicy::with_structural`]
//!
//! # Example
//!
//! ```rust
//! use memoview_core::{EqualityPolicy, InputSet, Value};
//!
//! let a = InputSet::new().with("options", Value::list([1, 2]));
//! let b = InputSet::new().with("options", Value::list([1, 2]));
//!
//! assert_eq!(EqualityPolicy::shallow().equal(&a, &b), Ok(false));
//! assert_eq!(
//!     EqualityPolicy::shallow().with_structural("options").equal(&a, &b),
//!     Ok(true)
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::EqualityError;
use crate::input::InputSet;
use crate::value::Value;

/// Comparator for a single named input
pub type InputComparator =
    Arc<dyn Fn(&Value, &Value) -> Result<bool, EqualityError> + Send + Sync>;

/// Comparator for a whole input set
pub type SetComparator =
    Arc<dyn Fn(&InputSet, &InputSet) -> Result<bool, EqualityError> + Send + Sync>;

#[derive(Clone, Default)]
enum Mode {
    #[default]
    Shallow,
    Structural,
    Custom(SetComparator),
}

/// Policy deciding when two input sets are equal
#[derive(Clone, Default)]
pub struct EqualityPolicy {
    mode: Mode,
    /// Per-input comparators, consulted before the mode's default
    overrides: FxHashMap<Arc<str>, InputComparator>,
}

impl EqualityPolicy {
    /// Primitives by value, shared values by identity
    pub fn shallow() -> Self {
        Self::default()
    }

    /// Deep comparison for every input
    pub fn structural() -> Self {
        Self {
            mode: Mode::Structural,
            overrides: FxHashMap::default(),
        }
    }

    /// Replace the whole comparison with a custom function
    ///
    /// Per-input overrides are ignored in this mode.
    pub fn custom<F>(compare: F) -> Self
    where
        F: Fn(&InputSet, &InputSet) -> Result<bool, EqualityError> + Send + Sync + 'static,
    {
        Self {
            mode: Mode::Custom(Arc::new(compare)),
            overrides: FxHashMap::default(),
        }
    }

    /// Compare one input structurally, leaving the others on the default
    pub fn with_structural(self, name: impl Into<Arc<str>>) -> Self {
        self.with_comparator(name, |a: &Value, b: &Value| Ok(a.structural_eq(b)))
    }

    /// Compare one input with a custom function
    pub fn with_comparator<F>(mut self, name: impl Into<Arc<str>>, compare: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<bool, EqualityError> + Send + Sync + 'static,
    {
        self.overrides.insert(name.into(), Arc::new(compare));
        self
    }

    /// True for the plain default policy with no overrides
    pub fn is_shallow(&self) -> bool {
        matches!(self.mode, Mode::Shallow) && self.overrides.is_empty()
    }

    /// Decide whether `a` and `b` are equal under this policy
    ///
    /// An `Err` means a comparator failed; callers must treat that as
    /// "not equal".
    pub fn equal(&self, a: &InputSet, b: &InputSet) -> Result<bool, EqualityError> {
        if let Mode::Custom(compare) = &self.mode {
            return compare(a, b);
        }

        if a.len() != b.len() {
            return Ok(false);
        }

        for ((name_a, x), (name_b, y)) in a.iter().zip(b.iter()) {
            if name_a != name_b {
                return Ok(false);
            }

            let same = match self.overrides.get(name_a) {
                Some(compare) => compare(x, y).map_err(|err| match err.input {
                    Some(_) => err,
                    None => err.for_input(name_a.clone()),
                })?,
                None => match self.mode {
                    Mode::Structural => x.structural_eq(y),
                    _ => x.is_same(y),
                },
            };

            if !same {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

impl fmt::Debug for EqualityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Shallow => "shallow",
            Mode::Structural => "structural",
            Mode::Custom(_) => "custom",
        };
        let mut overrides: Vec<&str> = self.overrides.keys().map(|k| &**k).collect();
        overrides.sort_unstable();
        f.debug_struct("EqualityPolicy")
            .field("mode", &mode)
            .field("overrides", &overrides)
            .finish()
    }
}
