//! memoview Core
//!
//! Caching primitives for the memoized view graph:
//!
//! - **Values**: primitives compare by value, shared values by identity
//! - **Input Sets**: ordered, named inputs of a single computation
//! - **Equality Policies**: shallow by default, structural or custom per input
//! - **Memo Cells**: a cache of one, recomputing only on a policy miss
//! - **Stable Callbacks**: callback values whose identity survives passes
//!
//! # Example
//!
//! ```rust
//! use memoview_core::{EqualityPolicy, InputSet, MemoCell, Value};
//!
//! let mut total = MemoCell::with_policy(EqualityPolicy::shallow().with_structural("prices"));
//!
//! let sum = |inputs: &InputSet| -> i64 {
//!     inputs
//!         .list("prices")
//!         .map(|items| items.iter().filter_map(Value::as_int).sum())
//!         .unwrap_or(0)
//! };
//!
//! let inputs = InputSet::new().with("prices", Value::list([999, 599, 25]));
//! assert_eq!(total.evaluate(inputs.clone(), || sum(&inputs)), 1623);
//!
//! // a rebuilt but identical list is still a hit
//! let rebuilt = InputSet::new().with("prices", Value::list([999, 599, 25]));
//! total.evaluate(rebuilt, || unreachable!());
//! assert_eq!(total.stats().hits, 1);
//! ```

pub mod callback;
pub mod equality;
pub mod error;
pub mod input;
pub mod memo;
pub mod value;

pub use callback::{Callback, StableCallback};
pub use equality::{EqualityPolicy, InputComparator, SetComparator};
pub use error::{EqualityError, RenderError};
pub use input::InputSet;
pub use memo::{CacheOutcome, Evaluation, MemoCell, MemoStats, MissReason};
pub use value::{Record, Value};

/// Rendered output of a view; an opaque description of what to display
pub type Output = Value;
