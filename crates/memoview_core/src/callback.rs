//! Callback values and identity stabilization
//!
//! A [`Callback`] is a shared function value. Like any other shared value it
//! compares by identity, so constructing a new closure every pass defeats
//! every memo cell downstream. [`StableCallback`] keeps handing out the same
//! callback until its dependencies change.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::input::InputSet;
use crate::memo::MemoCell;
use crate::value::Value;

type CallbackFn = dyn Fn(&Value) -> Result<Value> + Send + Sync;

/// A shared function value with identity equality
#[derive(Clone)]
pub struct Callback {
    f: Arc<CallbackFn>,
    name: Option<&'static str>,
}

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            name: None,
        }
    }

    /// Create a callback with a debug name
    pub fn named<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            name: Some(name),
        }
    }

    /// Invoke the callback
    pub fn call(&self, arg: &Value) -> Result<Value> {
        (self.f)(arg)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        // data pointers only, vtable addresses are not unique
        Arc::as_ptr(&self.f) as *const () == Arc::as_ptr(&other.f) as *const ()
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ptr = Arc::as_ptr(&self.f) as *const ();
        match self.name {
            Some(name) => write!(f, "Callback({name} @ {ptr:p})"),
            None => write!(f, "Callback({ptr:p})"),
        }
    }
}

/// Hands out the same [`Callback`] while its dependencies are unchanged
///
/// ```rust
/// use memoview_core::{Callback, InputSet, StableCallback};
///
/// let mut on_remove = StableCallback::new();
///
/// let a = on_remove.get(InputSet::new(), || Callback::new(|id| Ok(id.clone())));
/// let b = on_remove.get(InputSet::new(), || Callback::new(|id| Ok(id.clone())));
/// assert!(a.ptr_eq(&b));
/// ```
#[derive(Debug, Default)]
pub struct StableCallback {
    cell: MemoCell<Callback>,
}

impl StableCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached callback, or build a new one if `deps` changed
    pub fn get<F>(&mut self, deps: InputSet, make: F) -> Callback
    where
        F: FnOnce() -> Callback,
    {
        self.cell.evaluate(deps, make)
    }

    /// How many distinct callbacks have been created so far
    pub fn generations(&self) -> u64 {
        self.cell.stats().misses
    }
}
