//! Ordered, named inputs passed to a render function
//!
//! An [`InputSet`] is what a memo cell compares between passes. Order is
//! significant: two sets are only comparable when they carry the same names
//! in the same positions.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::callback::Callback;
use crate::error::{RenderError, Result};
use crate::value::{Record, Value};

/// An ordered sequence of named values
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSet {
    entries: SmallVec<[(Arc<str>, Value); 4]>,
}

impl InputSet {
    /// Create an empty input set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace a named value
    ///
    /// Replacing keeps the original position so the set stays comparable
    /// with earlier passes.
    pub fn set(&mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Return a copy of `self` with every entry of `other` set on top
    pub fn merged(&self, other: &InputSet) -> InputSet {
        let mut out = self.clone();
        for (name, value) in other.iter() {
            out.set(name.clone(), value.clone());
        }
        out
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| &**n)
    }

    // =========================================================================
    // TYPED ACCESS (for render functions)
    // =========================================================================

    /// Get a value or fail with [`RenderError::MissingInput`]
    pub fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| RenderError::MissingInput(name.into()))
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value.as_int().ok_or_else(|| mismatch(name, "int", value))
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        let value = self.require(name)?;
        value.as_float().ok_or_else(|| mismatch(name, "float", value))
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        let value = self.require(name)?;
        value.as_bool().ok_or_else(|| mismatch(name, "bool", value))
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        let value = self.require(name)?;
        value.as_text().ok_or_else(|| mismatch(name, "text", value))
    }

    pub fn list(&self, name: &str) -> Result<&[Value]> {
        let value = self.require(name)?;
        value.as_list().ok_or_else(|| mismatch(name, "list", value))
    }

    pub fn record(&self, name: &str) -> Result<&Record> {
        let value = self.require(name)?;
        value.as_record().ok_or_else(|| mismatch(name, "record", value))
    }

    pub fn callback(&self, name: &str) -> Result<&Callback> {
        let value = self.require(name)?;
        value
            .as_callback()
            .ok_or_else(|| mismatch(name, "callback", value))
    }
}

fn mismatch(name: &str, expected: &'static str, found: &Value) -> RenderError {
    RenderError::TypeMismatch {
        input: name.into(),
        expected,
        found: found.kind(),
    }
}

impl<K, V> FromIterator<(K, V)> for InputSet
where
    K: Into<Arc<str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = InputSet::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}
