//! Node identities and list keys

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identity of a child inside a keyed list
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(Arc<str>),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<u32> for Key {
    fn from(i: u32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.into())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s.into())
    }
}

/// Stable, path-shaped identity of a view node
///
/// - root: `root`
/// - single child: `root/header`
/// - repeated single child: `root/cell#1` (second `cell` slot)
/// - keyed child: `root/items[3]`, or `root/tabs["settings"]` for string keys
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub fn root(name: &str) -> Self {
        NodeId(name.into())
    }

    /// Id of a single child slot under this node
    pub fn child(&self, name: &str) -> Self {
        NodeId(format!("{}/{}", self.0, name).into())
    }

    /// Id of the `occurrence`-th single child named `name` under this node
    ///
    /// The first occurrence keeps the plain [`NodeId::child`] form.
    pub fn nth_child(&self, name: &str, occurrence: usize) -> Self {
        if occurrence == 0 {
            return self.child(name);
        }
        NodeId(format!("{}/{}#{}", self.0, name, occurrence).into())
    }

    /// Id of a keyed child in the list slot `slot`
    ///
    /// String keys are quoted so `Key::Int(1)` and `Key::Str("1")` differ.
    pub fn keyed(&self, slot: &str, key: &Key) -> Self {
        let id = match key {
            Key::Int(i) => format!("{}/{}[{}]", self.0, slot, i),
            Key::Str(s) => format!("{}/{}[{:?}]", self.0, slot, s),
        };
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
