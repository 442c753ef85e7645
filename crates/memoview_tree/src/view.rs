//! View descriptions
//!
//! A [`View`] describes a node: how to derive its inputs from application
//! state (and its parent's output), the pure render function turning those
//! inputs into an [`Output`], the equality policy of its memo cell, and its
//! child slots. Views are immutable and cheap to clone; the live state lives
//! in [`ViewNode`](crate::node::ViewNode).
//!
//! # Example
//!
//! ```rust
//! use memoview_core::{InputSet, Value};
//! use memoview_tree::View;
//!
//! struct Counter {
//!     count: i64,
//! }
//!
//! let view = View::<Counter>::new("root", |inputs| {
//!     Ok(Value::text(inputs.int("count")?.to_string()))
//! })
//! .with_inputs(|scope| InputSet::new().with("count", scope.state.count));
//! ```

use std::fmt;
use std::sync::Arc;

use memoview_core::{EqualityPolicy, InputSet, Output, RenderError};

use crate::id::Key;

/// Pure function from inputs to output
pub type RenderFn = Arc<dyn Fn(&InputSet) -> Result<Output, RenderError> + Send + Sync>;

/// Derives a node's inputs for the current pass
pub type InputsFn<S> = Arc<dyn Fn(&Scope<'_, S>) -> InputSet + Send + Sync>;

/// Produces the keys of a keyed child list for the current pass
pub type KeysFn<S> = Arc<dyn Fn(&Scope<'_, S>) -> Vec<Key> + Send + Sync>;

/// Builds the view for a newly inserted key
pub type TemplateFn<S> = Arc<dyn Fn(&Key) -> View<S> + Send + Sync>;

/// What a node can see while deriving its inputs
pub struct Scope<'a, S> {
    /// Application state of the current pass
    pub state: &'a S,
    /// Output the parent produced in this pass (`None` for the root)
    pub parent: Option<&'a Output>,
}

/// Description of a view node
pub struct View<S> {
    name: Arc<str>,
    inputs: InputsFn<S>,
    render: RenderFn,
    policy: EqualityPolicy,
    children: Vec<ChildSlot<S>>,
}

impl<S> Clone for View<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            inputs: self.inputs.clone(),
            render: self.render.clone(),
            policy: self.policy.clone(),
            children: self.children.clone(),
        }
    }
}

impl<S: 'static> View<S> {
    /// Create a view with no inputs and no children
    pub fn new<F>(name: impl Into<Arc<str>>, render: F) -> Self
    where
        F: Fn(&InputSet) -> Result<Output, RenderError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            inputs: Arc::new(no_inputs::<S>),
            render: Arc::new(render),
            policy: EqualityPolicy::shallow(),
            children: Vec::new(),
        }
    }

    /// Set how inputs are derived each pass
    pub fn with_inputs<F>(mut self, inputs: F) -> Self
    where
        F: Fn(&Scope<'_, S>) -> InputSet + Send + Sync + 'static,
    {
        self.inputs = Arc::new(inputs);
        self
    }

    /// Set the equality policy of this node's memo cell
    pub fn with_policy(mut self, policy: EqualityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Append a single child
    pub fn with_child(mut self, child: View<S>) -> Self {
        self.children.push(ChildSlot::Single(child));
        self
    }

    /// Append a keyed child list
    pub fn with_keyed(mut self, list: KeyedChildren<S>) -> Self {
        self.children.push(ChildSlot::Keyed(list));
        self
    }

    /// Replace all child slots
    pub fn with_children(mut self, children: Vec<ChildSlot<S>>) -> Self {
        self.children = children;
        self
    }
}

fn no_inputs<S>(_: &Scope<'_, S>) -> InputSet {
    InputSet::new()
}

impl<S> View<S> {
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn policy(&self) -> &EqualityPolicy {
        &self.policy
    }

    pub fn children(&self) -> &[ChildSlot<S>] {
        &self.children
    }

    /// Derive this view's inputs for the given scope
    pub fn derive_inputs(&self, scope: &Scope<'_, S>) -> InputSet {
        (self.inputs)(scope)
    }

    /// Run the render function directly, bypassing any cache
    pub fn render(&self, inputs: &InputSet) -> Result<Output, RenderError> {
        (self.render)(inputs)
    }
}

impl<S> fmt::Debug for View<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// A child position of a view
pub enum ChildSlot<S> {
    /// Exactly one child, created the first time it is reached
    Single(View<S>),
    /// A list of children identified by key
    Keyed(KeyedChildren<S>),
}

impl<S> Clone for ChildSlot<S> {
    fn clone(&self) -> Self {
        match self {
            ChildSlot::Single(view) => ChildSlot::Single(view.clone()),
            ChildSlot::Keyed(list) => ChildSlot::Keyed(list.clone()),
        }
    }
}

impl<S> fmt::Debug for ChildSlot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildSlot::Single(view) => f.debug_tuple("Single").field(view).finish(),
            ChildSlot::Keyed(list) => f.debug_tuple("Keyed").field(&list.name).finish(),
        }
    }
}

/// A keyed child list: which keys exist this pass, and how to build a child
/// for a key seen for the first time
pub struct KeyedChildren<S> {
    name: Arc<str>,
    keys: KeysFn<S>,
    template: TemplateFn<S>,
}

impl<S> Clone for KeyedChildren<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            keys: self.keys.clone(),
            template: self.template.clone(),
        }
    }
}

impl<S: 'static> KeyedChildren<S> {
    pub fn new<K, T>(name: impl Into<Arc<str>>, keys: K, template: T) -> Self
    where
        K: Fn(&Scope<'_, S>) -> Vec<Key> + Send + Sync + 'static,
        T: Fn(&Key) -> View<S> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            keys: Arc::new(keys),
            template: Arc::new(template),
        }
    }
}

impl<S> KeyedChildren<S> {
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn keys(&self, scope: &Scope<'_, S>) -> Vec<Key> {
        (self.keys)(scope)
    }

    pub fn instantiate(&self, key: &Key) -> View<S> {
        (self.template)(key)
    }
}
