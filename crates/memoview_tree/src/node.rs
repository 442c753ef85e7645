//! Live view node instances

use indexmap::IndexMap;
use slotmap::new_key_type;
use smallvec::SmallVec;

use memoview_core::{Evaluation, InputSet, MemoCell, MemoStats, Output, RenderError};

use crate::id::{Key, NodeId};
use crate::view::{ChildSlot, View};

new_key_type! {
    /// Arena handle of a view node inside a [`ViewTree`](crate::tree::ViewTree)
    pub struct NodeKey;
}

/// Instantiated children of one child slot
#[derive(Debug)]
pub(crate) enum ChildInstance {
    Single(Option<NodeKey>),
    Keyed(IndexMap<Key, NodeKey>),
}

/// A view together with its cache and per-node bookkeeping
pub struct ViewNode<S> {
    id: NodeId,
    view: View<S>,
    memo: MemoCell<Output>,
    /// One entry per slot of `view.children()`
    pub(crate) children: Vec<ChildInstance>,
    render_count: u64,
    pub(crate) committed: Option<Output>,
}

impl<S> ViewNode<S> {
    pub(crate) fn new(id: NodeId, view: View<S>) -> Self {
        let memo = MemoCell::with_policy(view.policy().clone());
        let children = view
            .children()
            .iter()
            .map(|slot| match slot {
                ChildSlot::Single(_) => ChildInstance::Single(None),
                ChildSlot::Keyed(_) => ChildInstance::Keyed(IndexMap::new()),
            })
            .collect();

        Self {
            id,
            view,
            memo,
            children,
            render_count: 0,
            committed: None,
        }
    }

    /// Render through the memo cell
    ///
    /// The render counter only moves on a miss. A render error leaves the
    /// memo cell and the counter untouched.
    pub fn update(&mut self, inputs: InputSet) -> Result<Evaluation<Output>, RenderError> {
        let view = &self.view;
        let evaluation = self
            .memo
            .try_evaluate(inputs.clone(), || view.render(&inputs))?;

        if evaluation.outcome.is_miss() {
            self.render_count += 1;
        }
        Ok(evaluation)
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn view(&self) -> &View<S> {
        &self.view
    }

    /// Number of times the render function actually ran
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Output included in the last commit
    pub fn committed(&self) -> Option<&Output> {
        self.committed.as_ref()
    }

    pub fn memo_stats(&self) -> MemoStats {
        self.memo.stats()
    }

    pub fn last_inputs(&self) -> Option<&InputSet> {
        self.memo.last_inputs()
    }

    /// Arena keys of all instantiated children, in slot order
    pub(crate) fn child_keys(&self) -> SmallVec<[NodeKey; 8]> {
        let mut keys = SmallVec::new();
        for instance in &self.children {
            match instance {
                ChildInstance::Single(Some(key)) => keys.push(*key),
                ChildInstance::Single(None) => {}
                ChildInstance::Keyed(map) => keys.extend(map.values().copied()),
            }
        }
        keys
    }
}
