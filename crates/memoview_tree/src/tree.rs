//! The view node tree
//!
//! Nodes live in a slot map arena and refer to their children by
//! [`NodeKey`]. A propagation pass walks the tree in pre-order, so every
//! child derives its inputs from its parent's freshly produced output.
//!
//! A parent's cache hit never short-circuits its children: each child is
//! visited and decides for itself through its own memo cell.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use memoview_core::{InputSet, MemoStats, Output};

use crate::diff::diff_keys;
use crate::error::NodeFault;
use crate::id::{Key, NodeId};
use crate::node::{ChildInstance, NodeKey, ViewNode};
use crate::surface::CommittedNode;
use crate::view::{ChildSlot, KeyedChildren, Scope, View};

/// Everything a single propagation produced
#[derive(Debug, Default)]
pub(crate) struct PassContext {
    pub frame: IndexMap<NodeId, CommittedNode>,
    pub recomputed: Vec<NodeId>,
    pub reused: usize,
    pub created: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub faults: Vec<NodeFault>,
}

/// Aggregated statistics over every live node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub node_count: usize,
    pub total_renders: u64,
    pub memo: MemoStats,
}

/// Owner of all view nodes
pub struct ViewTree<S> {
    nodes: SlotMap<NodeKey, ViewNode<S>>,
    index: FxHashMap<NodeId, NodeKey>,
    root: NodeKey,
}

impl<S: 'static> ViewTree<S> {
    /// Create a tree holding only the (not yet rendered) root node
    pub fn new(root: View<S>) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut index = FxHashMap::default();
        let id = NodeId::root(root.name());
        let root = nodes.insert(ViewNode::new(id.clone(), root));
        index.insert(id, root);
        Self { nodes, index, root }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &ViewNode<S> {
        &self.nodes[self.root]
    }

    /// Look a node up by its path id
    pub fn node(&self, id: &str) -> Option<&ViewNode<S>> {
        self.index.get(id).and_then(|key| self.nodes.get(*key))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids of all live nodes in pre-order
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get(key) {
                ids.push(node.id().clone());
                stack.extend(node.child_keys().into_iter().rev());
            }
        }
        ids
    }

    pub fn stats(&self) -> TreeStats {
        self.nodes
            .values()
            .fold(TreeStats::default(), |mut stats, node| {
                let memo = node.memo_stats();
                stats.node_count += 1;
                stats.total_renders += node.render_count();
                stats.memo.hits += memo.hits;
                stats.memo.misses += memo.misses;
                stats.memo.equality_faults += memo.equality_faults;
                stats
            })
    }

    // =========================================================================
    // PROPAGATION
    // =========================================================================

    /// Derive the root's inputs and list the names that differ from last pass
    pub(crate) fn collect(&self, state: &S) -> (InputSet, Vec<Arc<str>>) {
        let root = &self.nodes[self.root];
        let inputs = root.view().derive_inputs(&Scope {
            state,
            parent: None,
        });

        let changed = match root.last_inputs() {
            None => inputs.iter().map(|(name, _)| name.clone()).collect(),
            Some(last) => inputs
                .iter()
                .filter(|(name, value)| !last.get(name).is_some_and(|old| old.is_same(value)))
                .map(|(name, _)| name.clone())
                .collect(),
        };

        (inputs, changed)
    }

    /// Walk the whole tree for `state`, starting from precomputed root inputs
    pub(crate) fn propagate(&mut self, state: &S, root_inputs: InputSet, ctx: &mut PassContext) {
        self.propagate_node(self.root, state, None, Some(root_inputs), ctx);
    }

    fn propagate_node(
        &mut self,
        key: NodeKey,
        state: &S,
        parent: Option<&Output>,
        inputs: Option<InputSet>,
        ctx: &mut PassContext,
    ) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };

        let inputs = inputs.unwrap_or_else(|| node.view().derive_inputs(&Scope { state, parent }));

        let evaluation = match node.update(inputs) {
            Ok(evaluation) => evaluation,
            Err(error) => {
                tracing::warn!(node = %node.id(), %error, "render failed, keeping last committed output");
                ctx.faults.push(NodeFault {
                    node: node.id().clone(),
                    error,
                });
                self.retain_subtree(key, ctx);
                return;
            }
        };

        let id = node.id().clone();
        if evaluation.outcome.is_miss() {
            tracing::trace!(node = %id, outcome = ?evaluation.outcome, "recomputed");
            ctx.recomputed.push(id.clone());
        } else {
            ctx.reused += 1;
        }

        let output = evaluation.output;
        node.committed = Some(output.clone());
        ctx.frame.insert(
            id,
            CommittedNode {
                output: output.clone(),
                render_count: node.render_count(),
            },
        );

        let view = node.view().clone();
        for (slot, child) in view.children().iter().enumerate() {
            match child {
                ChildSlot::Single(child_view) => {
                    let child_key = self.ensure_single(key, slot, child_view, ctx);
                    self.propagate_node(child_key, state, Some(&output), None, ctx);
                }
                ChildSlot::Keyed(list) => {
                    let keys = list.keys(&Scope {
                        state,
                        parent: Some(&output),
                    });
                    for child_key in self.reconcile_keyed(key, slot, list, keys, ctx) {
                        self.propagate_node(child_key, state, Some(&output), None, ctx);
                    }
                }
            }
        }
    }

    /// Return the node of a single slot, creating it on first visit
    fn ensure_single(
        &mut self,
        parent: NodeKey,
        slot: usize,
        view: &View<S>,
        ctx: &mut PassContext,
    ) -> NodeKey {
        if let Some(ChildInstance::Single(Some(existing))) = self.nodes[parent].children.get(slot) {
            return *existing;
        }

        let parent_node = &self.nodes[parent];
        let occurrence = parent_node
            .view()
            .children()
            .iter()
            .take(slot)
            .filter(|sibling| matches!(sibling, ChildSlot::Single(v) if v.name() == view.name()))
            .count();
        let id = parent_node.id().nth_child(view.name(), occurrence);
        let child = self.insert(id.clone(), view.clone());
        if let Some(instance) = self.nodes[parent].children.get_mut(slot) {
            *instance = ChildInstance::Single(Some(child));
        }
        ctx.created.push(id);
        child
    }

    /// Diff a keyed slot against `keys` and return child nodes in new order
    fn reconcile_keyed(
        &mut self,
        parent: NodeKey,
        slot: usize,
        list: &KeyedChildren<S>,
        keys: Vec<Key>,
        ctx: &mut PassContext,
    ) -> Vec<NodeKey> {
        let parent_id = self.nodes[parent].id().clone();
        let mut old = match self.nodes[parent].children.get_mut(slot) {
            Some(ChildInstance::Keyed(map)) => std::mem::take(map),
            _ => IndexMap::new(),
        };

        let diff = diff_keys(&old, &keys);
        if !diff.duplicates.is_empty() {
            tracing::warn!(
                first = %parent_id.keyed(list.name(), &diff.duplicates[0]),
                duplicates = diff.duplicates.len(),
                "duplicate keys in keyed list, keeping first occurrence"
            );
        }
        if !diff.is_unchanged() {
            tracing::debug!(
                parent = %parent_id,
                list = %list.name(),
                added = diff.added.len(),
                removed = diff.removed.len(),
                moved = diff.moved.len(),
                "keyed list changed"
            );
        }

        let mut next = IndexMap::with_capacity(diff.order.len());
        for key in diff.order {
            let child = match old.swap_remove(&key) {
                Some(existing) => existing,
                None => {
                    let id = parent_id.keyed(list.name(), &key);
                    let child = self.insert(id.clone(), list.instantiate(&key));
                    ctx.created.push(id);
                    child
                }
            };
            next.insert(key, child);
        }

        for (_, stale) in old {
            self.remove_subtree(stale, ctx);
        }

        let order = next.values().copied().collect();
        if let Some(instance) = self.nodes[parent].children.get_mut(slot) {
            *instance = ChildInstance::Keyed(next);
        }
        order
    }

    fn insert(&mut self, id: NodeId, view: View<S>) -> NodeKey {
        let key = self.nodes.insert(ViewNode::new(id.clone(), view));
        self.index.insert(id, key);
        key
    }

    /// Drop a node, its descendants, and every memo cell among them
    fn remove_subtree(&mut self, key: NodeKey, ctx: &mut PassContext) {
        let Some(node) = self.nodes.remove(key) else {
            return;
        };
        for child in node.child_keys() {
            self.remove_subtree(child, ctx);
        }
        self.index.remove(node.id());
        ctx.removed.push(node.id().clone());
    }

    /// Put the last committed outputs of a faulted subtree into the frame
    fn retain_subtree(&self, key: NodeKey, ctx: &mut PassContext) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        if let Some(output) = node.committed() {
            ctx.frame.insert(
                node.id().clone(),
                CommittedNode {
                    output: output.clone(),
                    render_count: node.render_count(),
                },
            );
        }
        for child in node.child_keys() {
            self.retain_subtree(child, ctx);
        }
    }
}
