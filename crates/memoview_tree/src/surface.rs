//! Render surface
//!
//! The surface is the single consumer of committed outputs. The scheduler
//! hands it one [`CommitFrame`] per propagation pass, after every node in the
//! tree has been visited.

use indexmap::IndexMap;

use memoview_core::Output;

use crate::id::NodeId;

/// Output of one node as committed in a frame
#[derive(Clone, Debug, PartialEq)]
pub struct CommittedNode {
    pub output: Output,
    /// Total renders of this node up to and including this pass
    pub render_count: u64,
}

/// All node outputs of a single pass, in tree pre-order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommitFrame {
    /// Sequence number of the pass that produced this frame (1-based)
    pub pass: u64,
    pub nodes: IndexMap<NodeId, CommittedNode>,
}

impl CommitFrame {
    pub fn output(&self, id: &str) -> Option<&Output> {
        self.nodes.get(id).map(|node| &node.output)
    }

    pub fn render_count(&self, id: &str) -> Option<u64> {
        self.nodes.get(id).map(|node| node.render_count)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &CommittedNode)> {
        self.nodes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }
}

/// Consumer of committed frames
pub trait RenderSurface {
    /// Called exactly once per completed pass
    fn commit(&mut self, frame: &CommitFrame);
}

impl<F> RenderSurface for F
where
    F: FnMut(&CommitFrame),
{
    fn commit(&mut self, frame: &CommitFrame) {
        self(frame)
    }
}

/// Surface that keeps every frame it receives
#[derive(Debug, Default)]
pub struct RecordingSurface {
    frames: Vec<CommitFrame>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[CommitFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&CommitFrame> {
        self.frames.last()
    }

    pub fn commit_count(&self) -> usize {
        self.frames.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn commit(&mut self, frame: &CommitFrame) {
        tracing::trace!(pass = frame.pass, nodes = frame.len(), "frame recorded");
        self.frames.push(frame.clone());
    }
}
