//! Error types for memoview_tree

use memoview_core::RenderError;
use thiserror::Error;

use crate::id::NodeId;

/// A render function failed during a pass
///
/// The node's subtree was skipped and its last committed outputs were kept.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("node `{node}` failed to render: {error}")]
pub struct NodeFault {
    pub node: NodeId,
    #[source]
    pub error: RenderError,
}

/// Scheduler-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// Change events kept arriving while flushing
    #[error("change events still pending after {limit} passes")]
    PassLimitExceeded { limit: usize },
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
