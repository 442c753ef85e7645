//! memoview Tree
//!
//! The view graph on top of [`memoview_core`]:
//!
//! - **Views**: immutable descriptions of a node (inputs, render, children)
//! - **View Nodes**: live instances, each with its own memo cell
//! - **Keyed Diffing**: children matched by key, never by position
//! - **Scheduler**: coalesced change events, one commit per pass
//! - **Composition**: wrapping, toggling, and render delegation
//!
//! # Example
//!
//! ```rust
//! use memoview_core::{InputSet, Value};
//! use memoview_tree::{RecordingSurface, Scheduler, Scope, View};
//!
//! struct Counter {
//!     count: i64,
//! }
//!
//! let root = View::new("counter", |inputs| {
//!     Ok(Value::text(inputs.int("count")?.to_string()))
//! })
//! .with_inputs(|scope: &Scope<'_, Counter>| InputSet::new().with("count", scope.state.count));
//!
//! let mut scheduler = Scheduler::new(root, Counter { count: 0 }, RecordingSurface::new());
//! scheduler.mount();
//!
//! scheduler.notify(Counter { count: 1 });
//! scheduler.notify(Counter { count: 2 });
//! let report = scheduler.run_pending().unwrap();
//!
//! assert_eq!(report.coalesced_events, 2);
//! let frame = scheduler.surface().last().unwrap();
//! assert_eq!(frame.output("counter"), Some(&Value::text("2")));
//! ```

pub mod compose;
pub mod diff;
pub mod error;
pub mod id;
pub mod node;
pub mod scheduler;
pub mod source;
pub mod surface;
pub mod tree;
pub mod view;

pub use compose::{render_delegate, with_toggle, wrap};
pub use diff::{diff_keys, KeyedDiff};
pub use error::{NodeFault, SchedulerError};
pub use id::{Key, NodeId};
pub use node::{NodeKey, ViewNode};
pub use scheduler::{PassReport, Phase, Scheduler, SchedulerConfig, SchedulerStats};
pub use source::ChangeSource;
pub use surface::{CommitFrame, CommittedNode, RecordingSurface, RenderSurface};
pub use tree::{TreeStats, ViewTree};
pub use view::{ChildSlot, KeyedChildren, Scope, View};
