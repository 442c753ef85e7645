//! Update scheduler
//!
//! The scheduler owns the view tree and drives propagation passes:
//!
//! ```text
//! Idle -> Collecting -> Propagating -> Committed -> Idle
//! ```
//!
//! Changes are queued through a [`ChangeSource`] and coalesced: a pass always
//! runs against the newest queued state, however many notifications arrived
//! since the previous pass. Each pass ends with exactly one
//! [`RenderSurface::commit`].

use std::sync::Arc;

use crate::error::{NodeFault, Result, SchedulerError};
use crate::id::NodeId;
use crate::source::ChangeSource;
use crate::surface::{CommitFrame, RenderSurface};
use crate::tree::{PassContext, TreeStats, ViewTree};
use crate::view::View;

/// Scheduler phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Collecting,
    Propagating,
    Committed,
}

impl Phase {
    /// Whether `next` may directly follow `self`
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Idle, Phase::Collecting)
                | (Phase::Collecting, Phase::Propagating)
                | (Phase::Propagating, Phase::Committed)
                | (Phase::Committed, Phase::Idle)
        )
    }
}

/// Scheduler configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Name attached to pass spans and log lines
    pub label: String,
    /// Upper bound on passes run by a single [`Scheduler::flush`]
    pub max_passes_per_flush: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            label: "memoview".to_string(),
            max_passes_per_flush: 16,
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn max_passes_per_flush(mut self, max: usize) -> Self {
        self.max_passes_per_flush = max.max(1);
        self
    }
}

/// What happened during one pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassReport {
    /// Sequence number of the pass (1-based)
    pub pass: u64,
    /// Notifications merged into this pass
    pub coalesced_events: usize,
    /// Root inputs that differ from the previous pass
    pub changed_inputs: Vec<Arc<str>>,
    /// Phases visited, starting and ending at `Idle`
    pub phases: Vec<Phase>,
    /// Nodes whose render function ran, in visit order
    pub recomputed: Vec<NodeId>,
    /// Number of nodes served from their memo cell
    pub reused: usize,
    pub created: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub faults: Vec<NodeFault>,
}

impl PassReport {
    /// True when no node failed to render
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn was_recomputed(&self, id: &str) -> bool {
        self.recomputed.iter().any(|node| node == id)
    }

    pub fn fault_for(&self, id: &str) -> Option<&NodeFault> {
        self.faults.iter().find(|fault| fault.node == id)
    }
}

/// Scheduler-wide counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub passes: u64,
    /// Notifications received across all passes
    pub events: usize,
    pub faults: usize,
    pub tree: TreeStats,
}

/// Drives propagation passes over a view tree
pub struct Scheduler<S, R> {
    config: SchedulerConfig,
    tree: ViewTree<S>,
    surface: R,
    source: ChangeSource<S>,
    phase: Phase,
    /// State of the last completed pass
    state: Option<S>,
    passes: u64,
    events: usize,
    faults: usize,
}

impl<S: 'static, R: RenderSurface> Scheduler<S, R> {
    /// Create a scheduler with `initial` queued for the first pass
    pub fn new(root: View<S>, initial: S, surface: R) -> Self {
        Self::with_config(root, initial, surface, SchedulerConfig::default())
    }

    pub fn with_config(root: View<S>, initial: S, surface: R, config: SchedulerConfig) -> Self {
        let source = ChangeSource::new();
        source.notify(initial);
        Self {
            config,
            tree: ViewTree::new(root),
            surface,
            source,
            phase: Phase::Idle,
            state: None,
            passes: 0,
            events: 0,
            faults: 0,
        }
    }

    /// Handle for queueing changes from elsewhere (other threads included)
    pub fn change_source(&self) -> ChangeSource<S> {
        self.source.clone()
    }

    /// Queue a new state for the next pass
    pub fn notify(&self, state: S) {
        self.source.notify(state);
    }

    /// Queue `f` applied to the newest known state, pending or committed
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&S) -> S,
    {
        if !self.source.update_or(self.state.as_ref(), f) {
            tracing::warn!(label = %self.config.label, "update with no known state ignored");
        }
    }

    /// Run the initial pass
    ///
    /// Returns `None` if the tree is already mounted and nothing is pending.
    pub fn mount(&mut self) -> Option<PassReport> {
        let report = self.run_pending()?;
        if report.pass == 1 {
            tracing::debug!(
                label = %self.config.label,
                nodes = self.tree.len(),
                "tree mounted"
            );
        }
        Some(report)
    }

    /// Run one pass if any change is pending
    pub fn run_pending(&mut self) -> Option<PassReport> {
        let (state, events) = self.source.take()?;

        self.passes += 1;
        self.events += events;
        let pass = self.passes;

        let span = tracing::debug_span!("pass", label = %self.config.label, pass);
        let _enter = span.enter();

        let mut phases = vec![self.phase];

        self.transition(Phase::Collecting, &mut phases);
        let (inputs, changed_inputs) = self.tree.collect(&state);
        if events > 1 {
            tracing::trace!(events, "coalesced notifications");
        }

        self.transition(Phase::Propagating, &mut phases);
        let mut ctx = PassContext::default();
        self.tree.propagate(&state, inputs, &mut ctx);

        self.transition(Phase::Committed, &mut phases);
        let PassContext {
            frame,
            recomputed,
            reused,
            created,
            removed,
            faults,
        } = ctx;
        self.surface.commit(&CommitFrame { pass, nodes: frame });

        self.transition(Phase::Idle, &mut phases);
        self.state = Some(state);
        self.faults += faults.len();

        tracing::debug!(
            events,
            recomputed = recomputed.len(),
            reused,
            created = created.len(),
            removed = removed.len(),
            faults = faults.len(),
            "pass committed"
        );

        Some(PassReport {
            pass,
            coalesced_events: events,
            changed_inputs,
            phases,
            recomputed,
            reused,
            created,
            removed,
            faults,
        })
    }

    /// Run passes until no change is pending
    ///
    /// Fails once `max_passes_per_flush` passes ran and changes keep coming,
    /// e.g. a surface that notifies on every commit.
    pub fn flush(&mut self) -> Result<Vec<PassReport>> {
        let limit = self.config.max_passes_per_flush;
        let mut reports = Vec::new();

        while self.source.has_pending() {
            if reports.len() >= limit {
                tracing::warn!(label = %self.config.label, limit, "flush pass limit reached");
                return Err(SchedulerError::PassLimitExceeded { limit });
            }
            if let Some(report) = self.run_pending() {
                reports.push(report);
            }
        }

        Ok(reports)
    }

    fn transition(&mut self, next: Phase, phases: &mut Vec<Phase>) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase transition {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::trace!(from = ?self.phase, to = ?next, "phase");
        self.phase = next;
        phases.push(next);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// State used by the last completed pass
    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub fn tree(&self) -> &ViewTree<S> {
        &self.tree
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Number of completed passes
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            passes: self.passes,
            events: self.events,
            faults: self.faults,
            tree: self.tree.stats(),
        }
    }
}
