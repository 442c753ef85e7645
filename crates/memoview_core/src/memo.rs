//! Single-entry memo cells
//!
//! A [`MemoCell`] remembers the last inputs it saw and the output computed
//! from them. Calling it again with inputs the policy deems equal returns the
//! stored output without running the computation.
//!
//! # Invariants
//!
//! 1. `compute` runs exactly once per miss and never on a hit.
//! 2. A failing comparator is a miss, never a hit.
//! 3. A failing `compute` leaves the cell untouched, so the last good output
//!    stays available.
//!
//! ```rust
//! use memoview_core::{InputSet, MemoCell};
//!
//! let mut cell = MemoCell::new();
//! let inputs = InputSet::new().with("count", 2);
//!
//! assert_eq!(cell.evaluate(inputs.clone(), || 4), 4);
//! // cached, the closure is not called
//! assert_eq!(cell.evaluate(inputs, || unreachable!()), 4);
//! ```

use std::convert::Infallible;

use crate::equality::EqualityPolicy;
use crate::input::InputSet;

/// Why a memo cell had to recompute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissReason {
    /// Nothing cached yet
    First,
    /// The policy reported different inputs
    Changed,
    /// The comparator failed; recompute rather than guess
    EqualityFault,
}

/// Result of a cache lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss(MissReason),
}

impl CacheOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::Hit)
    }

    pub fn is_miss(&self) -> bool {
        !self.is_hit()
    }
}

/// Output of a memo cell evaluation together with how it was obtained
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation<T> {
    pub output: T,
    pub outcome: CacheOutcome,
}

/// Hit/miss counters for a memo cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    pub equality_faults: u64,
}

/// A cache of one: last inputs and last output of a single computation
#[derive(Debug)]
pub struct MemoCell<T> {
    last_inputs: Option<InputSet>,
    last_output: Option<T>,
    policy: EqualityPolicy,
    stats: MemoStats,
}

impl<T: Clone> MemoCell<T> {
    /// Create an empty cell with the shallow policy
    pub fn new() -> Self {
        Self::with_policy(EqualityPolicy::shallow())
    }

    /// Create an empty cell with a custom equality policy
    pub fn with_policy(policy: EqualityPolicy) -> Self {
        Self {
            last_inputs: None,
            last_output: None,
            policy,
            stats: MemoStats::default(),
        }
    }

    /// Return the cached output for equal inputs, otherwise compute it
    pub fn evaluate<F>(&mut self, inputs: InputSet, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self.try_evaluate(inputs, || Ok::<T, Infallible>(compute())) {
            Ok(evaluation) => evaluation.output,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`evaluate`](Self::evaluate)
    ///
    /// When `compute` fails the previous inputs and output are kept.
    pub fn try_evaluate<E, F>(&mut self, inputs: InputSet, compute: F) -> Result<Evaluation<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let outcome = self.probe(&inputs);

        if outcome.is_hit() {
            if let Some(output) = &self.last_output {
                self.stats.hits += 1;
                tracing::trace!("memo hit");
                return Ok(Evaluation {
                    output: output.clone(),
                    outcome,
                });
            }
        }

        self.stats.misses += 1;
        if outcome == CacheOutcome::Miss(MissReason::EqualityFault) {
            self.stats.equality_faults += 1;
        }
        tracing::trace!(?outcome, "memo miss");

        let output = compute()?;
        self.last_inputs = Some(inputs);
        self.last_output = Some(output.clone());

        Ok(Evaluation { output, outcome })
    }

    /// Report what [`evaluate`](Self::evaluate) would do, without computing
    pub fn probe(&self, inputs: &InputSet) -> CacheOutcome {
        let (Some(last), Some(_)) = (&self.last_inputs, &self.last_output) else {
            return CacheOutcome::Miss(MissReason::First);
        };

        match self.policy.equal(last, inputs) {
            Ok(true) => CacheOutcome::Hit,
            Ok(false) => CacheOutcome::Miss(MissReason::Changed),
            Err(err) => {
                tracing::warn!(%err, "equality check failed, forcing recompute");
                CacheOutcome::Miss(MissReason::EqualityFault)
            }
        }
    }

    /// The last successfully computed output
    pub fn last_output(&self) -> Option<&T> {
        self.last_output.as_ref()
    }

    /// The inputs the last output was computed from
    pub fn last_inputs(&self) -> Option<&InputSet> {
        self.last_inputs.as_ref()
    }

    pub fn policy(&self) -> &EqualityPolicy {
        &self.policy
    }

    pub fn stats(&self) -> MemoStats {
        self.stats
    }

    /// Forget the cached entry; the next evaluation is a first miss
    pub fn reset(&mut self) {
        self.last_inputs = None;
        self.last_output = None;
    }
}

impl<T: Clone> Default for MemoCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
