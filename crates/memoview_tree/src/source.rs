//! Change notifications
//!
//! A [`ChangeSource`] is the handle external code uses to announce new
//! application state. Notifications are coalesced: only the latest state is
//! kept, together with the number of events it replaced, until the scheduler
//! drains it at the start of the next pass.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Mailbox<S> {
    latest: Option<S>,
    events: usize,
}

/// Cloneable handle for queueing state changes
pub struct ChangeSource<S> {
    mailbox: Arc<Mutex<Mailbox<S>>>,
}

impl<S> Clone for ChangeSource<S> {
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}

impl<S> Default for ChangeSource<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ChangeSource<S> {
    pub fn new() -> Self {
        Self {
            mailbox: Arc::new(Mutex::new(Mailbox {
                latest: None,
                events: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Mailbox<S>> {
        self.mailbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a new state, replacing any state not yet picked up
    pub fn notify(&self, state: S) {
        let mut mailbox = self.lock();
        mailbox.latest = Some(state);
        mailbox.events += 1;
        tracing::trace!(pending = mailbox.events, "change queued");
    }

    /// Queue `f` applied to the pending state, or to `current` if nothing is
    /// pending. Returns false when there is no state to apply `f` to.
    ///
    /// `f` runs with the mailbox locked and must not notify this source.
    pub fn update_or<F>(&self, current: Option<&S>, f: F) -> bool
    where
        F: FnOnce(&S) -> S,
    {
        let mut mailbox = self.lock();
        let next = match (&mailbox.latest, current) {
            (Some(pending), _) => f(pending),
            (None, Some(current)) => f(current),
            (None, None) => return false,
        };
        mailbox.latest = Some(next);
        mailbox.events += 1;
        true
    }

    pub fn has_pending(&self) -> bool {
        self.lock().latest.is_some()
    }

    /// Number of notifications waiting to be coalesced
    pub fn pending_events(&self) -> usize {
        self.lock().events
    }

    /// Take the latest state and the number of notifications it stands for
    pub fn take(&self) -> Option<(S, usize)> {
        let mut mailbox = self.lock();
        let events = std::mem::take(&mut mailbox.events);
        mailbox.latest.take().map(|state| (state, events))
    }
}

impl<S> fmt::Debug for ChangeSource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mailbox = self.lock();
        f.debug_struct("ChangeSource")
            .field("pending", &mailbox.latest.is_some())
            .field("events", &mailbox.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coalesces_to_latest() {
        let source = ChangeSource::new();
        assert!(source.take().is_none());

        source.notify(1);
        source.notify(2);
        source.notify(3);
        assert!(source.has_pending());
        assert_eq!(source.pending_events(), 3);

        assert_eq!(source.take(), Some((3, 3)));
        assert!(!source.has_pending());
        assert!(source.take().is_none());
    }

    #[test]
    fn test_update_or_prefers_pending() {
        let source = ChangeSource::new();
        assert!(!source.update_or(None, |n: &i32| n + 1));

        assert!(source.update_or(Some(&10), |n| n + 1));
        assert!(source.update_or(Some(&10), |n| n + 1));
        assert_eq!(source.take(), Some((12, 2)));
    }

    #[test]
    fn test_clones_share_mailbox() {
        let source = ChangeSource::new();
        let handle = source.clone();

        std::thread::spawn(move || handle.notify("from thread"))
            .join()
            .unwrap();

        assert_eq!(source.take(), Some(("from thread", 1)));
    }
}
