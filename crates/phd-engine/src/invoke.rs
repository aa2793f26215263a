use std::collections::HashMap;
use std::time::Duration;

use phd_apdu::{ErrorValue, Rorj, RorsChoice, RoivChoice};
use phd_core::timers::{Deadline, TimerId};

/// How an outstanding confirmed request was resolved. Built by the action
/// that observes the matching RORS/ROER/RORJ (or a timeout) and handed to
/// `Context::notify_request_complete`, which is the only thing that runs
/// application-visible completion logic — the tracker itself just tracks.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    Success(RorsChoice),
    Error(ErrorValue),
    Reject(Rorj),
    TimedOut,
    Aborted,
}

/// An outstanding confirmed request. `roiv_choice` lets an action recover
/// the original operation/object-handle when a late ROER or RORJ carries no
/// argument of its own, mirroring the back-reference kept by
/// `communication_agent_process_rors` in the reference implementation.
pub struct Request {
    pub invoke_id: u16,
    pub roiv_choice: RoivChoice,
    pub deadline: Deadline,
}

/// Assigns and tracks outbound confirmed-request invoke identifiers.
///
/// No two open requests share an invoke id. A request is retired exactly
/// once — by the action that classifies its matching response, or by the
/// pump when its guard timer fires, or in bulk on a forced abort/disconnect.
#[derive(Default)]
pub struct InvokeTracker {
    next_invoke_id: u16,
    open: HashMap<u16, Request>,
}

impl InvokeTracker {
    pub fn new() -> Self {
        Self { next_invoke_id: 0, open: HashMap::new() }
    }

    /// Allocates a fresh invoke id and records the request. Per the
    /// monotonic-allocation invariant, wrap is permitted only once every
    /// prior id has been retired; in practice this just means the search
    /// for a free slot never has to loop more than once around `u16`.
    pub fn send_request(&mut self, roiv_choice: RoivChoice, deadline: Deadline) -> u16 {
        let mut id = self.next_invoke_id;
        while self.open.contains_key(&id) {
            id = id.wrapping_add(1);
        }
        self.next_invoke_id = id.wrapping_add(1);

        self.open.insert(id, Request { invoke_id: id, roiv_choice, deadline });
        id
    }

    pub fn check_known(&self, invoke_id: u16) -> Option<&Request> {
        self.open.get(&invoke_id)
    }

    pub fn timer_id_for(&self, invoke_id: u16) -> Option<TimerId> {
        self.open.get(&invoke_id).map(|r| r.deadline.id)
    }

    /// Removes the matching open request. Returns it so the caller can
    /// inspect `roiv_choice` one last time before building a
    /// `RequestOutcome`. Returns `None` if `invoke_id` was not outstanding
    /// (the caller should drop the response silently in that case, not
    /// raise an FSM event — `dispatch::classify` already enforces this by
    /// never emitting an event for an unmatched invoke id).
    pub fn retire(&mut self, invoke_id: u16) -> Option<Request> {
        self.open.remove(&invoke_id)
    }

    /// Retires the request armed under `timer_id`, if any is still open (a
    /// timer firing after its request already retired is stale and the
    /// pump must not reach this method for it).
    pub fn retire_by_timer(&mut self, timer_id: TimerId) -> Option<Request> {
        let invoke_id = self.open.iter().find(|(_, r)| r.deadline.id == timer_id).map(|(id, _)| *id)?;
        self.retire(invoke_id)
    }

    /// Retires every open request, e.g. on transport disconnect or a forced
    /// association abort.
    pub fn drain_all(&mut self) -> Vec<Request> {
        let ids: Vec<u16> = self.open.keys().copied().collect();
        ids.into_iter().filter_map(|id| self.retire(id)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phd_core::timers::{Deadline, TimerId};

    fn dummy_deadline(id: u64) -> Deadline {
        Deadline::from_now(TimerId(id), 0, Duration::from_secs(3))
    }

    #[test]
    fn retire_returns_the_request_exactly_once() {
        let mut tracker = InvokeTracker::new();
        let id = tracker.send_request(RoivChoice::Get { obj_handle: 0 }, dummy_deadline(1));

        assert!(tracker.retire(id).is_some());
        assert!(tracker.retire(id).is_none());
    }

    #[test]
    fn unknown_invoke_id_is_not_retired() {
        let mut tracker = InvokeTracker::new();
        assert!(tracker.retire(999).is_none());
    }

    #[test]
    fn ids_do_not_collide_while_open() {
        let mut tracker = InvokeTracker::new();
        let a = tracker.send_request(RoivChoice::Get { obj_handle: 0 }, dummy_deadline(1));
        let b = tracker.send_request(RoivChoice::Get { obj_handle: 1 }, dummy_deadline(2));
        assert_ne!(a, b);
        assert_eq!(tracker.open_count(), 2);
    }

    #[test]
    fn drain_all_retires_every_open_request() {
        let mut tracker = InvokeTracker::new();
        for i in 0..3u64 {
            tracker.send_request(RoivChoice::Get { obj_handle: 0 }, dummy_deadline(i));
        }
        assert_eq!(tracker.open_count(), 3);
        assert_eq!(tracker.drain_all().len(), 3);
        assert!(tracker.is_empty());
    }
}
