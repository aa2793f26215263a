use std::collections::VecDeque;

use crate::event::{Event, EventData};

/// A single connection's serialized stimulus queue. Every external
/// occurrence — a transport indication, an application request, a decoded
/// inbound APDU event — is pushed here rather than processed in place, so
/// that an action triggered deep inside one `process()` call can queue a
/// further event without re-entering the FSM synchronously.
#[derive(Default)]
pub struct EventPump {
    queue: VecDeque<(Event, EventData)>,
}

impl EventPump {
    pub fn new() -> Self {
        Self { queue: VecDeque::new() }
    }

    /// Enqueues an event behind whatever is already pending.
    pub fn push_back(&mut self, event: Event, data: EventData) {
        self.queue.push_back((event, data));
    }

    /// Enqueues an event ahead of whatever is already pending. Used
    /// sparingly, for events that must be observed before anything queued
    /// by an action that is still running (e.g. a forced abort).
    pub fn push_prio(&mut self, event: Event, data: EventData) {
        self.queue.push_front((event, data));
    }

    pub fn pop_front(&mut self) -> Option<(Event, EventData)> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut pump = EventPump::new();
        pump.push_back(Event::ReqAssoc, EventData::None);
        pump.push_back(Event::ReqAssocRelease, EventData::None);
        assert_eq!(pump.pop_front().unwrap().0, Event::ReqAssoc);
        assert_eq!(pump.pop_front().unwrap().0, Event::ReqAssocRelease);
        assert!(pump.pop_front().is_none());
    }

    #[test]
    fn priority_push_jumps_the_queue() {
        let mut pump = EventPump::new();
        pump.push_back(Event::ReqAssoc, EventData::None);
        pump.push_prio(Event::ReqAssocAbort, EventData::None);
        assert_eq!(pump.pop_front().unwrap().0, Event::ReqAssocAbort);
        assert_eq!(pump.pop_front().unwrap().0, Event::ReqAssoc);
    }
}
