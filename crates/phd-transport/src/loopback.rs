use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::{Transport, TransportError, TransportEvent};

/// An in-memory, in-process transport pair. `LoopbackTransport::pair()`
/// returns two ends whose sent bytes arrive as `TransportEvent::Bytes` on
/// the other end — useful for driving an Agent `Context` and a Manager
/// `Context` against each other in a single test process, and for the CLI
/// demo binary.
pub struct LoopbackTransport {
    inbox: Arc<Mutex<VecDeque<Vec<u8>>>>,
    outbox: Arc<Mutex<VecDeque<Vec<u8>>>>,
    connected: bool,
}

impl LoopbackTransport {
    pub fn pair() -> (Self, Self) {
        let a_to_b = Arc::new(Mutex::new(VecDeque::new()));
        let b_to_a = Arc::new(Mutex::new(VecDeque::new()));

        let a = Self { inbox: b_to_a.clone(), outbox: a_to_b.clone(), connected: false };
        let b = Self { inbox: a_to_b, outbox: b_to_a, connected: false };
        (a, b)
    }
}

impl Transport for LoopbackTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.connected = true;
        Ok(())
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::SendFailed("not connected".to_string()));
        }
        self.outbox.lock().expect("loopback mutex poisoned").push_back(payload.to_vec());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        if self.connected {
            let mut inbox = self.inbox.lock().expect("loopback mutex poisoned");
            while let Some(payload) = inbox.pop_front() {
                events.push(TransportEvent::Bytes { payload, received_at: Instant::now() });
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_sent_on_one_end_arrive_on_the_other() {
        let (mut a, mut b) = LoopbackTransport::pair();
        a.connect().unwrap();
        b.connect().unwrap();

        a.send(&[1, 2, 3]).unwrap();
        let events = b.poll_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            TransportEvent::Bytes { payload, .. } => assert_eq!(payload, &vec![1, 2, 3]),
            _ => panic!("expected Bytes event"),
        }
    }

    #[test]
    fn send_before_connect_fails() {
        let (mut a, _b) = LoopbackTransport::pair();
        assert!(a.send(&[1]).is_err());
    }
}
