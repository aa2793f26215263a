use std::time::{Duration, Instant};

/// Opaque handle for a single armed timer. Returned by whatever arms the
/// timer (the invoke tracker, or a bare association/release timeout) and
/// used to recognize a stale firing after the timer has been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// A deadline paired with the generation it was armed under. The pump
/// compares `generation` against the context's current generation before
/// acting on a fired timer, so a timer cancelled by a state transition
/// (e.g. disconnect) that still fires later is silently ignored rather than
/// forcing a spurious transition.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    pub id: TimerId,
    pub generation: u64,
    pub at: Instant,
}

impl Deadline {
    pub fn from_now(id: TimerId, generation: u64, timeout: Duration) -> Self {
        Self { id, generation, at: Instant::now() + timeout }
    }

    pub fn has_elapsed(&self) -> bool {
        Instant::now() >= self.at
    }
}
