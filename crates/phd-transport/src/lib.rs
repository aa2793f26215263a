//! Transport abstraction for the PHD communication engine
//!
//! The engine core never picks a transport; it consumes whatever implements
//! `Transport` and reacts to the `TransportEvent`s it reports. Two
//! implementations are provided: `LoopbackTransport` (tests, CLI demo of
//! both roles in one process) and `TcpTransport` (a real length-prefixed
//! TCP framing, for the CLI binary).

pub mod loopback;
pub mod tcp;

use std::time::Instant;

/// Transport-related errors.
#[derive(Debug, Clone)]
pub enum TransportError {
    ConnectionFailed(String),
    SendFailed(String),
    ReceiveFailed(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::ConnectionFailed(msg) => write!(f, "connection failed: {}", msg),
            TransportError::SendFailed(msg) => write!(f, "send failed: {}", msg),
            TransportError::ReceiveFailed(msg) => write!(f, "receive failed: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// A transport-level occurrence the engine's pump turns into an `Event`.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Bytes { payload: Vec<u8>, received_at: Instant },
}

/// Transport abstraction for Context-to-peer communication.
///
/// Implementations should be non-blocking in `poll_events`; a blocking
/// implementation must run on its own thread and hand events over via a
/// channel (see `TcpTransport`).
pub trait Transport: Send {
    fn connect(&mut self) -> Result<(), TransportError>;
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;
    /// Drain pending events (non-blocking).
    fn poll_events(&mut self) -> Vec<TransportEvent>;
}
