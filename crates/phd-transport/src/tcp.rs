use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use crate::{Transport, TransportError, TransportEvent};

/// Configuration for creating a TCP transport.
#[derive(Debug, Clone)]
pub struct TcpTransportConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
}

impl TcpTransportConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, connect_timeout: Duration::from_secs(5) }
    }
}

/// Length-prefixed (4-byte big-endian) TCP framing, connecting to a fixed
/// peer address. Reconnects once on a stale connection before giving up.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    config: TcpTransportConfig,
}

impl TcpTransport {
    pub fn new(config: TcpTransportConfig) -> Self {
        Self { stream: None, config }
    }

    fn ensure_stream_exists(&mut self) -> Result<(), TransportError> {
        if self.stream.is_none() {
            self.connect()?;
        }
        Ok(())
    }

    fn try_send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if let Some(ref mut stream) = self.stream {
            let len = payload.len() as u32;
            stream.write_all(&len.to_be_bytes()).map_err(|e| TransportError::SendFailed(format!("failed to send length: {}", e)))?;
            stream.write_all(payload).map_err(|e| TransportError::SendFailed(format!("failed to send payload: {}", e)))?;
            stream.flush().map_err(|e| TransportError::SendFailed(format!("failed to flush: {}", e)))?;
            Ok(())
        } else {
            Err(TransportError::SendFailed("no active connection".to_string()))
        }
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        tracing::debug!("TcpTransport connecting to {}:{}", self.config.host, self.config.port);
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let sockaddr = addr.parse().map_err(|e| TransportError::ConnectionFailed(format!("invalid address: {}", e)))?;

        match TcpStream::connect_timeout(&sockaddr, self.config.connect_timeout) {
            Ok(stream) => {
                stream.set_nonblocking(true).map_err(|e| TransportError::ConnectionFailed(format!("failed to set non-blocking: {}", e)))?;
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => Err(TransportError::ConnectionFailed(format!("tcp connect failed: {}", e))),
        }
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.ensure_stream_exists()?;
        match self.try_send(payload) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::trace!("send failed, attempting reconnect: {}", e);
                self.connect()?;
                self.try_send(payload)
            }
        }
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();

        if let Some(ref mut stream) = self.stream {
            loop {
                let mut len_bytes = [0u8; 4];
                match stream.read_exact(&mut len_bytes) {
                    Ok(()) => {
                        let payload_len = u32::from_be_bytes(len_bytes) as usize;
                        if payload_len > 1024 * 1024 {
                            tracing::warn!("message too large: {} bytes", payload_len);
                            break;
                        }

                        let mut payload = vec![0u8; payload_len];
                        match stream.read_exact(&mut payload) {
                            Ok(()) => events.push(TransportEvent::Bytes { payload, received_at: Instant::now() }),
                            Err(_) => {
                                events.push(TransportEvent::Disconnected);
                                break;
                            }
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                    Err(_) => {
                        events.push(TransportEvent::Disconnected);
                        break;
                    }
                }
            }
        }

        events
    }
}
