/// Errors raised by the engine that are not specific to a single invoke.
///
/// Per-invoke failures (ROER/RORJ results) are delivered to the originating
/// request's completion callback instead; see `phd-engine::invoke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Inbound bytes failed to decode into an APDU.
    Decode { reason: String },
    /// An inbound APDU has no table row for the current (role, state).
    NotProcessed { state: &'static str },
    /// The transport reported a failure that forces a disconnect.
    TransportFailure { reason: String },
    /// A confirmed request's invoke id did not match any outstanding request.
    UnknownInvoke { invoke_id: u16 },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Decode { reason } => write!(f, "apdu decode failed: {}", reason),
            EngineError::NotProcessed { state } => write!(f, "no transition defined in state {}", state),
            EngineError::TransportFailure { reason } => write!(f, "transport failure: {}", reason),
            EngineError::UnknownInvoke { invoke_id } => write!(f, "unknown invoke id {}", invoke_id),
        }
    }
}

impl std::error::Error for EngineError {}
