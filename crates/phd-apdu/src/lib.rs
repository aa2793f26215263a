//! Concrete APDU data model for IEEE 11073-20601 association, configuring,
//! operating, and disassociating exchanges, plus a worked codec.
//!
//! The bit-level ASN.1/MDER encoding is out of scope for this engine (see
//! `phd-engine`'s DESIGN.md entry); this crate supplies concrete, testable
//! Rust types the engine's dispatcher and actions can build and inspect, and
//! one real wire codec (`BitcodeCodec`) so the engine can be exercised
//! end-to-end without a full MDER implementation.

pub mod apdu;
pub mod codec;
pub mod consts;

pub use apdu::*;
pub use codec::{ApduCodecError, BitcodeCodec, Codec};
