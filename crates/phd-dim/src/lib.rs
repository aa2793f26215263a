//! Domain Information Model (DIM) interface
//!
//! The DIM (MDS, PM-Store, scanners) is an external collaborator: the
//! engine reaches it through the narrow `Mds` trait to fetch attributes for
//! a `Get`, flip a scanner's operational state on a `Set`, or store an
//! incoming `SegmentDataEvent`. Nomenclature-level attribute encoding is out
//! of scope; this crate models object identity and the handful of
//! attributes the engine's actions actually touch, plus one in-memory
//! implementation sufficient to exercise the engine end to end.

pub mod mds;
pub mod memory;

pub use mds::{DimError, Mds, ObjectKind, PmStoreRecord, Scanner};
pub use memory::MemoryMds;
