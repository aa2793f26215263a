//! Wire constants from IEEE 11073-20601.

/// `ASSOC_VERSION1` — the only association protocol version this engine speaks.
pub const ASSOC_VERSION1: u32 = 0x8000_0000;

/// `NOM_VERSION1` — nomenclature version 1.
pub const NOM_VERSION1: u32 = 0x8000_0000;

/// Encoding rules identifier for MDER (Medical Device Encoding Rules).
pub const MDER: u16 = 0x8000;

/// The only data protocol id this engine accepts in an AARQ/AARE.
pub const DATA_PROTO_ID_20601: u16 = 20601;

/// Total AARQ `PhdAssociationInformation` length as fixed by the standard.
pub const AARQ_LENGTH: u16 = 50;
/// Total AARE `PhdAssociationInformation` length as fixed by the standard.
pub const AARE_LENGTH: u16 = 44;
/// Length of the nested `data-proto-info` field within either.
pub const DATA_PROTO_INFO_LENGTH: u16 = 38;

/// Flag bit set by an agent that supports agent-initiated association.
pub const DATA_REQ_SUPP_INIT_AGENT: u16 = 0x0001;

/// System-type discriminant values carried in `PhdAssociationInformation`.
pub const SYS_TYPE_AGENT: u32 = 0;
pub const SYS_TYPE_MANAGER: u32 = 1;

/// Reserved object handle denoting the MDS itself.
pub const MDS_HANDLE: u16 = 0;

/// `MDC_NOTI_CONFIG` nomenclature code for a configuration event report.
pub const MDC_NOTI_CONFIG: u16 = 0x0D1C;
