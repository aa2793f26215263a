use bitcode::{Decode, Encode};

use crate::consts::*;

/// `PhdAssociationInformation` — the configuration payload carried by both
/// AARQ and AARE. Agent and manager populate different subsets of fields;
/// see `phd-engine::actions::association`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct PhdAssociationInformation {
    pub protocol_version: u32,
    pub encoding_rules: u16,
    pub nomenclature_version: u32,
    pub functional_units: u32,
    pub system_type: u32,
    pub system_id: Vec<u8>,
    pub dev_config_id: u16,
    pub data_req_mode_flags: u16,
    pub data_req_init_agent_count: u8,
    pub data_req_init_manager_count: u8,
}

impl PhdAssociationInformation {
    /// An all-zero information block, matching `memset(0)` in the original
    /// before individual fields are populated.
    pub fn zeroed() -> Self {
        Self {
            protocol_version: 0,
            encoding_rules: 0,
            nomenclature_version: 0,
            functional_units: 0,
            system_type: 0,
            system_id: Vec::new(),
            dev_config_id: 0,
            data_req_mode_flags: 0,
            data_req_init_agent_count: 0,
            data_req_init_manager_count: 0,
        }
    }
}

/// AARQ — association request. `data_proto_id` is always `DATA_PROTO_ID_20601`
/// for a conformant peer; the dispatcher is responsible for rejecting anything
/// else before this point, but the raw value is retained for logging.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AssociationRequest {
    pub assoc_version: u32,
    pub data_proto_id: u16,
    pub config: PhdAssociationInformation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum AssociationResult {
    Accepted,
    AcceptedUnknownConfig,
    RejectedPermanent,
    RejectedTransient,
    RejectedUnknownConfig,
}

/// AARE — association response.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AssociationResponse {
    pub assoc_version: u32,
    pub result: AssociationResult,
    pub data_proto_id: u16,
    pub config: PhdAssociationInformation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum ReleaseRequestReason {
    Normal,
    NoMoreConfigurations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct ReleaseRequest {
    pub reason: ReleaseRequestReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum ReleaseResponseReason {
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct ReleaseResponse {
    pub reason: ReleaseResponseReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum AbortReason {
    UndefinedReason,
    InvalidPdu,
    InvalidParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Abort {
    pub reason: AbortReason,
}

/// A configured object within a `ConfigReport`. Attribute encoding is a
/// DIM/nomenclature concern and is out of scope here; attributes are
/// forwarded as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ConfigObject {
    pub obj_class: u16,
    pub obj_handle: u16,
    pub attributes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct ConfigObjectList {
    pub objects: Vec<ConfigObject>,
}

/// ConfigReport — sent by the agent as a confirmed event report when the
/// manager does not recognize the agent's `dev_config_id`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ConfigReport {
    pub config_report_id: u16,
    pub config_object_list: ConfigObjectList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum ConfigResult {
    AcceptedConfig,
    UnsupportedConfig,
}

/// ConfigReportRsp — the manager's response to a `ConfigReport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct ConfigReportRsp {
    pub config_report_id: u16,
    pub config_result: ConfigResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum EventType {
    NotiConfig,
    NotiScanReportFixed,
    NotiScanReportVar,
    NotiScanReportGrouped,
    NotiSegmentData,
    Other(u16),
}

/// Payload of an `EventReportArgumentSimple`. Scan reports carry opaque
/// nomenclature-encoded bytes (DIM's concern); configuration and segment
/// events are modeled concretely since the engine's actions build and
/// inspect them directly.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum EventInfo {
    Config(ConfigReport),
    ScanReport(Vec<u8>),
    SegmentData(SegmentDataEvent),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct EventReportArgumentSimple {
    pub obj_handle: u16,
    pub event_time: u32,
    pub event_type: EventType,
    pub event_info: EventInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum SegmentDataStatus {
    ManagerConfirm,
    ManagerAbort,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SegmentDataEvent {
    pub segment_instance: u16,
    pub segment_data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct SegmentDataResult {
    pub segment_instance: u16,
    pub status: SegmentDataStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum EventReplyInfo {
    Empty,
    SegmentDataResult(SegmentDataResult),
    /// The manager's accept/reject verdict on an agent's `ConfirmedEventReport`
    /// carrying a `ConfigReport`, per the configuring sub-protocol.
    ConfigReportRsp(ConfigReportRsp),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct EventReportResultSimple {
    pub obj_handle: u16,
    pub event_type: EventType,
    pub event_reply_info: EventReplyInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SegmentInfo {
    pub segment_instance: u16,
    pub info: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct SegmentInfoList {
    pub segments: Vec<SegmentInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum TrigSegmDataXferStatus {
    Success,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct TrigSegmDataXferRsp {
    pub segment_instance: u16,
    pub status: TrigSegmDataXferStatus,
}

/// A `SetTimeInvoke` action argument: absolute time, seconds since the
/// epoch, as transmitted to the agent's MDS clock attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct SetTimeInvoke {
    pub date_time_epoch_secs: u64,
}

/// Operational state of a scanner object, as carried in a `Set` or
/// `ConfirmedSet` on a scanner's `operational-state` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum OperationalState {
    Disabled,
    Enabled,
    NotAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct ScannerOperationalStateSet {
    pub obj_handle: u16,
    pub state: OperationalState,
}

/// Invoke argument carried by a (Confirmed)Action ROIV.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ActionArgument {
    SetTime(SetTimeInvoke),
    SegmentClear { obj_handle: u16, segment_instance: u16 },
    SegmentGetInfo { obj_handle: u16 },
    SegmentTrigXfer { obj_handle: u16, segment_instance: u16 },
    Other(Vec<u8>),
}

/// Result carried by a (Confirmed)Action RORS.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ActionResult {
    SetTimeOk,
    SegmentInfoList(SegmentInfoList),
    TrigSegmDataXferRsp(TrigSegmDataXferRsp),
    Other(Vec<u8>),
}

/// The CMIP operation carried in a ROIV.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum RoivChoice {
    Get { obj_handle: u16 },
    Set(ScannerOperationalStateSet),
    ConfirmedSet(ScannerOperationalStateSet),
    EventReport(EventReportArgumentSimple),
    ConfirmedEventReport(EventReportArgumentSimple),
    Action { obj_handle: u16, argument: ActionArgument },
    ConfirmedAction { obj_handle: u16, argument: ActionArgument },
}

/// The CMIP operation carried in a RORS.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum RorsChoice {
    Get { obj_handle: u16, attributes: Vec<u8> },
    ConfirmedSet { obj_handle: u16 },
    ConfirmedEventReport(EventReportResultSimple),
    ConfirmedAction { obj_handle: u16, result: ActionResult },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum ErrorValue {
    NoSuchObjectInstance,
    NoSuchAction,
    NoSuchAttribute,
    InvalidObjectInstance,
    InvalidArgumentValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Roer {
    pub error_value: ErrorValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum RejectProblem {
    UnrecognizedApdu,
    UnsupportedInvokeId,
    MistypedArgument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Rorj {
    pub problem: RejectProblem,
}

/// The DATA-apdu: an invoke id paired with one of ROIV/RORS/ROER/RORJ.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum DataApdu {
    Roiv { invoke_id: u16, choice: RoivChoice },
    Rors { invoke_id: u16, choice: RorsChoice },
    Roer { invoke_id: u16, choice: Roer },
    Rorj { invoke_id: u16, choice: Rorj },
}

impl DataApdu {
    pub fn invoke_id(&self) -> u16 {
        match self {
            DataApdu::Roiv { invoke_id, .. } => *invoke_id,
            DataApdu::Rors { invoke_id, .. } => *invoke_id,
            DataApdu::Roer { invoke_id, .. } => *invoke_id,
            DataApdu::Rorj { invoke_id, .. } => *invoke_id,
        }
    }
}

/// PRST — presentation APDU, carrying exactly one DATA-apdu.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Presentation {
    pub data: DataApdu,
}

/// The full APDU union transported at the association layer.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Apdu {
    Aarq(AssociationRequest),
    Aare(AssociationResponse),
    Rlrq(ReleaseRequest),
    Rlre(ReleaseResponse),
    Abrt(Abort),
    Prst(Presentation),
}

impl Apdu {
    pub fn kind(&self) -> &'static str {
        match self {
            Apdu::Aarq(_) => "AARQ",
            Apdu::Aare(_) => "AARE",
            Apdu::Rlrq(_) => "RLRQ",
            Apdu::Rlre(_) => "RLRE",
            Apdu::Abrt(_) => "ABRT",
            Apdu::Prst(_) => "PRST",
        }
    }
}

/// Builds a default-populated AARQ/AARE `PhdAssociationInformation` matching
/// the field values the standard fixes (protocol version, encoding rules,
/// nomenclature version, zero functional units), leaving role-specific
/// fields (`system_type`, `system_id`, `dev_config_id`, data-req-mode) to
/// the caller.
pub fn default_association_information() -> PhdAssociationInformation {
    let mut info = PhdAssociationInformation::zeroed();
    info.protocol_version = ASSOC_VERSION1;
    info.encoding_rules = MDER;
    info.nomenclature_version = NOM_VERSION1;
    info.functional_units = 0;
    info
}
