use phd_apdu::{ConfigObjectList, OperationalState, SegmentDataEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimError {
    NoSuchObjectInstance { obj_handle: u16 },
    NoSuchAttribute { obj_handle: u16 },
    InvalidArgumentValue { obj_handle: u16 },
}

impl std::fmt::Display for DimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimError::NoSuchObjectInstance { obj_handle } => write!(f, "no such object instance: {}", obj_handle),
            DimError::NoSuchAttribute { obj_handle } => write!(f, "no such attribute on object {}", obj_handle),
            DimError::InvalidArgumentValue { obj_handle } => write!(f, "invalid argument value for object {}", obj_handle),
        }
    }
}

impl std::error::Error for DimError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Mds,
    EpisodicScanner,
    PeriodicScanner,
    PmStore,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    pub obj_handle: u16,
    pub kind: ObjectKind,
    pub operational_state: OperationalState,
}

#[derive(Debug, Clone)]
pub struct PmStoreRecord {
    pub segment_instance: u16,
    pub data: Vec<u8>,
}

/// Narrow interface onto the Domain Information Model the engine's actions
/// need: object-handle resolution, the MDS's own configuration-object
/// catalog, scanner operational state, and the PM-Store's segment ingest.
pub trait Mds: Send {
    /// The agent-local `dev_config_id`. Manager role leaves this unused.
    fn dev_config_id(&self) -> u16;

    /// The configuration object list the agent advertises for its own
    /// `dev_config_id` (used to build a `ConfigReport`).
    fn configuration_attributes(&self, dev_config_id: u16) -> Option<ConfigObjectList>;

    fn get_scanner(&self, obj_handle: u16) -> Result<Scanner, DimError>;
    fn set_scanner_operational_state(&mut self, obj_handle: u16, state: OperationalState) -> Result<(), DimError>;

    fn clock_set_epoch_secs(&mut self, epoch_secs: u64);

    fn pm_store_ingest(&mut self, event: SegmentDataEvent) -> Result<(), DimError>;
    fn pm_store_segment(&self, segment_instance: u16) -> Option<PmStoreRecord>;
    fn pm_store_clear(&mut self, segment_instance: u16) -> Result<(), DimError>;
}
