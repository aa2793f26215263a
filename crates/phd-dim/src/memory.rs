use std::collections::HashMap;

use phd_apdu::{ConfigObject, ConfigObjectList, OperationalState, SegmentDataEvent};

use crate::mds::{DimError, Mds, ObjectKind, PmStoreRecord, Scanner};

/// In-memory DIM good enough to drive the engine's actions in tests and the
/// CLI demo. Mirrors `MmClientMgr`'s pattern of a `HashMap` keyed by a
/// numeric identifier plus small `try_*`-style accessors.
pub struct MemoryMds {
    dev_config_id: u16,
    configurations: HashMap<u16, ConfigObjectList>,
    scanners: HashMap<u16, Scanner>,
    pm_store: HashMap<u16, PmStoreRecord>,
    clock_epoch_secs: u64,
}

impl MemoryMds {
    pub fn new(dev_config_id: u16) -> Self {
        Self {
            dev_config_id,
            configurations: HashMap::new(),
            scanners: HashMap::new(),
            pm_store: HashMap::new(),
            clock_epoch_secs: 0,
        }
    }

    pub fn register_configuration(&mut self, dev_config_id: u16, objects: Vec<ConfigObject>) {
        self.configurations.insert(dev_config_id, ConfigObjectList { objects });
    }

    pub fn register_scanner(&mut self, obj_handle: u16, kind: ObjectKind) {
        self.scanners.insert(obj_handle, Scanner { obj_handle, kind, operational_state: OperationalState::Disabled });
    }

    pub fn clock_epoch_secs(&self) -> u64 {
        self.clock_epoch_secs
    }
}

impl Mds for MemoryMds {
    fn dev_config_id(&self) -> u16 {
        self.dev_config_id
    }

    fn configuration_attributes(&self, dev_config_id: u16) -> Option<ConfigObjectList> {
        self.configurations.get(&dev_config_id).cloned()
    }

    fn get_scanner(&self, obj_handle: u16) -> Result<Scanner, DimError> {
        self.scanners.get(&obj_handle).cloned().ok_or(DimError::NoSuchObjectInstance { obj_handle })
    }

    fn set_scanner_operational_state(&mut self, obj_handle: u16, state: OperationalState) -> Result<(), DimError> {
        let scanner = self.scanners.get_mut(&obj_handle).ok_or(DimError::NoSuchObjectInstance { obj_handle })?;
        scanner.operational_state = state;
        tracing::debug!("scanner {} operational_state -> {:?}", obj_handle, state);
        Ok(())
    }

    fn clock_set_epoch_secs(&mut self, epoch_secs: u64) {
        self.clock_epoch_secs = epoch_secs;
    }

    fn pm_store_ingest(&mut self, event: SegmentDataEvent) -> Result<(), DimError> {
        tracing::debug!("pm_store ingest segment {} ({} bytes)", event.segment_instance, event.segment_data.len());
        self.pm_store.insert(event.segment_instance, PmStoreRecord { segment_instance: event.segment_instance, data: event.segment_data });
        Ok(())
    }

    fn pm_store_segment(&self, segment_instance: u16) -> Option<PmStoreRecord> {
        self.pm_store.get(&segment_instance).cloned()
    }

    fn pm_store_clear(&mut self, segment_instance: u16) -> Result<(), DimError> {
        self.pm_store.remove(&segment_instance).ok_or(DimError::NoSuchObjectInstance { obj_handle: segment_instance })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_operational_state_round_trips() {
        let mut mds = MemoryMds::new(1);
        mds.register_scanner(10, ObjectKind::EpisodicScanner);
        assert_eq!(mds.get_scanner(10).unwrap().operational_state, OperationalState::Disabled);

        mds.set_scanner_operational_state(10, OperationalState::Enabled).unwrap();
        assert_eq!(mds.get_scanner(10).unwrap().operational_state, OperationalState::Enabled);
    }

    #[test]
    fn unknown_scanner_is_an_error() {
        let mds = MemoryMds::new(1);
        assert!(matches!(mds.get_scanner(99), Err(DimError::NoSuchObjectInstance { obj_handle: 99 })));
    }

    #[test]
    fn pm_store_ingest_and_clear() {
        let mut mds = MemoryMds::new(1);
        mds.pm_store_ingest(SegmentDataEvent { segment_instance: 3, segment_data: vec![1, 2, 3] }).unwrap();
        assert_eq!(mds.pm_store_segment(3).unwrap().data, vec![1, 2, 3]);

        mds.pm_store_clear(3).unwrap();
        assert!(mds.pm_store_segment(3).is_none());
    }
}
