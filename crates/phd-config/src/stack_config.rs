use serde::Deserialize;
use std::sync::{Arc, RwLock};

use phd_core::Role;

/// Which side of an association a binary should build.
///
/// Named `StackRole` rather than reusing `phd_core::Role` directly in the
/// TOML surface, since the config crate may eventually want config-only
/// variants (e.g. a future `Both` for colocated test harnesses) that the
/// engine's `Role` has no business knowing about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum StackRole {
    Agent,
    Manager,
}

impl From<StackRole> for Role {
    fn from(value: StackRole) -> Self {
        match value {
            StackRole::Agent => Role::Agent,
            StackRole::Manager => Role::Manager,
        }
    }
}

/// Timeouts governing the association lifecycle. Defaults mirror the
/// constants observed in the reference implementation: a 10 second
/// association/release guard and a 3 second confirmed-event-report guard.
#[derive(Debug, Clone, Copy)]
pub struct CfgTimeouts {
    /// Guards `Associating` (agent) / a pending AARE (manager) and a pending
    /// RLRE in `Disassociating`.
    pub association_secs: u64,
    /// Guards a sent RLRQ awaiting RLRE.
    pub release_secs: u64,
    /// Guards a confirmed ConfigReport ROIV awaiting its RORS.
    pub config_report_secs: u64,
    /// Retry count for association attempts. Not enforced by the engine
    /// itself (see DESIGN.md Open Question resolutions) — exposed so an
    /// enclosing application can implement a retry policy.
    pub retry_count: u32,
}

impl Default for CfgTimeouts {
    fn default() -> Self {
        Self {
            association_secs: 10,
            release_secs: 10,
            config_report_secs: 3,
            retry_count: 3,
        }
    }
}

/// Identity fields carried in the AARQ/AARE `PhdAssociationInformation`.
#[derive(Debug, Clone)]
pub struct CfgSystemIdentity {
    /// 8-byte system id, e.g. derived from a EUI-64 / MAC address.
    pub system_id: [u8; 8],
    /// The agent's own dev-config-id, sent in its AARQ. Ignored in Manager role.
    pub dev_config_id: u16,
}

impl Default for CfgSystemIdentity {
    fn default() -> Self {
        Self { system_id: [0; 8], dev_config_id: 0 }
    }
}

/// One entry in the manager's catalog of recognized agent configurations.
#[derive(Debug, Clone)]
pub struct CfgKnownConfiguration {
    pub dev_config_id: u16,
    pub label: String,
}

/// Peer address for the CLI's `TcpTransport`. The core never picks a
/// transport (see `phd-engine`'s scope notes), but the enclosing binary
/// needs somewhere to read one from.
#[derive(Debug, Clone)]
pub struct CfgTransport {
    pub host: String,
    pub port: u16,
}

impl Default for CfgTransport {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 20601 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StackConfig {
    pub stack_role: Option<StackRole>,
    pub debug_log: Option<String>,

    pub identity: CfgSystemIdentity,
    pub timeouts: CfgTimeouts,
    pub transport: CfgTransport,

    /// Manager only: configuration ids recognized without a negotiation round.
    pub known_configurations: Vec<CfgKnownConfiguration>,
}

impl StackConfig {
    pub fn new(role: StackRole) -> Self {
        Self { stack_role: Some(role), ..Default::default() }
    }

    pub fn validate(&self) -> Result<(), &str> {
        let Some(_role) = self.stack_role else {
            return Err("stack_role must be set");
        };
        if self.timeouts.association_secs == 0 {
            return Err("timeouts.association_secs must be nonzero");
        }
        if self.timeouts.release_secs == 0 {
            return Err("timeouts.release_secs must be nonzero");
        }
        if self.timeouts.config_report_secs == 0 {
            return Err("timeouts.config_report_secs must be nonzero");
        }
        Ok(())
    }

    pub fn is_known_configuration(&self, dev_config_id: u16) -> bool {
        self.known_configurations.iter().any(|c| c.dev_config_id == dev_config_id)
    }
}

/// Global shared configuration: immutable config + mutable runtime state.
#[derive(Clone)]
pub struct SharedConfig {
    cfg: Arc<StackConfig>,
    state: Arc<RwLock<StackState>>,
}

/// Mutable, stack-editable state (lock-protected).
#[derive(Debug, Clone, Default)]
pub struct StackState {
    /// Set once the transport reports a live connection.
    pub connected: bool,
}

impl SharedConfig {
    pub fn new(role: StackRole) -> Self {
        Self::from_config(StackConfig::new(role))
    }

    pub fn from_config(cfg: StackConfig) -> Self {
        Self::from_parts(cfg, StackState::default())
    }

    pub fn from_parts(cfg: StackConfig, state: StackState) -> Self {
        match cfg.validate() {
            Ok(_) => {}
            Err(e) => panic!("Invalid stack configuration: {}", e),
        }

        Self { cfg: Arc::new(cfg), state: Arc::new(RwLock::new(state)) }
    }

    pub fn config(&self) -> Arc<StackConfig> {
        Arc::clone(&self.cfg)
    }

    pub fn state_read(&self) -> std::sync::RwLockReadGuard<'_, StackState> {
        self.state.read().expect("StackState RwLock poisoned")
    }

    pub fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, StackState> {
        self.state.write().expect("StackState RwLock poisoned")
    }
}
