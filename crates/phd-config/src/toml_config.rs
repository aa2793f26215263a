use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::stack_config::{CfgKnownConfiguration, CfgSystemIdentity, CfgTimeouts, CfgTransport, SharedConfig, StackConfig, StackRole, StackState};

/// Build `SharedConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref identity) = root.identity {
        if !identity.extra.is_empty() {
            return Err(format!("Unrecognized fields: identity::{:?}", sorted_keys(&identity.extra)).into());
        }
    }
    if let Some(ref timeouts) = root.timeouts {
        if !timeouts.extra.is_empty() {
            return Err(format!("Unrecognized fields: timeouts::{:?}", sorted_keys(&timeouts.extra)).into());
        }
    }
    if let Some(ref transport) = root.transport {
        if !transport.extra.is_empty() {
            return Err(format!("Unrecognized fields: transport::{:?}", sorted_keys(&transport.extra)).into());
        }
    }

    let mut cfg = StackConfig {
        stack_role: Some(root.stack_role),
        debug_log: root.debug_log,
        identity: CfgSystemIdentity::default(),
        timeouts: CfgTimeouts::default(),
        transport: CfgTransport::default(),
        known_configurations: Vec::new(),
    };

    if let Some(identity) = root.identity {
        apply_identity_patch(&mut cfg.identity, identity);
    }
    if let Some(timeouts) = root.timeouts {
        apply_timeouts_patch(&mut cfg.timeouts, timeouts);
    }
    if let Some(transport) = root.transport {
        apply_transport_patch(&mut cfg.transport, transport);
    }
    for known in root.known_configurations {
        cfg.known_configurations.push(CfgKnownConfiguration { dev_config_id: known.dev_config_id, label: known.label });
    }

    let state = StackState::default();

    Ok(SharedConfig::from_parts(cfg, state))
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    from_reader(r)
}

fn apply_identity_patch(dst: &mut CfgSystemIdentity, src: IdentityDto) {
    if let Some(bytes) = src.system_id {
        let mut arr = [0u8; 8];
        let n = bytes.len().min(8);
        arr[..n].copy_from_slice(&bytes[..n]);
        dst.system_id = arr;
    }
    if let Some(id) = src.dev_config_id {
        dst.dev_config_id = id;
    }
}

fn apply_timeouts_patch(dst: &mut CfgTimeouts, src: TimeoutsDto) {
    if let Some(v) = src.association_secs {
        dst.association_secs = v;
    }
    if let Some(v) = src.release_secs {
        dst.release_secs = v;
    }
    if let Some(v) = src.config_report_secs {
        dst.config_report_secs = v;
    }
    if let Some(v) = src.retry_count {
        dst.retry_count = v;
    }
}

fn apply_transport_patch(dst: &mut CfgTransport, src: TransportDto) {
    if let Some(host) = src.host {
        dst.host = host;
    }
    if let Some(port) = src.port {
        dst.port = port;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    stack_role: StackRole,
    debug_log: Option<String>,

    #[serde(default)]
    identity: Option<IdentityDto>,

    #[serde(default)]
    timeouts: Option<TimeoutsDto>,

    #[serde(default)]
    transport: Option<TransportDto>,

    #[serde(default)]
    known_configurations: Vec<KnownConfigurationDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct IdentityDto {
    system_id: Option<Vec<u8>>,
    dev_config_id: Option<u16>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct TimeoutsDto {
    association_secs: Option<u64>,
    release_secs: Option<u64>,
    config_report_secs: Option<u64>,
    retry_count: Option<u32>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct TransportDto {
    host: Option<String>,
    port: Option<u16>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct KnownConfigurationDto {
    dev_config_id: u16,
    label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manager_config() {
        let toml_str = r#"
            config_version = "0.1"
            stack_role = "Manager"

            [timeouts]
            association_secs = 15

            [[known_configurations]]
            dev_config_id = 100
            label = "blood pressure monitor"
        "#;

        let shared = from_toml_str(toml_str).expect("parses");
        let cfg = shared.config();
        assert_eq!(cfg.stack_role, Some(StackRole::Manager));
        assert_eq!(cfg.timeouts.association_secs, 15);
        assert_eq!(cfg.timeouts.release_secs, 10);
        assert!(cfg.is_known_configuration(100));
        assert!(!cfg.is_known_configuration(101));
    }

    #[test]
    fn parses_transport_section_and_defaults_when_absent() {
        let with_transport = r#"
            config_version = "0.1"
            stack_role = "Agent"

            [transport]
            host = "10.0.0.5"
            port = 9999
        "#;
        let cfg = from_toml_str(with_transport).unwrap().config();
        assert_eq!(cfg.transport.host, "10.0.0.5");
        assert_eq!(cfg.transport.port, 9999);

        let without_transport = r#"
            config_version = "0.1"
            stack_role = "Agent"
        "#;
        let cfg = from_toml_str(without_transport).unwrap().config();
        assert_eq!(cfg.transport.host, "127.0.0.1");
        assert_eq!(cfg.transport.port, 20601);
    }

    #[test]
    fn rejects_unrecognized_top_level_field() {
        let toml_str = r#"
            config_version = "0.1"
            stack_role = "Agent"
            bogus_field = true
        "#;

        assert!(from_toml_str(toml_str).is_err());
    }
}
