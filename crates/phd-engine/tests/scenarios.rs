//! End-to-end scenarios driving a real agent `Context` against a real
//! manager `Context` over a `LoopbackTransport` pair, exercising both
//! stack sides against each other rather than poking the FSM tables
//! directly.

use std::sync::{Arc, Mutex};

use phd_apdu::{
    Apdu, AssociationRequest, BitcodeCodec, Codec, ConfigReport, OperationalState, default_association_information,
};
use phd_apdu::consts::DATA_PROTO_ID_20601;
use phd_config::{CfgKnownConfiguration, CfgSystemIdentity, CfgTimeouts, SharedConfig, StackConfig, StackRole};
use phd_core::{Role, State};
use phd_dim::{MemoryMds, ObjectKind};
use phd_engine::{Context, Listener, RequestOutcome};
use phd_transport::Transport;
use phd_transport::loopback::LoopbackTransport;

#[derive(Clone, Default)]
struct Recorder {
    transitions: Arc<Mutex<Vec<(State, State)>>>,
    config_reports: Arc<Mutex<Vec<ConfigReport>>>,
    completions: Arc<Mutex<Vec<(u16, RequestOutcome)>>>,
}

impl Recorder {
    fn saw_transition(&self, from: State, to: State) -> bool {
        self.transitions.lock().unwrap().iter().any(|t| *t == (from, to))
    }
}

struct RecordingListener(Recorder);

impl Listener for RecordingListener {
    fn on_state_changed(&mut self, from: State, to: State) {
        self.0.transitions.lock().unwrap().push((from, to));
    }

    fn on_config_report(&mut self, report: &ConfigReport) {
        self.0.config_reports.lock().unwrap().push(report.clone());
    }

    fn on_request_complete(&mut self, invoke_id: u16, outcome: &RequestOutcome) {
        self.0.completions.lock().unwrap().push((invoke_id, outcome.clone()));
    }
}

/// Short timeouts so a deliberately-untouched guard timer in a test would
/// fire within the test's own wall-clock budget rather than hanging it.
fn test_timeouts() -> CfgTimeouts {
    CfgTimeouts { association_secs: 5, release_secs: 5, config_report_secs: 5, retry_count: 1 }
}

fn agent_config(dev_config_id: u16) -> SharedConfig {
    let cfg = StackConfig {
        stack_role: Some(StackRole::Agent),
        identity: CfgSystemIdentity { system_id: [1, 2, 3, 4, 5, 6, 7, 8], dev_config_id },
        timeouts: test_timeouts(),
        ..Default::default()
    };
    SharedConfig::from_config(cfg)
}

fn manager_config(known: &[u16]) -> SharedConfig {
    let cfg = StackConfig {
        stack_role: Some(StackRole::Manager),
        identity: CfgSystemIdentity { system_id: [9, 9, 9, 9, 9, 9, 9, 9], dev_config_id: 0 },
        timeouts: test_timeouts(),
        known_configurations: known.iter().map(|&dev_config_id| CfgKnownConfiguration { dev_config_id, label: "test".to_string() }).collect(),
        ..Default::default()
    };
    SharedConfig::from_config(cfg)
}

/// Builds a connected agent/manager pair sharing a `LoopbackTransport`, each
/// with its own `RecordingListener`. `dev_config_id` is the agent's own;
/// `known` is the set the manager already recognizes without negotiation.
fn build_pair(dev_config_id: u16, known: &[u16]) -> (Context, Recorder, Context, Recorder) {
    let (agent_transport, manager_transport) = LoopbackTransport::pair();

    let agent_recorder = Recorder::default();
    let mut agent = Context::new(
        Role::Agent,
        agent_config(dev_config_id),
        Box::new(MemoryMds::new(dev_config_id)),
        Box::new(agent_transport),
        Box::new(BitcodeCodec),
    );
    agent.add_listener(Box::new(RecordingListener(agent_recorder.clone())));

    let manager_recorder = Recorder::default();
    let mut manager = Context::new(
        Role::Manager,
        manager_config(known),
        Box::new(MemoryMds::new(0)),
        Box::new(manager_transport),
        Box::new(BitcodeCodec),
    );
    manager.add_listener(Box::new(RecordingListener(manager_recorder.clone())));

    agent.connect().expect("loopback connect never fails");
    manager.connect().expect("loopback connect never fails");
    agent.run_to_quiescence();
    manager.run_to_quiescence();

    (agent, agent_recorder, manager, manager_recorder)
}

/// Runs both ends to quiescence, alternating, until neither side's last
/// observed transition changes across a full round — good enough for these
/// scenarios since every exchange here settles within a couple of hops.
fn settle(agent: &mut Context, manager: &mut Context) {
    for _ in 0..6 {
        agent.run_to_quiescence();
        manager.run_to_quiescence();
    }
}

// S1: agent associates against a manager that already knows its dev_config_id.
#[test]
fn s1_agent_associates_with_known_configuration() {
    let (mut agent, agent_rec, mut manager, manager_rec) = build_pair(42, &[42]);

    agent.request_associate();
    settle(&mut agent, &mut manager);

    assert_eq!(agent.state, State::Operating);
    assert_eq!(manager.state, State::Operating);
    assert!(agent_rec.saw_transition(State::Associating, State::Operating));
    assert!(manager_rec.saw_transition(State::Unassociated, State::Operating));
}

// S2: agent associates with a dev_config_id the manager has never seen;
// manager is walked through CheckingConfig and accepts it.
#[test]
fn s2_agent_associates_with_unknown_configuration_then_accepted() {
    let (mut agent, _agent_rec, mut manager, manager_rec) = build_pair(7, &[]);

    agent.request_associate();
    settle(&mut agent, &mut manager);

    assert_eq!(manager.state, State::CheckingConfig);
    assert_eq!(agent.state, State::WaitingApproval);
    assert_eq!(manager_rec.config_reports.lock().unwrap().len(), 1);
    assert_eq!(manager_rec.config_reports.lock().unwrap()[0].config_report_id, 7);

    manager.accept_known_config();
    settle(&mut agent, &mut manager);

    assert_eq!(agent.state, State::Operating);
    assert_eq!(manager.state, State::Operating);
}

// S3: manager rejects an AARQ that does not propose the 20601 data protocol,
// sent directly over the wire (no conformant agent builds one).
#[test]
fn s3_manager_rejects_non_20601_data_protocol() {
    // Driven by a bare transport end rather than a real agent Context, since
    // a conformant agent never builds an AARQ with the wrong data_proto_id.
    let (mut attacker, manager_transport) = LoopbackTransport::pair();
    let manager_rec = Recorder::default();
    let mut manager = Context::new(Role::Manager, manager_config(&[1]), Box::new(MemoryMds::new(0)), Box::new(manager_transport), Box::new(BitcodeCodec));
    manager.add_listener(Box::new(RecordingListener(manager_rec.clone())));
    manager.connect().unwrap();
    manager.run_to_quiescence();
    attacker.connect().unwrap();

    let mut config = default_association_information();
    config.dev_config_id = 1;
    let bad_aarq = Apdu::Aarq(AssociationRequest { assoc_version: 0x8000_0000, data_proto_id: DATA_PROTO_ID_20601 + 1, config });
    let bytes = BitcodeCodec.encode_apdu(&bad_aarq).unwrap();
    attacker.send(&bytes).unwrap();

    manager.run_to_quiescence();

    assert_eq!(manager.state, State::Unassociated);
    assert!(!manager_rec.transitions.lock().unwrap().iter().any(|(_, to)| *to == State::Operating));
}

// S4: once Operating, the manager sets a scanner's operational state on the
// agent and observes the agent's acceptance mirrored back.
#[test]
fn s4_manager_sets_scanner_operational_state() {
    let (agent_transport, manager_transport) = LoopbackTransport::pair();
    let mut agent_mds = MemoryMds::new(3);
    agent_mds.register_scanner(10, ObjectKind::EpisodicScanner);

    let mut agent = Context::new(Role::Agent, agent_config(3), Box::new(agent_mds), Box::new(agent_transport), Box::new(BitcodeCodec));
    let manager_recorder = Recorder::default();
    let mut manager = Context::new(Role::Manager, manager_config(&[3]), Box::new(MemoryMds::new(0)), Box::new(manager_transport), Box::new(BitcodeCodec));
    manager.add_listener(Box::new(RecordingListener(manager_recorder.clone())));

    agent.connect().unwrap();
    manager.connect().unwrap();
    agent.run_to_quiescence();
    manager.run_to_quiescence();

    agent.request_associate();
    settle(&mut agent, &mut manager);
    assert_eq!(agent.state, State::Operating);
    assert_eq!(manager.state, State::Operating);

    manager.request_set_scanner(10, OperationalState::Enabled);
    settle(&mut agent, &mut manager);

    let completions = manager_recorder.completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    assert!(matches!(completions[0].1, RequestOutcome::Success(_)));
}

// S5: an Operating association is torn down cleanly by the agent.
#[test]
fn s5_clean_release_while_operating() {
    let (mut agent, agent_rec, mut manager, manager_rec) = build_pair(5, &[5]);

    agent.request_associate();
    settle(&mut agent, &mut manager);
    assert_eq!(agent.state, State::Operating);
    assert_eq!(manager.state, State::Operating);

    agent.request_release();
    settle(&mut agent, &mut manager);

    assert_eq!(agent.state, State::Unassociated);
    assert_eq!(manager.state, State::Unassociated);
    assert!(agent_rec.saw_transition(State::Operating, State::Disassociating));
    assert!(manager_rec.saw_transition(State::Operating, State::Unassociated));
}

// S6: a RORS for a request the manager sent before releasing arrives only
// after the manager has already moved to Disassociating; per the erratum
// behavior this aborts rather than being processed as a late success.
#[test]
fn s6_late_response_during_disassociating_triggers_erratum_abort() {
    let (agent_transport, manager_transport) = LoopbackTransport::pair();
    let mut agent_mds = MemoryMds::new(6);
    agent_mds.register_scanner(0, ObjectKind::Mds);

    let mut agent = Context::new(Role::Agent, agent_config(6), Box::new(agent_mds), Box::new(agent_transport), Box::new(BitcodeCodec));
    let manager_recorder = Recorder::default();
    let mut manager = Context::new(Role::Manager, manager_config(&[6]), Box::new(MemoryMds::new(0)), Box::new(manager_transport), Box::new(BitcodeCodec));
    manager.add_listener(Box::new(RecordingListener(manager_recorder.clone())));

    agent.connect().unwrap();
    manager.connect().unwrap();
    agent.run_to_quiescence();
    manager.run_to_quiescence();

    agent.request_associate();
    settle(&mut agent, &mut manager);
    assert_eq!(manager.state, State::Operating);

    // Manager sends a Get, but the agent is never run before the manager
    // also asks to release -- so the Get's RORS is still in flight when the
    // manager's own state moves to Disassociating.
    manager.request_get(0);
    manager.run_to_quiescence();
    assert_eq!(manager.invoke_tracker.open_count(), 1);

    manager.request_release();
    manager.run_to_quiescence();
    assert_eq!(manager.state, State::Disassociating);

    // Now let the agent answer both queued messages (the Get and the RLRQ).
    agent.run_to_quiescence();

    // Finally the manager observes the agent's replies: the late Get RORS
    // lands in Disassociating and is treated as the erratum case.
    manager.run_to_quiescence();

    assert_eq!(manager.state, State::Unassociated);
    assert!(manager_recorder.saw_transition(State::Disassociating, State::Unassociated));
    assert!(manager.invoke_tracker.is_empty());
}

// Regression: a config-report RORS (the manager's accept/reject of a
// previously-unknown configuration) arriving after the agent has already
// asked to release must hit the same Disassociating erratum abort as any
// other late confirmed response, not be silently dropped because it
// classifies to one of the `RxRorsConfirmedEventReport*` refinements
// rather than the plainer `RxRorsGet`/`RxRorsConfirmedSet`/etc.
#[test]
fn s6b_late_config_response_during_disassociating_triggers_erratum_abort() {
    let (mut agent, _agent_rec, mut manager, manager_rec) = build_pair(8, &[]);

    // Drive the unknown-configuration path up to WaitingApproval/CheckingConfig.
    agent.request_associate();
    settle(&mut agent, &mut manager);
    assert_eq!(agent.state, State::WaitingApproval);
    assert_eq!(manager.state, State::CheckingConfig);

    // The agent gives up on the pending config round and asks to release
    // before the manager's accept/reject decision comes back.
    agent.request_release();
    agent.run_to_quiescence();
    assert_eq!(agent.state, State::Disassociating);

    // Only now does the manager decide, sending its ConfigReportRsp RORS --
    // which the agent will see while already Disassociating.
    manager.accept_known_config();
    manager.run_to_quiescence();

    agent.run_to_quiescence();

    assert_eq!(agent.state, State::Unassociated);
    manager.run_to_quiescence();
    assert!(manager_rec.transitions.lock().unwrap().iter().any(|(_, to)| *to == State::Unassociated));
}

#[test]
fn association_survives_a_round_trip_through_the_wire_codec() {
    let (mut agent, _agent_rec, mut manager, _manager_rec) = build_pair(99, &[99]);

    agent.request_associate();
    settle(&mut agent, &mut manager);

    assert_eq!(agent.state, State::Operating);
    assert_eq!(manager.peer_dev_config_id, Some(99));
}
