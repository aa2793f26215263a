use phd_core::role::Role;
use phd_core::state::State;

use crate::actions::{association, common, configuring, disassociation, operating};
use crate::event::Event;
use crate::fsm::{TransitionRule, TransitionTable};

macro_rules! rule {
    ($state:expr, $event:expr, $next:expr) => {
        TransitionRule { state: $state, event: $event, next_state: $next, action: None }
    };
    ($state:expr, $event:expr, $next:expr, $action:expr) => {
        TransitionRule { state: $state, event: $event, next_state: $next, action: Some($action) }
    };
}

/// Returns the static transition table for `role`. Both tables are scanned
/// linearly by `fsm::process`; row order only matters where two rules could
/// otherwise both match the same `(state, event)` pair, which none do here.
pub fn table_for(role: Role) -> TransitionTable {
    match role {
        Role::Agent => AGENT_TABLE,
        Role::Manager => MANAGER_TABLE,
    }
}

static AGENT_TABLE: &[TransitionRule] = &[
    rule!(State::Disconnected, Event::TransportConnection, State::Unassociated),
    // Unassociated: no association yet.
    rule!(State::Unassociated, Event::TransportDisconnect, State::Disconnected),
    rule!(State::Unassociated, Event::ReqAssoc, State::Associating, association::association_aarq_tx),
    rule!(State::Unassociated, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::Unassociated, Event::RxAarqAcceptableAndKnown, State::Unassociated, association::association_agent_aare_rejected_permanent_tx),
    rule!(State::Unassociated, Event::RxAarqAcceptableAndUnknown, State::Unassociated, association::association_agent_aare_rejected_permanent_tx),
    rule!(State::Unassociated, Event::RxAarqUnacceptable, State::Unassociated, association::association_agent_aare_rejected_permanent_tx),
    rule!(State::Unassociated, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRlrq, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxAbrt, State::Unassociated),
    rule!(State::Unassociated, Event::RxRoivGet, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRoivSet, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRoivConfirmedSet, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRoivAction, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRoivConfirmedAction, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRoivEventReport, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRoivConfirmedEventReport, State::Unassociated, common::unexpected_apdu_abort_tx),
    // Associating: waiting for the manager's AARE.
    rule!(State::Associating, Event::RxAareAcceptedKnown, State::Operating, association::association_aare_accepted_known_tx),
    rule!(State::Associating, Event::RxAareAcceptedUnknown, State::ConfigSending, association::association_aare_accepted_unknown_tx),
    rule!(State::Associating, Event::RxAareRejected, State::Unassociated, association::association_aare_rejected_permanent_tx),
    rule!(State::Associating, Event::Timeout, State::Unassociated, association::association_timeout_tx),
    rule!(State::Associating, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::Associating, Event::TransportDisconnect, State::Disconnected),
    rule!(State::Associating, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::Associating, Event::RxAarqAcceptableAndKnown, State::Unassociated, association::association_agent_aare_rejected_permanent_tx),
    rule!(State::Associating, Event::RxAarqAcceptableAndUnknown, State::Unassociated, association::association_agent_aare_rejected_permanent_tx),
    rule!(State::Associating, Event::RxAarqUnacceptable, State::Unassociated, association::association_agent_aare_rejected_permanent_tx),
    rule!(State::Associating, Event::RxRlrq, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Associating, Event::RxRlre, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Associating, Event::RxRoivGet, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Associating, Event::RxRoivSet, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Associating, Event::RxRoivConfirmedSet, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Associating, Event::RxRoivAction, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Associating, Event::RxRoivConfirmedAction, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Associating, Event::RxRoivEventReport, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Associating, Event::RxRoivConfirmedEventReport, State::Unassociated, common::unexpected_apdu_abort_tx),
    // ConfigSending: about to send our ConfigReport.
    rule!(State::ConfigSending, Event::ReqSendConfig, State::WaitingApproval, configuring::configuring_send_config_tx),
    rule!(State::ConfigSending, Event::ReqAssocRelease, State::Disassociating, disassociation::disassociating_release_request_tx),
    rule!(State::ConfigSending, Event::Timeout, State::Unassociated, association::association_timeout_tx),
    rule!(State::ConfigSending, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::ConfigSending, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::ConfigSending, Event::TransportDisconnect, State::Disconnected),
    rule!(State::ConfigSending, Event::RxAarqAcceptableAndKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::ConfigSending, Event::RxAarqAcceptableAndUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::ConfigSending, Event::RxAarqUnacceptable, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::ConfigSending, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::ConfigSending, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::ConfigSending, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::ConfigSending, Event::RxRlrq, State::Unassociated, disassociation::disassociating_release_response_tx),
    rule!(State::ConfigSending, Event::RxRlre, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::ConfigSending, Event::RxRoivGet, State::ConfigSending, operating::operating_agent_get_tx),
    rule!(State::ConfigSending, Event::RxRoivSet, State::ConfigSending, configuring::configuring_roiv_reject_tx),
    rule!(State::ConfigSending, Event::RxRoivConfirmedSet, State::ConfigSending, configuring::configuring_roiv_reject_tx),
    rule!(State::ConfigSending, Event::RxRoivAction, State::ConfigSending, configuring::configuring_roiv_reject_tx),
    rule!(State::ConfigSending, Event::RxRoivConfirmedAction, State::ConfigSending, configuring::configuring_roiv_reject_tx),
    rule!(State::ConfigSending, Event::RxRoivEventReport, State::ConfigSending, configuring::configuring_roiv_reject_tx),
    rule!(State::ConfigSending, Event::RxRoivConfirmedEventReport, State::ConfigSending, configuring::configuring_roiv_reject_tx),
    // WaitingApproval: ConfigReport sent, waiting for the manager's RORS.
    rule!(State::WaitingApproval, Event::RxRorsConfirmedEventReportKnown, State::Operating, configuring::configuring_configuration_accepted_tx),
    rule!(State::WaitingApproval, Event::RxRorsConfirmedEventReportUnknown, State::ConfigSending, configuring::configuring_configuration_rejected_tx),
    rule!(State::WaitingApproval, Event::Timeout, State::Unassociated, association::association_timeout_tx),
    rule!(State::WaitingApproval, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::WaitingApproval, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::WaitingApproval, Event::ReqAssocRelease, State::Disassociating, disassociation::disassociating_release_request_tx),
    rule!(State::WaitingApproval, Event::TransportDisconnect, State::Disconnected),
    rule!(State::WaitingApproval, Event::RxAarqAcceptableAndKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingApproval, Event::RxAarqAcceptableAndUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingApproval, Event::RxAarqUnacceptable, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingApproval, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingApproval, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingApproval, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingApproval, Event::RxRlrq, State::Unassociated, disassociation::disassociating_release_response_tx),
    rule!(State::WaitingApproval, Event::RxRlre, State::Unassociated, common::unexpected_apdu_abort_tx),
    // Deliberately stays in `WaitingApproval` rather than looping back to
    // `ConfigSending` (the literal next-state in the reference table): with
    // no fresh `ReqSendConfig` to re-arm, a round trip there would strand the
    // agent with no route back out. See DESIGN.md.
    rule!(State::WaitingApproval, Event::RxRoivGet, State::WaitingApproval, operating::operating_agent_get_tx),
    rule!(State::WaitingApproval, Event::RxRoivSet, State::WaitingApproval, configuring::configuring_roiv_reject_tx),
    rule!(State::WaitingApproval, Event::RxRoivConfirmedSet, State::WaitingApproval, configuring::configuring_roiv_reject_tx),
    rule!(State::WaitingApproval, Event::RxRoivAction, State::WaitingApproval, configuring::configuring_roiv_reject_tx),
    rule!(State::WaitingApproval, Event::RxRoivConfirmedAction, State::WaitingApproval, configuring::configuring_roiv_reject_tx),
    rule!(State::WaitingApproval, Event::RxRoivEventReport, State::WaitingApproval, configuring::configuring_roiv_reject_tx),
    rule!(State::WaitingApproval, Event::RxRoivConfirmedEventReport, State::WaitingApproval, configuring::configuring_roiv_reject_tx),
    rule!(State::WaitingApproval, Event::RxRoer, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingApproval, Event::RxRorj, State::Unassociated, common::unexpected_apdu_abort_tx),
    // Operating: serving the manager's CMIP operations against our DIM.
    rule!(State::Operating, Event::RxRoivGet, State::Operating, operating::operating_agent_get_tx),
    rule!(State::Operating, Event::RxRoivSet, State::Operating, operating::operating_agent_set_tx),
    rule!(State::Operating, Event::RxRoivConfirmedSet, State::Operating, operating::operating_agent_confirmed_set_tx),
    rule!(State::Operating, Event::RxRoivAction, State::Operating, operating::operating_agent_action_tx),
    rule!(State::Operating, Event::RxRoivConfirmedAction, State::Operating, operating::operating_agent_confirmed_action_tx),
    rule!(State::Operating, Event::ReqSendEvent, State::Operating, operating::operating_agent_send_event_tx),
    rule!(State::Operating, Event::ReqAssocRelease, State::Disassociating, disassociation::disassociating_release_request_tx),
    rule!(State::Operating, Event::RxRlrq, State::Unassociated, disassociation::disassociating_release_response_tx),
    rule!(State::Operating, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::Operating, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::Operating, Event::TransportDisconnect, State::Disconnected),
    // A confirmed invoke timing out while Operating is not reachable today
    // (the agent never arms a confirmed-invoke timer in this state), but the
    // row is kept defensively, matching the reference table's own row here.
    rule!(State::Operating, Event::Timeout, State::Unassociated, association::association_timeout_tx),
    rule!(State::Operating, Event::RxAarqAcceptableAndKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAarqAcceptableAndUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAarqUnacceptable, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxRlre, State::Unassociated, common::unexpected_apdu_abort_tx),
    // Disassociating: released, waiting for the peer's RLRE.
    rule!(State::Disassociating, Event::RxRlre, State::Unassociated, disassociation::disassociating_release_confirmed_tx),
    rule!(State::Disassociating, Event::Timeout, State::Unassociated, disassociation::disassociating_timeout_tx),
    rule!(State::Disassociating, Event::RxRlrq, State::Disassociating, disassociation::disassociating_release_response_tx),
    rule!(State::Disassociating, Event::RxRorsGet, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedSet, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedAction, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedEventReport, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedEventReportKnown, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedEventReportUnknown, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRoer, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorj, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::Disassociating, Event::TransportDisconnect, State::Disconnected),
    rule!(State::Disassociating, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::Disassociating, Event::RxAarqAcceptableAndKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAarqAcceptableAndUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAarqUnacceptable, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
];

static MANAGER_TABLE: &[TransitionRule] = &[
    rule!(State::Disconnected, Event::TransportConnection, State::Unassociated),
    // Unassociated: no association yet.
    rule!(State::Unassociated, Event::TransportDisconnect, State::Disconnected),
    rule!(State::Unassociated, Event::RxAarqAcceptableAndKnown, State::Operating, association::association_aare_accept_known_tx),
    rule!(State::Unassociated, Event::RxAarqAcceptableAndUnknown, State::WaitingForConfig, association::association_aare_accept_unknown_tx),
    rule!(State::Unassociated, Event::RxAarqUnacceptable, State::Unassociated, association::association_aare_reject_unacceptable_tx),
    rule!(State::Unassociated, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::Unassociated, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRlrq, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxAbrt, State::Unassociated),
    rule!(State::Unassociated, Event::RxRoivEventReport, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRoivConfirmedEventReport, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Unassociated, Event::RxRoivAllExceptConfirmedEventReport, State::Unassociated, common::unexpected_apdu_abort_tx),
    // WaitingForConfig: AARE sent, waiting for the agent's ConfigReport.
    rule!(State::WaitingForConfig, Event::RxRoivConfirmedEventReport, State::CheckingConfig, configuring::configuring_transition_waiting_for_config),
    rule!(State::WaitingForConfig, Event::Timeout, State::Unassociated, configuring::configuring_wait_timeout_tx),
    rule!(State::WaitingForConfig, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::WaitingForConfig, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::WaitingForConfig, Event::TransportDisconnect, State::Disconnected),
    rule!(State::WaitingForConfig, Event::RxAarqAcceptableAndKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingForConfig, Event::RxAarqAcceptableAndUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingForConfig, Event::RxAarqUnacceptable, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingForConfig, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingForConfig, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingForConfig, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingForConfig, Event::RxRlrq, State::Unassociated, disassociation::disassociating_release_response_tx),
    rule!(State::WaitingForConfig, Event::RxRlre, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::WaitingForConfig, Event::RxRoivEventReport, State::WaitingForConfig, configuring::configuring_roiv_reject_tx),
    // CheckingConfig: waiting for the application's accept/reject decision.
    rule!(State::CheckingConfig, Event::ReqAgentSuppliedKnownConfig, State::Operating, configuring::configuring_configuration_response_known_tx),
    rule!(State::CheckingConfig, Event::ReqAgentSuppliedUnknownConfig, State::WaitingForConfig, configuring::configuring_configuration_response_unknown_tx),
    rule!(State::CheckingConfig, Event::ReqAgentSuppliedBadConfig, State::WaitingForConfig, configuring::configuring_configuration_rorj_tx),
    rule!(State::CheckingConfig, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::CheckingConfig, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::CheckingConfig, Event::TransportDisconnect, State::Disconnected),
    rule!(State::CheckingConfig, Event::RxAarqAcceptableAndKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::CheckingConfig, Event::RxAarqAcceptableAndUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::CheckingConfig, Event::RxAarqUnacceptable, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::CheckingConfig, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::CheckingConfig, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::CheckingConfig, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::CheckingConfig, Event::RxRlrq, State::Unassociated, disassociation::disassociating_release_response_tx),
    rule!(State::CheckingConfig, Event::RxRlre, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::CheckingConfig, Event::RxRoivConfirmedEventReport, State::CheckingConfig, operating::operating_event_report),
    rule!(State::CheckingConfig, Event::RxRoivAllExceptConfirmedEventReport, State::Unassociated, configuring::configuring_unexpected_roiv_reject_tx),
    // Operating: dispatching CMIP operations at the agent's DIM, and
    // receiving its reports.
    rule!(State::Operating, Event::RxRoivEventReport, State::Operating, operating::operating_event_report),
    rule!(State::Operating, Event::RxRoivConfirmedEventReport, State::Operating, operating::operating_event_report),
    rule!(State::Operating, Event::RxRoivAllExceptConfirmedEventReport, State::Operating, operating::operating_roiv_non_event_report),
    rule!(State::Operating, Event::ReqGet, State::Operating, operating::operating_service_get_tx),
    rule!(State::Operating, Event::ReqSetScanner, State::Operating, operating::operating_set_scanner_tx),
    rule!(State::Operating, Event::ReqAction, State::Operating, operating::operating_action_tx),
    rule!(State::Operating, Event::RxRorsGet, State::Operating, operating::operating_get_response_tx),
    rule!(State::Operating, Event::RxRorsConfirmedSet, State::Operating, operating::operating_set_scanner_response_tx),
    rule!(State::Operating, Event::RxRorsConfirmedAction, State::Operating, operating::operating_rors_confirmed_action_tx),
    rule!(State::Operating, Event::RxRoer, State::Operating, operating::operating_roer_tx),
    rule!(State::Operating, Event::RxRorj, State::Operating, operating::operating_rorj_tx),
    rule!(State::Operating, Event::Timeout, State::Operating, operating::operating_confirmed_timeout_tx),
    rule!(State::Operating, Event::ReqAssocRelease, State::Disassociating, disassociation::disassociating_release_request_tx),
    rule!(State::Operating, Event::RxRlrq, State::Unassociated, disassociation::disassociating_release_response_tx),
    rule!(State::Operating, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::Operating, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::Operating, Event::TransportDisconnect, State::Disconnected),
    rule!(State::Operating, Event::RxAarqAcceptableAndKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAarqAcceptableAndUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAarqUnacceptable, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Operating, Event::RxRlre, State::Unassociated, common::unexpected_apdu_abort_tx),
    // Disassociating: released, waiting for the agent's RLRE.
    rule!(State::Disassociating, Event::RxRlre, State::Unassociated, disassociation::disassociating_release_confirmed_tx),
    rule!(State::Disassociating, Event::Timeout, State::Unassociated, disassociation::disassociating_timeout_tx),
    rule!(State::Disassociating, Event::RxRlrq, State::Disassociating, disassociation::disassociating_release_response_tx),
    rule!(State::Disassociating, Event::RxRorsGet, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedSet, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedAction, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedEventReport, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedEventReportKnown, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorsConfirmedEventReportUnknown, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRoer, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxRorj, State::Unassociated, disassociation::disassociating_abort_erratum_tx),
    rule!(State::Disassociating, Event::RxAbrt, State::Unassociated, common::on_abrt_received),
    rule!(State::Disassociating, Event::TransportDisconnect, State::Disconnected),
    rule!(State::Disassociating, Event::ReqAssocAbort, State::Unassociated, common::application_requested_abort_tx),
    rule!(State::Disassociating, Event::RxAarqAcceptableAndKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAarqAcceptableAndUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAarqUnacceptable, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAareAcceptedKnown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAareAcceptedUnknown, State::Unassociated, common::unexpected_apdu_abort_tx),
    rule!(State::Disassociating, Event::RxAareRejected, State::Unassociated, common::unexpected_apdu_abort_tx),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_state_event_pair_is_duplicated_within_a_table() {
        for table in [AGENT_TABLE, MANAGER_TABLE] {
            let mut seen = std::collections::HashSet::new();
            for rule in table {
                assert!(seen.insert((rule.state, rule.event)), "duplicate rule for {:?}/{:?}", rule.state, rule.event);
            }
        }
    }

    #[test]
    fn every_state_has_a_transport_disconnect_row_or_is_disconnected_itself() {
        let states = [
            State::Unassociated,
            State::Associating,
            State::ConfigSending,
            State::WaitingApproval,
            State::WaitingForConfig,
            State::CheckingConfig,
            State::Operating,
            State::Disassociating,
        ];
        for table in [AGENT_TABLE, MANAGER_TABLE] {
            for state in states {
                let reachable = table.iter().any(|r| r.state == state);
                if !reachable {
                    continue;
                }
                assert!(
                    table.iter().any(|r| r.state == state && r.event == Event::TransportDisconnect),
                    "missing TransportDisconnect row for {:?}",
                    state
                );
            }
        }
    }
}
