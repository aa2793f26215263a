use std::time::Duration;

use phd_apdu::consts::*;
use phd_apdu::{AbortReason, Apdu, AssociationRequest, AssociationResponse, AssociationResult, default_association_information};

use crate::actions::common::abort_association;
use crate::context::Context;
use crate::event::{Event, EventData};

use super::common::extract_apdu;

/// Agent: `Unassociated` + `ReqAssoc` -> `Associating`. Builds and sends the
/// AARQ, then arms the guard timer covering the wait for an AARE.
pub(crate) fn association_aarq_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    let identity = ctx.config.config().identity.clone();

    let mut config = default_association_information();
    config.system_type = SYS_TYPE_AGENT;
    config.system_id = identity.system_id.to_vec();
    config.dev_config_id = ctx.mds.dev_config_id();
    config.data_req_mode_flags = DATA_REQ_SUPP_INIT_AGENT;
    config.data_req_init_agent_count = 1;

    let apdu = Apdu::Aarq(AssociationRequest { assoc_version: ASSOC_VERSION1, data_proto_id: DATA_PROTO_ID_20601, config });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send AARQ: {}", e);
        return;
    }

    let timeout = Duration::from_secs(ctx.config.config().timeouts.association_secs);
    ctx.arm_guard_timer(timeout);
}

/// Agent: `Associating` + `RxAareAcceptedKnown` -> `Operating`. The manager
/// already recognized our `dev_config_id`; nothing left to negotiate.
pub(crate) fn association_aare_accepted_known_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    ctx.clear_guard_timer();
    tracing::info!("association accepted, configuration already known to manager");
}

/// Agent: `Associating` + `RxAareAcceptedUnknown` -> `ConfigSending`. The
/// manager accepted the association but does not recognize our
/// `dev_config_id`, so we owe it a `ConfigReport` next. The actual report is
/// sent from the `ConfigSending` + `ReqSendConfig` row, which this action
/// schedules immediately, keeping the two states distinct the way the table
/// has them rather than folding both steps into one action.
pub(crate) fn association_aare_accepted_unknown_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    ctx.clear_guard_timer();
    tracing::info!("association accepted, configuration unknown to manager; sending config report");
    ctx.push_prio_event(Event::ReqSendConfig, EventData::None);
}

/// Agent: `Associating` + `RxAareRejected` -> `Unassociated`. A rejection
/// is itself the terminal response — no ABRT is owed back.
pub(crate) fn association_aare_rejected_permanent_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    ctx.clear_guard_timer();
    if let Some(Apdu::Aare(aare)) = extract_apdu(data) {
        tracing::info!("association rejected by manager: {:?}", aare.result);
    }
}

/// Agent: `Associating` + `Timeout` -> `Unassociated`. No AARE arrived
/// within the guard window.
pub(crate) fn association_timeout_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    tracing::warn!("association attempt timed out waiting for AARE");
    abort_association(ctx, AbortReason::UndefinedReason);
}

/// Agent: any state + `RxAarq` -> `Unassociated`. An agent never accepts
/// associations; an inbound AARQ is answered with a permanent rejection
/// rather than the undefined-reason abort owed to every other
/// out-of-sequence APDU, matching `association_agent_aare_rejected_permanent_tx`.
pub(crate) fn association_agent_aare_rejected_permanent_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    let response = build_aare_as(ctx, SYS_TYPE_AGENT, AssociationResult::RejectedPermanent);
    if let Err(e) = ctx.send_apdu(&Apdu::Aare(response)) {
        tracing::warn!("failed to send AARE (reject, agent): {}", e);
    }
}

/// Manager: `Unassociated` + `RxAarqAcceptableAndKnown` -> `Operating`.
pub(crate) fn association_aare_accept_known_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(Apdu::Aarq(aarq)) = extract_apdu(data) else { return };
    ctx.peer_dev_config_id = Some(aarq.config.dev_config_id);

    let response = build_aare(ctx, AssociationResult::Accepted);
    if let Err(e) = ctx.send_apdu(&Apdu::Aare(response)) {
        tracing::warn!("failed to send AARE: {}", e);
    }
}

/// Manager: `Unassociated` + `RxAarqAcceptableAndUnknown` -> `WaitingForConfig`.
pub(crate) fn association_aare_accept_unknown_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(Apdu::Aarq(aarq)) = extract_apdu(data) else { return };
    ctx.peer_dev_config_id = Some(aarq.config.dev_config_id);

    let response = build_aare(ctx, AssociationResult::AcceptedUnknownConfig);
    if let Err(e) = ctx.send_apdu(&Apdu::Aare(response)) {
        tracing::warn!("failed to send AARE: {}", e);
        return;
    }

    let timeout = Duration::from_secs(ctx.config.config().timeouts.config_report_secs);
    ctx.arm_guard_timer(timeout);
}

/// Manager: `Unassociated` + `RxAarqUnacceptable` -> `Unassociated`. The
/// proposed data protocol id is not 20601; reject and stay put.
pub(crate) fn association_aare_reject_unacceptable_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    let response = build_aare(ctx, AssociationResult::RejectedPermanent);
    if let Err(e) = ctx.send_apdu(&Apdu::Aare(response)) {
        tracing::warn!("failed to send AARE (reject): {}", e);
    }
}

fn build_aare(ctx: &Context, result: AssociationResult) -> AssociationResponse {
    build_aare_as(ctx, SYS_TYPE_MANAGER, result)
}

fn build_aare_as(ctx: &Context, system_type: u32, result: AssociationResult) -> AssociationResponse {
    let identity = ctx.config.config().identity.clone();
    let mut config = default_association_information();
    config.system_type = system_type;
    config.system_id = identity.system_id.to_vec();
    AssociationResponse { assoc_version: ASSOC_VERSION1, result, data_proto_id: DATA_PROTO_ID_20601, config }
}
